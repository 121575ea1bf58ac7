//! Typed-character to Linux evdev keycode translation table.
//!
//! Keycode values are the `KEY_*` constants from `linux/input-event-codes.h`
//! (e.g. `KEY_A = 30`, `KEY_1 = 2`).  The device backend replays these as
//! key-down/key-up pairs.
//!
//! Uppercase letters map to the same keycode as their lowercase form; the
//! receiving system resolves case from modifier state, which rdesk does not
//! synthesize.  Characters with no entry (e.g. `'@'`, accented letters) have
//! no keycode and are skipped by `TypeText`.

/// Translates a typed character to its evdev keycode.
///
/// Returns `None` for characters outside the table.
pub fn char_to_keycode(c: char) -> Option<u16> {
    let code = match c {
        // Digit row
        '1' => 2,
        '2' => 3,
        '3' => 4,
        '4' => 5,
        '5' => 6,
        '6' => 7,
        '7' => 8,
        '8' => 9,
        '9' => 10,
        '0' => 11,

        // Letters (uppercase folds to the lowercase keycode)
        'a' | 'A' => 30,
        'b' | 'B' => 48,
        'c' | 'C' => 46,
        'd' | 'D' => 32,
        'e' | 'E' => 18,
        'f' | 'F' => 33,
        'g' | 'G' => 34,
        'h' | 'H' => 35,
        'i' | 'I' => 23,
        'j' | 'J' => 36,
        'k' | 'K' => 37,
        'l' | 'L' => 38,
        'm' | 'M' => 50,
        'n' | 'N' => 49,
        'o' | 'O' => 24,
        'p' | 'P' => 25,
        'q' | 'Q' => 16,
        'r' | 'R' => 19,
        's' | 'S' => 31,
        't' | 'T' => 20,
        'u' | 'U' => 22,
        'v' | 'V' => 47,
        'w' | 'W' => 17,
        'x' | 'X' => 45,
        'y' | 'Y' => 21,
        'z' | 'Z' => 44,

        // Punctuation on the US layout
        ' ' => 57,
        '-' => 12,
        '=' => 13,
        '[' => 26,
        ']' => 27,
        ';' => 39,
        '\'' => 40,
        '`' => 41,
        '\\' => 43,
        ',' => 51,
        '.' => 52,
        '/' => 53,

        // Control characters with dedicated keys
        '\n' => 28, // Enter
        '\t' => 15, // Tab
        '\x08' => 14, // Backspace

        _ => return None,
    };
    Some(code)
}
