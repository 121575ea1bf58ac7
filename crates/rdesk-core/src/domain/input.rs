//! The remote input command model.
//!
//! Commands are ephemeral: they are parsed from a request, validated, and
//! executed synchronously by the input pipeline.  Nothing here is queued or
//! persisted.

use serde::{Deserialize, Serialize};

/// Pointer button identifier.
///
/// The canonical wire form is the lowercase string (`"left"` / `"right"`).
/// The legacy numeric form (1/2) from early protocol drafts is not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerButton {
    Left,
    Right,
}

/// A single remote input request after decoding, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputCommand {
    /// Move the pointer to an absolute position.
    MoveTo { x: i32, y: i32 },
    /// Move the pointer to `(x, y)` and click `button` there.
    ClickAt { x: i32, y: i32, button: PointerButton },
    /// Press and release a single key by evdev keycode.
    PressKey { keycode: u16 },
    /// Type a string character by character through the key table.
    TypeText { text: String },
}
