//! Character-to-keycode translation.

pub mod evdev;
