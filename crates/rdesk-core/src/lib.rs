//! # rdesk-core
//!
//! Shared library for rdesk containing the domain entities, the JSON wire
//! message types, and the character-to-keycode translation table.
//!
//! This crate is used by the server and by any native tooling that speaks the
//! rdesk protocol.  It has zero dependencies on OS APIs, async runtimes, or
//! network sockets.
//!
//! # Architecture overview
//!
//! rdesk lets an authorized operator view and control a desktop session over
//! the network: the server streams periodic screen captures and resource
//! telemetry to connected viewers and accepts validated pointer/keyboard
//! commands.  This crate is the shared foundation.  It defines:
//!
//! - **`domain`** – Pure business types: the coarse access-level tier derived
//!   from group membership, the authenticated session, and the input command
//!   model.
//!
//! - **`keymap`** – The static table translating typed characters to Linux
//!   evdev keycodes, used when replaying `TypeText` commands on the device
//!   backend.
//!
//! - **`protocol`** – The JSON shapes that travel over HTTP and WebSocket,
//!   plus the reversible binary-to-text transfer encoding used to carry
//!   compressed frames inside text messages.

pub mod domain;
pub mod keymap;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `rdesk_core::AccessLevel` instead of `rdesk_core::domain::access::AccessLevel`.
pub use domain::access::{derive_access_level, AccessLevel, Session};
pub use domain::input::{InputCommand, PointerButton};
pub use keymap::evdev::char_to_keycode;
pub use protocol::messages::StreamMessage;
pub use protocol::transfer::{decode_payload, encode_payload, TransferError};
