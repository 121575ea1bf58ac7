//! All rdesk wire message types.
//!
//! Every shape that crosses the HTTP or WebSocket boundary lives here so the
//! server and native tooling agree on field names.  Requests arrive as JSON
//! bodies; stream messages are JSON text frames tagged by a `type` field.
//!
//! Protocol decisions inherited from the v1 drafts and finalized here:
//!
//! - Mouse buttons are the strings `"left"` / `"right"`; the numeric 1/2
//!   form is gone.
//! - Key presses carry a numeric `keycode`; the single-character `key` field
//!   is gone (clients translate characters via the keymap table themselves,
//!   or use the type-text endpoint).

use serde::{Deserialize, Serialize};

use crate::domain::access::AccessLevel;
use crate::domain::input::PointerButton;

// ── Authentication ────────────────────────────────────────────────────────────

/// `POST /api/login` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// `POST /api/login` success response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    pub username: String,
    pub groups: Vec<String>,
    pub access_level: AccessLevel,
    pub token: String,
    /// Convenience flags for clients that only need a boolean.
    pub can_view: bool,
    pub can_control: bool,
}

/// `POST /api/logout` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoutResponse {
    pub success: bool,
    pub message: String,
}

// ── Input commands ────────────────────────────────────────────────────────────

/// `POST /api/mouse/click` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClickRequest {
    pub x: i32,
    pub y: i32,
    pub button: PointerButton,
}

/// `POST /api/mouse/click` success response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClickResponse {
    pub success: bool,
    pub x: i32,
    pub y: i32,
    pub button: PointerButton,
}

/// `POST /api/keyboard/press` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyPressRequest {
    pub keycode: u16,
}

/// `POST /api/keyboard/press` success response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyPressResponse {
    pub success: bool,
    pub keycode: u16,
}

/// `POST /api/keyboard/type` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeTextRequest {
    pub text: String,
}

/// `POST /api/keyboard/type` success response.
///
/// `chars_typed` counts the characters that actually reached the device;
/// unmapped characters are skipped rather than failing the request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeTextResponse {
    pub success: bool,
    pub text: String,
    pub chars_typed: usize,
}

// ── Streaming ─────────────────────────────────────────────────────────────────

/// Server-to-client WebSocket frames, discriminated by the `type` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamMessage {
    /// One compressed frame of the desktop, base64-encoded JPEG bytes.
    Screenshot {
        data: String,
        /// Milliseconds since the Unix epoch at capture time.
        timestamp: u64,
    },
    /// Point-in-time CPU/RAM utilization.
    Resources {
        cpu_usage: u8,
        ram_usage: u8,
        /// Total RAM in megabytes.
        ram_total: u64,
        /// Free (reclaimable) RAM in megabytes.
        ram_free: u64,
        /// Present when sampling failed and the numbers above are zeroed.
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
}

/// Client-to-server WebSocket frames: the stream hint vocabulary.
///
/// Hints are informational — the hub logs them but streams to every
/// registered connection regardless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamHint {
    StartStream,
    StopStream,
}

/// Envelope for [`StreamHint`] frames: `{"command": "start_stream"}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamCommand {
    pub command: StreamHint,
}

// ── Health ────────────────────────────────────────────────────────────────────

/// `GET /api/health` response: static service identity, no auth required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

// ── Tests ─────────────────────────────────────────────────────────────────────
