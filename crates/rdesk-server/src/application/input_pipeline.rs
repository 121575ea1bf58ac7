//! Input command pipeline: validated remote commands → timed device actions.
//!
//! Every execution is gated on [`AccessLevel::FullControl`] before any device
//! call, validated against the backend-reported screen bounds or keycode
//! range, and then driven as a strictly sequential press/release sequence
//! with deliberate delays.  Device calls are single-attempt: a backend error
//! surfaces as [`InputError::Device`], never as a validation error.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use rdesk_core::domain::access::{AccessLevel, Session};
use rdesk_core::domain::input::{InputCommand, PointerButton};
use rdesk_core::keymap::evdev::char_to_keycode;

// ── Device backend boundary ───────────────────────────────────────────────────

/// A failed call into the input-injection facility.
#[derive(Debug, Error)]
#[error("device backend error: {0}")]
pub struct DeviceError(pub String);

/// The OS facility that turns logical pointer/keyboard actions into real
/// input events.  Implementations live in `infrastructure::device`.
///
/// Coordinate origin and bounds are backend-defined; the pipeline queries
/// [`DeviceBackend::screen_size`] rather than trusting configuration.
pub trait DeviceBackend: Send + Sync {
    /// Authoritative screen dimensions as `(width, height)` pixels.
    fn screen_size(&self) -> (u32, u32);

    /// Moves the pointer to an absolute position.
    fn move_absolute(&self, x: i32, y: i32) -> Result<(), DeviceError>;

    /// Presses (`true`) or releases (`false`) a pointer button.
    fn set_button(&self, button: PointerButton, pressed: bool) -> Result<(), DeviceError>;

    /// Presses (`true`) or releases (`false`) a key by evdev keycode.
    fn set_key(&self, keycode: u16, pressed: bool) -> Result<(), DeviceError>;
}

/// Highest evdev keycode the pipeline accepts.  Codes above this are not
/// ordinary keys on any backend rdesk drives.
pub const MAX_KEYCODE: u16 = 255;

// ── Errors and outcomes ───────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum InputError {
    /// Session level below `FullControl`; no device call was made.
    #[error("session lacks full-control access")]
    PermissionDenied,
    /// Coordinates outside the backend-reported screen.
    #[error("position ({x}, {y}) is outside the {width}x{height} screen")]
    OutOfBounds { x: i32, y: i32, width: u32, height: u32 },
    /// Keycode outside the supported key range.
    #[error("keycode {0} is outside the supported range")]
    InvalidKeycode(u16),
    /// A device call failed (single attempt, not retried).
    #[error(transparent)]
    Device(#[from] DeviceError),
}

/// Result detail of a successfully executed command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    /// Move, click, or key press completed.
    Done,
    /// Text was typed; `chars_typed` characters reached the device.
    Typed { chars_typed: usize },
}

// ── Timing ────────────────────────────────────────────────────────────────────

/// The deliberate waits that model human input timing.
///
/// These are intentional, bounded pauses owned by the command being
/// executed, not stalls.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct InputTiming {
    /// Wait after a move before clicking, letting the move settle.
    #[serde(default = "default_settle_ms", rename = "settle_ms", with = "millis")]
    pub settle: Duration,
    /// Pause between a press and its release.
    #[serde(default = "default_hold_ms", rename = "hold_ms", with = "millis")]
    pub hold: Duration,
    /// Pause between consecutive typed characters.
    #[serde(default = "default_pacing_ms", rename = "pacing_ms", with = "millis")]
    pub pacing: Duration,
}

mod millis {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}

fn default_settle_ms() -> Duration {
    Duration::from_millis(10)
}
fn default_hold_ms() -> Duration {
    Duration::from_millis(25)
}
fn default_pacing_ms() -> Duration {
    Duration::from_millis(50)
}

impl Default for InputTiming {
    fn default() -> Self {
        Self {
            settle: default_settle_ms(),
            hold: default_hold_ms(),
            pacing: default_pacing_ms(),
        }
    }
}

impl InputTiming {
    /// Zero delays, for tests that assert sequencing rather than cadence.
    pub fn immediate() -> Self {
        Self {
            settle: Duration::ZERO,
            hold: Duration::ZERO,
            pacing: Duration::ZERO,
        }
    }
}

// ── Pipeline ──────────────────────────────────────────────────────────────────

/// Executes validated input commands against a device backend.
pub struct InputPipeline {
    device: Arc<dyn DeviceBackend>,
    timing: InputTiming,
}

impl InputPipeline {
    pub fn new(device: Arc<dyn DeviceBackend>, timing: InputTiming) -> Self {
        Self { device, timing }
    }

    /// Executes `command` on behalf of `session`.
    ///
    /// Authorization is checked first; on failure the device backend is
    /// never touched.  Within one call, sub-steps are strictly sequential;
    /// across calls no ordering is guaranteed.
    pub async fn execute(
        &self,
        command: &InputCommand,
        session: &Session,
    ) -> Result<InputOutcome, InputError> {
        if !session.allows(AccessLevel::FullControl) {
            return Err(InputError::PermissionDenied);
        }

        match command {
            InputCommand::MoveTo { x, y } => {
                self.move_to(*x, *y)?;
                Ok(InputOutcome::Done)
            }
            InputCommand::ClickAt { x, y, button } => {
                self.click_at(*x, *y, *button).await?;
                Ok(InputOutcome::Done)
            }
            InputCommand::PressKey { keycode } => {
                self.press_key(*keycode).await?;
                Ok(InputOutcome::Done)
            }
            InputCommand::TypeText { text } => {
                let chars_typed = self.type_text(text).await?;
                Ok(InputOutcome::Typed { chars_typed })
            }
        }
    }

    fn move_to(&self, x: i32, y: i32) -> Result<(), InputError> {
        let (width, height) = self.device.screen_size();
        if x < 0 || y < 0 || x >= width as i32 || y >= height as i32 {
            return Err(InputError::OutOfBounds { x, y, width, height });
        }
        self.device.move_absolute(x, y)?;
        Ok(())
    }

    /// Move, settle, press, hold, release.  If the move fails the click must
    /// not proceed — no partial click.
    async fn click_at(&self, x: i32, y: i32, button: PointerButton) -> Result<(), InputError> {
        self.move_to(x, y)?;
        tokio::time::sleep(self.timing.settle).await;
        self.device.set_button(button, true)?;
        tokio::time::sleep(self.timing.hold).await;
        self.device.set_button(button, false)?;
        debug!(x, y, ?button, "click executed");
        Ok(())
    }

    /// Key-down, hold, key-up.
    ///
    /// Once the key-down has succeeded the release is always attempted, even
    /// when a later step fails — a key left "held" on the target desktop is
    /// a correctness bug, not a cleanup detail.
    async fn press_key(&self, keycode: u16) -> Result<(), InputError> {
        if keycode == 0 || keycode > MAX_KEYCODE {
            return Err(InputError::InvalidKeycode(keycode));
        }
        self.device.set_key(keycode, true)?;
        tokio::time::sleep(self.timing.hold).await;
        self.device.set_key(keycode, false)?;
        Ok(())
    }

    /// Types `text` one mapped character at a time with a pacing delay.
    ///
    /// Unmapped characters are skipped; a per-character device failure is
    /// logged and does not abort the rest of the string.  Returns the number
    /// of characters that reached the device.
    async fn type_text(&self, text: &str) -> Result<usize, InputError> {
        let mut chars_typed = 0usize;
        for c in text.chars() {
            let Some(keycode) = char_to_keycode(c) else {
                debug!(character = %c.escape_default(), "skipping unmapped character");
                continue;
            };
            match self.press_key(keycode).await {
                Ok(()) => chars_typed += 1,
                Err(e) => warn!(keycode, "key press failed while typing: {e}"),
            }
            tokio::time::sleep(self.timing.pacing).await;
        }
        Ok(chars_typed)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
