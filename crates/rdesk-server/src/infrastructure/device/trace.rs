//! Logging input backend.
//!
//! Stands in for a real injection device on hosts without one (containers,
//! headless CI, development laptops).  Every event is accepted and logged at
//! `info`, so the full command pipeline including authorization, bounds
//! checks, and timing can be exercised end to end without moving anyone's
//! cursor.
//!
//! A production deployment would swap in a uinput- or XTest-backed
//! implementation of the same trait; the pipeline cannot tell the difference.

use tracing::info;

use rdesk_core::domain::input::PointerButton;

use crate::application::input_pipeline::{DeviceBackend, DeviceError};

/// Accepts every event and logs it instead of injecting it.
pub struct TraceDeviceBackend {
    width: u32,
    height: u32,
}

impl TraceDeviceBackend {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl DeviceBackend for TraceDeviceBackend {
    fn screen_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn move_absolute(&self, x: i32, y: i32) -> Result<(), DeviceError> {
        info!(x, y, "pointer move");
        Ok(())
    }

    fn set_button(&self, button: PointerButton, pressed: bool) -> Result<(), DeviceError> {
        info!(?button, pressed, "pointer button");
        Ok(())
    }

    fn set_key(&self, keycode: u16, pressed: bool) -> Result<(), DeviceError> {
        info!(keycode, pressed, "key event");
        Ok(())
    }
}
