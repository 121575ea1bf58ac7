//! Mock input device for unit testing.
//!
//! A real injection backend moves the cursor and presses keys on the host,
//! which a test cannot observe and must not do.  `MockDeviceBackend` replaces
//! every OS call with in-memory recording: each attempted event is pushed
//! into a `Mutex<Vec<DeviceCall>>` so assertions can inspect exactly what was
//! emitted and in what order.
//!
//! Failure injection is per event class (`fail_moves`, `fail_key_releases`).
//! A failing call is still recorded before the error is returned, so tests
//! can distinguish "never attempted" from "attempted and failed".

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use rdesk_core::domain::input::PointerButton;

use crate::application::input_pipeline::{DeviceBackend, DeviceError};

/// One recorded call to the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceCall {
    Move { x: i32, y: i32 },
    Button { button: PointerButton, pressed: bool },
    Key { keycode: u16, pressed: bool },
}

/// A device that records all calls without touching the OS.
pub struct MockDeviceBackend {
    width: u32,
    height: u32,
    calls: Mutex<Vec<DeviceCall>>,
    fail_moves: AtomicBool,
    fail_key_releases: AtomicBool,
}

impl MockDeviceBackend {
    /// Creates a mock reporting the given screen dimensions.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            calls: Mutex::new(Vec::new()),
            fail_moves: AtomicBool::new(false),
            fail_key_releases: AtomicBool::new(false),
        }
    }

    /// Snapshot of every recorded call, in emission order.
    pub fn calls(&self) -> Vec<DeviceCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Makes every subsequent `move_absolute` fail (after recording).
    pub fn fail_moves(&self) {
        self.fail_moves.store(true, Ordering::SeqCst);
    }

    /// Makes every subsequent key *release* fail (after recording).  Key
    /// presses still succeed, which exercises the attempted-release path.
    pub fn fail_key_releases(&self) {
        self.fail_key_releases.store(true, Ordering::SeqCst);
    }
}

impl DeviceBackend for MockDeviceBackend {
    fn screen_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn move_absolute(&self, x: i32, y: i32) -> Result<(), DeviceError> {
        self.calls.lock().unwrap().push(DeviceCall::Move { x, y });
        if self.fail_moves.load(Ordering::SeqCst) {
            return Err(DeviceError("mock move failure".to_string()));
        }
        Ok(())
    }

    fn set_button(&self, button: PointerButton, pressed: bool) -> Result<(), DeviceError> {
        self.calls.lock().unwrap().push(DeviceCall::Button { button, pressed });
        Ok(())
    }

    fn set_key(&self, keycode: u16, pressed: bool) -> Result<(), DeviceError> {
        self.calls.lock().unwrap().push(DeviceCall::Key { keycode, pressed });
        if !pressed && self.fail_key_releases.load(Ordering::SeqCst) {
            return Err(DeviceError("mock key release failure".to_string()));
        }
        Ok(())
    }
}
