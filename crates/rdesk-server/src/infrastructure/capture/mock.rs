//! Mock capture backend for unit testing.
//!
//! Returns a fixed frame (or a fixed failure) so pipeline tests control
//! exactly what the encoder sees.

use crate::application::capture_pipeline::{CaptureBackend, CaptureError, RawFrame};

/// A capture backend with a canned result.
pub struct MockCaptureBackend {
    frame: Option<RawFrame>,
}

impl MockCaptureBackend {
    /// Every `capture_frame` call returns a clone of `frame`.
    pub fn with_frame(frame: RawFrame) -> Self {
        Self { frame: Some(frame) }
    }

    /// Every `capture_frame` call fails.
    pub fn failing() -> Self {
        Self { frame: None }
    }
}

impl CaptureBackend for MockCaptureBackend {
    fn capture_frame(&self) -> Result<RawFrame, CaptureError> {
        match &self.frame {
            Some(frame) => Ok(frame.clone()),
            None => Err(CaptureError("mock capture failure".to_string())),
        }
    }
}
