//! Synthetic capture backend.
//!
//! Serves a moving gradient in BGRA layout on hosts without a framebuffer
//! (containers, headless CI).  The pattern advances one step per captured
//! frame so consecutive frames differ and a viewer can confirm the stream is
//! live.  A production deployment would swap in a framebuffer- or
//! compositor-backed implementation of the same trait.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::application::capture_pipeline::{CaptureBackend, CaptureError, RawFrame};

/// Generates BGRA gradient frames of a fixed size.
pub struct TestPatternCapture {
    width: u32,
    height: u32,
    frame_counter: AtomicU64,
}

impl TestPatternCapture {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            frame_counter: AtomicU64::new(0),
        }
    }
}

impl CaptureBackend for TestPatternCapture {
    fn capture_frame(&self) -> Result<RawFrame, CaptureError> {
        let step = self.frame_counter.fetch_add(1, Ordering::Relaxed);
        let mut data = Vec::with_capacity((self.width * self.height * 4) as usize);
        for y in 0..self.height {
            for x in 0..self.width {
                let b = ((x * 255 / self.width) as u64 + step) as u8;
                let g = (y * 255 / self.height) as u8;
                let r = (step % 256) as u8;
                data.extend_from_slice(&[b, g, r, 0xFF]);
            }
        }
        Ok(RawFrame {
            width: self.width,
            height: self.height,
            bytes_per_pixel: 4,
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_has_declared_dimensions_and_layout() {
        let capture = TestPatternCapture::new(64, 32);
        let frame = capture.capture_frame().unwrap();
        assert_eq!(frame.width, 64);
        assert_eq!(frame.height, 32);
        assert_eq!(frame.bytes_per_pixel, 4);
        assert_eq!(frame.data.len(), 64 * 32 * 4);
    }

    #[test]
    fn test_consecutive_frames_differ() {
        let capture = TestPatternCapture::new(16, 16);
        let first = capture.capture_frame().unwrap();
        let second = capture.capture_frame().unwrap();
        assert_ne!(first.data, second.data);
    }

    #[test]
    fn test_zero_dimensions_are_clamped() {
        let capture = TestPatternCapture::new(0, 0);
        let frame = capture.capture_frame().unwrap();
        assert_eq!((frame.width, frame.height), (1, 1));
    }
}
