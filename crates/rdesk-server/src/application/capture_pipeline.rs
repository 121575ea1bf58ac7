//! Capture pipeline: raw framebuffer → JPEG → text payload.
//!
//! Each cycle acquires one frame from the capture backend, normalizes the
//! pixel layout, compresses it, and wraps it as a [`StreamMessage`] for the
//! hub.  Frames are transient: produced, transformed, and dropped within the
//! cycle, never cached.  Any stage failure means "nothing to publish this
//! tick" — the hub treats it as a skipped tick, not a fatal condition.

use std::io::Cursor;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;
use thiserror::Error;
use tracing::{debug, warn};

use rdesk_core::protocol::messages::StreamMessage;
use rdesk_core::protocol::transfer::encode_payload;

// ── Capture backend boundary ──────────────────────────────────────────────────

/// One raw frame as reported by the capture backend.
///
/// The backend's dimensions are authoritative — they may differ from any
/// requested or configured resolution and downstream stages always use them.
#[derive(Debug, Clone)]
pub struct RawFrame {
    pub width: u32,
    pub height: u32,
    /// 4 for BGRA, 3 for BGR.
    pub bytes_per_pixel: u32,
    pub data: Vec<u8>,
}

/// A failed frame acquisition.
#[derive(Debug, Error)]
#[error("capture backend error: {0}")]
pub struct CaptureError(pub String);

/// The OS facility that returns the current on-screen raster.
/// Implementations live in `infrastructure::capture`.
pub trait CaptureBackend: Send + Sync {
    fn capture_frame(&self) -> Result<RawFrame, CaptureError>;
}

// ── Encoding ──────────────────────────────────────────────────────────────────

/// A compressed frame ready for transport.
#[derive(Debug, Clone)]
pub struct EncodedFrame {
    pub jpeg: Vec<u8>,
    /// Milliseconds since the Unix epoch at capture time.
    pub timestamp: u64,
}

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("unsupported pixel layout: {0} bytes per pixel")]
    UnsupportedLayout(u32),
    #[error("frame buffer is {actual} bytes, expected {expected}")]
    ShortBuffer { expected: usize, actual: usize },
    #[error("jpeg compression failed: {0}")]
    Jpeg(String),
}

/// Normalizes a BGRA/BGR frame to RGB and compresses it as JPEG.
///
/// Compression is lossy; `quality` (1–100) trades size for fidelity and is
/// not a correctness concern.
pub fn encode_frame(frame: &RawFrame, quality: u8) -> Result<EncodedFrame, EncodeError> {
    let bpp = frame.bytes_per_pixel as usize;
    if bpp != 3 && bpp != 4 {
        return Err(EncodeError::UnsupportedLayout(frame.bytes_per_pixel));
    }
    let expected = frame.width as usize * frame.height as usize * bpp;
    if frame.data.len() < expected {
        return Err(EncodeError::ShortBuffer { expected, actual: frame.data.len() });
    }

    // Framebuffers hand out BGR(A); JPEG wants RGB with the channels swapped
    // and any alpha dropped.
    let mut rgb = Vec::with_capacity(frame.width as usize * frame.height as usize * 3);
    for px in frame.data[..expected].chunks_exact(bpp) {
        rgb.extend_from_slice(&[px[2], px[1], px[0]]);
    }

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(Cursor::new(&mut jpeg), quality)
        .encode(&rgb, frame.width, frame.height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::Jpeg(e.to_string()))?;

    Ok(EncodedFrame { jpeg, timestamp: now_millis() })
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// ── Pipeline ──────────────────────────────────────────────────────────────────

/// Drives capture → compress → text-encode for the frame producer.
pub struct CapturePipeline {
    backend: Arc<dyn CaptureBackend>,
    quality: u8,
}

impl CapturePipeline {
    pub fn new(backend: Arc<dyn CaptureBackend>, quality: u8) -> Self {
        Self { backend, quality: quality.clamp(1, 100) }
    }

    /// Produces the next screenshot message, or `None` when any stage failed
    /// this cycle.
    pub fn next_message(&self) -> Option<StreamMessage> {
        let frame = match self.backend.capture_frame() {
            Ok(frame) => frame,
            Err(e) => {
                warn!("frame capture failed, skipping tick: {e}");
                return None;
            }
        };
        debug!(
            width = frame.width,
            height = frame.height,
            bytes = frame.data.len(),
            "frame captured"
        );
        let encoded = match encode_frame(&frame, self.quality) {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!("frame encoding failed, skipping tick: {e}");
                return None;
            }
        };
        Some(StreamMessage::Screenshot {
            data: encode_payload(&encoded.jpeg),
            timestamp: encoded.timestamp,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
