//! Screen capture backends.

pub mod mock;
pub mod test_pattern;

pub use mock::MockCaptureBackend;
pub use test_pattern::TestPatternCapture;
