//! Input injection backends.
//!
//! The real backend would drive a platform injection device; the mock records
//! every call for assertions.

pub mod mock;
pub mod trace;

pub use mock::{DeviceCall, MockDeviceBackend};
pub use trace::TraceDeviceBackend;
