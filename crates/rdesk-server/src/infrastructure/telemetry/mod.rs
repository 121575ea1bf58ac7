//! Resource counter sources.

pub mod mock;
pub mod proc;

pub use mock::MockCounterSource;
pub use proc::ProcCounterSource;
