//! Pure domain types with no OS or I/O dependencies.

pub mod access;
pub mod input;
