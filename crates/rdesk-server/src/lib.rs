//! # rdesk-server
//!
//! The rdesk service: lets an authorized remote operator view and control a
//! desktop session over the network.
//!
//! The server is composed of five cooperating parts:
//!
//! - **Access gate** ([`application::gate`]) – authenticates credentials
//!   against an identity provider, derives a coarse access level from group
//!   membership, and mints/validates/revokes signed session tokens.
//! - **Input pipeline** ([`application::input_pipeline`]) – validates remote
//!   pointer/keyboard commands and drives timed press/release sequences on a
//!   device backend.
//! - **Capture pipeline** ([`application::capture_pipeline`]) – acquires raw
//!   frames, compresses them to JPEG, and wraps them for text transport.
//! - **Resource sampler** ([`application::sampler`]) – computes point-in-time
//!   CPU/RAM utilization from cumulative counters.
//! - **Stream hub** ([`application::hub`]) – owns the live WebSocket
//!   connection set and the two periodic producer tasks that feed it.
//!
//! The OS facilities the original system obtained through custom kernel
//! syscalls (input injection, framebuffer capture, PAM) are consumed through
//! traits here; `infrastructure/` provides the concrete adapters, including
//! recording mocks for tests and synthetic demo backends.

pub mod application;
pub mod error;
pub mod infrastructure;

pub use error::ApiError;
