//! Infrastructure layer: everything that touches the OS or the network.
//!
//! Each submodule implements one of the boundary traits declared by the
//! application layer, plus a recording mock for tests:
//!
//! - `identity` — credential checking and group lookup
//! - `device` — synthesized pointer/keyboard events
//! - `capture` — raw framebuffer acquisition
//! - `telemetry` — kernel CPU/memory counters
//! - `http` — the axum router, REST handlers, and the streaming socket
//! - `storage` — TOML server configuration

pub mod capture;
pub mod device;
pub mod http;
pub mod identity;
pub mod storage;
pub mod telemetry;
