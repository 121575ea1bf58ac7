//! Wire message types and the payload transfer encoding.

pub mod messages;
pub mod transfer;
