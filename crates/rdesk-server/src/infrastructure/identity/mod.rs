//! Identity providers.

pub mod mock;
pub mod static_users;

pub use mock::MockIdentityProvider;
pub use static_users::{StaticIdentityProvider, StaticUser};
