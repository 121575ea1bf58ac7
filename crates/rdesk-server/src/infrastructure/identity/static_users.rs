//! Config-backed identity provider.
//!
//! The user list comes from the server configuration: each entry carries a
//! username, a lowercase hex SHA-256 digest of the password, and the user's
//! groups in primary-first order.  Plaintext passwords never touch the
//! config file.
//!
//! This replaces the PAM integration of earlier deployments; hosts that need
//! system accounts would implement the same provider trait against PAM.

use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::application::gate::IdentityProvider;

/// One configured user.
#[derive(Debug, Clone, Deserialize)]
pub struct StaticUser {
    pub username: String,
    /// Lowercase hex SHA-256 of the password.
    pub password_sha256: String,
    #[serde(default)]
    pub groups: Vec<String>,
}

/// Identity provider over a fixed user list.
pub struct StaticIdentityProvider {
    users: Vec<StaticUser>,
}

impl StaticIdentityProvider {
    pub fn new(users: Vec<StaticUser>) -> Self {
        if users.is_empty() {
            warn!("no users configured; every login will fail");
        }
        Self { users }
    }

    fn find(&self, username: &str) -> Option<&StaticUser> {
        self.users.iter().find(|u| u.username == username)
    }
}

/// Lowercase hex SHA-256 of `password`, the digest form stored in config.
pub fn password_digest(password: &str) -> String {
    let digest = Sha256::digest(password.as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

impl IdentityProvider for StaticIdentityProvider {
    fn check_credentials(&self, username: &str, password: &str) -> bool {
        // Digests are fixed-length, so this comparison does not leak the
        // stored value's length.
        match self.find(username) {
            Some(user) => password_digest(password) == user.password_sha256.to_lowercase(),
            None => false,
        }
    }

    fn resolve_groups(&self, username: &str) -> Vec<String> {
        self.find(username).map(|u| u.groups.clone()).unwrap_or_default()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> StaticIdentityProvider {
        StaticIdentityProvider::new(vec![StaticUser {
            username: "operator".to_string(),
            password_sha256: password_digest("hunter2"),
            groups: vec!["operator".to_string(), "rd-control".to_string()],
        }])
    }

    #[test]
    fn test_correct_password_is_accepted() {
        assert!(provider().check_credentials("operator", "hunter2"));
    }

    #[test]
    fn test_wrong_password_is_rejected() {
        assert!(!provider().check_credentials("operator", "hunter3"));
    }

    #[test]
    fn test_unknown_user_is_rejected() {
        assert!(!provider().check_credentials("nobody", "hunter2"));
    }

    #[test]
    fn test_groups_resolve_in_configured_order() {
        assert_eq!(provider().resolve_groups("operator"), vec!["operator", "rd-control"]);
    }

    #[test]
    fn test_unknown_user_has_no_groups() {
        assert!(provider().resolve_groups("nobody").is_empty());
    }

    #[test]
    fn test_digest_is_lowercase_hex_of_sha256() {
        // SHA-256("") is a fixed, well-known value.
        assert_eq!(
            password_digest(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_uppercase_stored_digest_still_matches() {
        let provider = StaticIdentityProvider::new(vec![StaticUser {
            username: "shouty".to_string(),
            password_sha256: password_digest("pw").to_uppercase(),
            groups: vec![],
        }]);
        assert!(provider.check_credentials("shouty", "pw"));
    }
}
