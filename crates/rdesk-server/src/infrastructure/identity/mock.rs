//! Mock identity provider for tests.
//!
//! An in-memory user table with plaintext passwords plus a kill switch that
//! rejects everyone, for exercising the bad-credentials path regardless of
//! input.

use std::sync::Mutex;

use crate::application::gate::IdentityProvider;

struct MockUser {
    username: String,
    password: String,
    groups: Vec<String>,
}

#[derive(Default)]
pub struct MockIdentityProvider {
    users: Mutex<Vec<MockUser>>,
    reject_all: Mutex<bool>,
}

impl MockIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a user; `groups` are kept in the given order.
    pub fn add_user(&self, username: &str, password: &str, groups: &[&str]) {
        self.users.lock().unwrap().push(MockUser {
            username: username.to_string(),
            password: password.to_string(),
            groups: groups.iter().map(|g| g.to_string()).collect(),
        });
    }

    /// Makes every credential check fail from now on.
    pub fn reject_all(&self) {
        *self.reject_all.lock().unwrap() = true;
    }
}

impl IdentityProvider for MockIdentityProvider {
    fn check_credentials(&self, username: &str, password: &str) -> bool {
        if *self.reject_all.lock().unwrap() {
            return false;
        }
        self.users
            .lock()
            .unwrap()
            .iter()
            .any(|u| u.username == username && u.password == password)
    }

    fn resolve_groups(&self, username: &str) -> Vec<String> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username == username)
            .map(|u| u.groups.clone())
            .unwrap_or_default()
    }
}
