//! Access control gate: credential check → durable, revocable session.
//!
//! The gate converts a one-time credential verification into a signed,
//! expiring session token carrying the operator's access level.  Validation
//! is stateless (signature + expiry) with one piece of server-side state: a
//! revocation set holding the signature tags of logged-out tokens.
//!
//! # Token format
//!
//! ```text
//! base64url(claims JSON) "." base64url(HMAC-SHA256 tag over the claims part)
//! ```
//!
//! Claims are `{sub, level, iat, exp}`.  The tag is keyed with a per-process
//! (or configured) 32-byte secret, so a token cannot be forged or altered
//! without it, and it encodes enough to reconstruct the session without a
//! server-side store.  Signature comparison goes through `Mac::verify_slice`,
//! which is constant-time, so a caller cannot learn from response timing
//! whether a token was malformed, tampered, or revoked.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;
use tracing::{debug, info};

use rdesk_core::domain::access::{derive_access_level, AccessLevel, Session};

type HmacSha256 = Hmac<Sha256>;

// ── Errors ────────────────────────────────────────────────────────────────────

/// Gate failure modes.
///
/// `BadCredentials` and `NoEntitlement` are deliberately distinct: the second
/// means the password was right but the account carries no remote-access
/// group.  The token variants are distinct for logging; the HTTP layer
/// collapses them into one response.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GateError {
    #[error("invalid credentials")]
    BadCredentials,
    #[error("valid user without remote-access entitlement")]
    NoEntitlement,
    #[error("token is structurally malformed")]
    TokenMalformed,
    #[error("token signature does not verify")]
    TokenSignature,
    #[error("token has expired")]
    TokenExpired,
    #[error("token has been revoked")]
    TokenRevoked,
}

// ── Identity provider boundary ────────────────────────────────────────────────

/// Credential verification and group resolution, consumed by the gate.
///
/// rdesk does not implement credential storage; the original system used PAM
/// plus the system group database.  Implementations live in
/// `infrastructure::identity`.
pub trait IdentityProvider: Send + Sync {
    /// Returns `true` if the username/password pair is valid.
    fn check_credentials(&self, username: &str, password: &str) -> bool;

    /// Returns the user's groups: primary group first, then supplementary
    /// groups in discovery order.
    fn resolve_groups(&self, username: &str) -> Vec<String>;
}

// ── Token signer ──────────────────────────────────────────────────────────────

/// Claims embedded in a session token.
#[derive(Debug, Serialize, Deserialize)]
struct TokenClaims {
    /// Username the session acts as.
    sub: String,
    /// Access level string (`"view_only"` / `"full_control"`).
    level: String,
    /// Issue time, seconds since the Unix epoch.
    iat: u64,
    /// Expiry time, seconds since the Unix epoch.
    exp: u64,
}

/// Mints and verifies HMAC-SHA256 signed session tokens.
pub struct TokenSigner {
    secret: Vec<u8>,
}

impl TokenSigner {
    /// Creates a signer with the given secret.  Use
    /// [`TokenSigner::random_secret`] when no secret is configured.
    pub fn new(secret: Vec<u8>) -> Self {
        Self { secret }
    }

    /// Generates a fresh 32-byte signing secret.
    ///
    /// Tokens signed with a generated secret do not survive a process
    /// restart, which is the desired behavior for an unconfigured server.
    pub fn random_secret() -> Vec<u8> {
        use rand::RngCore;
        let mut secret = vec![0u8; 32];
        rand::thread_rng().fill_bytes(&mut secret);
        secret
    }

    fn mac(&self) -> HmacSha256 {
        // HMAC accepts keys of any length, so this cannot fail.
        HmacSha256::new_from_slice(&self.secret).expect("HMAC accepts any key length")
    }

    /// Mints a token for `username` at `level`, issued at `now` and expiring
    /// `ttl_secs` later.
    pub fn mint(&self, username: &str, level: AccessLevel, now: u64, ttl_secs: u64) -> String {
        let claims = TokenClaims {
            sub: username.to_string(),
            level: level.as_str().to_string(),
            iat: now,
            exp: now.saturating_add(ttl_secs),
        };
        let payload = URL_SAFE_NO_PAD
            .encode(serde_json::to_vec(&claims).expect("claims always serialize"));
        let mut mac = self.mac();
        mac.update(payload.as_bytes());
        let tag = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        format!("{payload}.{tag}")
    }

    /// Verifies structure, signature, and expiry at time `now`, returning
    /// the recovered `(username, level, issued_at)`.
    pub fn verify(&self, token: &str, now: u64) -> Result<(String, AccessLevel, u64), GateError> {
        let (payload, tag) = token.split_once('.').ok_or(GateError::TokenMalformed)?;
        let tag_bytes = URL_SAFE_NO_PAD
            .decode(tag)
            .map_err(|_| GateError::TokenMalformed)?;

        // Constant-time comparison of the authentication tag.
        let mut mac = self.mac();
        mac.update(payload.as_bytes());
        mac.verify_slice(&tag_bytes)
            .map_err(|_| GateError::TokenSignature)?;

        let claims_bytes = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| GateError::TokenMalformed)?;
        let claims: TokenClaims =
            serde_json::from_slice(&claims_bytes).map_err(|_| GateError::TokenMalformed)?;
        let level = AccessLevel::parse(&claims.level).ok_or(GateError::TokenMalformed)?;

        if now >= claims.exp {
            return Err(GateError::TokenExpired);
        }
        Ok((claims.sub, level, claims.iat))
    }
}

// ── Access gate ───────────────────────────────────────────────────────────────

/// Settings controlling level derivation and token lifetime.
#[derive(Debug, Clone)]
pub struct GatePolicy {
    /// Group granting [`AccessLevel::FullControl`].
    pub control_group: String,
    /// Group granting [`AccessLevel::ViewOnly`].
    pub view_group: String,
    /// Token lifetime in seconds.
    pub token_ttl_secs: u64,
}

impl Default for GatePolicy {
    fn default() -> Self {
        Self {
            control_group: "rd-control".to_string(),
            view_group: "rd-view".to_string(),
            token_ttl_secs: 8 * 60 * 60,
        }
    }
}

/// The access control gate.
///
/// Sessions are immutable once issued; `revoke` blacklists the token's
/// signature tag rather than mutating anything.  The revocation set is the
/// only shared mutable state and takes its own lock on insert/lookup.
pub struct AccessGate {
    identity: Arc<dyn IdentityProvider>,
    signer: TokenSigner,
    policy: GatePolicy,
    revoked: Mutex<HashSet<String>>,
}

impl AccessGate {
    pub fn new(identity: Arc<dyn IdentityProvider>, signer: TokenSigner, policy: GatePolicy) -> Self {
        Self {
            identity,
            signer,
            policy,
            revoked: Mutex::new(HashSet::new()),
        }
    }

    /// Verifies credentials, resolves groups, derives the access level, and
    /// mints a session.
    ///
    /// A user whose groups resolve to [`AccessLevel::None`] is rejected with
    /// [`GateError::NoEntitlement`] even though the credentials were valid.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<Session, GateError> {
        if !self.identity.check_credentials(username, password) {
            debug!(username, "authentication failed: bad credentials");
            return Err(GateError::BadCredentials);
        }

        let groups = dedup_preserving_order(self.identity.resolve_groups(username));
        let level = derive_access_level(&groups, &self.policy.control_group, &self.policy.view_group);
        if level == AccessLevel::None {
            info!(username, "authentication rejected: no remote-access group");
            return Err(GateError::NoEntitlement);
        }

        let now = now_unix();
        let token = self.signer.mint(username, level, now, self.policy.token_ttl_secs);
        info!(username, level = level.as_str(), "session issued");
        Ok(Session {
            username: username.to_string(),
            groups,
            access_level: level,
            token,
            issued_at: now,
        })
    }

    /// Validates a presented token and reconstructs its session.
    ///
    /// The group list is not re-resolved: the access level inside the signed
    /// claims is authoritative for the session's lifetime.
    pub fn validate(&self, token: &str) -> Result<Session, GateError> {
        self.validate_at(token, now_unix())
    }

    /// [`AccessGate::validate`] with an explicit clock, for expiry tests.
    pub fn validate_at(&self, token: &str, now: u64) -> Result<Session, GateError> {
        let (username, level, issued_at) = self.signer.verify(token, now)?;
        if self.is_revoked(token) {
            return Err(GateError::TokenRevoked);
        }
        Ok(Session {
            username,
            groups: Vec::new(),
            access_level: level,
            token: token.to_string(),
            issued_at,
        })
    }

    /// Returns `true` if `session` meets `required` on the ordering
    /// `None < ViewOnly < FullControl`.
    pub fn authorize(&self, session: &Session, required: AccessLevel) -> bool {
        session.allows(required)
    }

    /// Invalidates the session behind `token`.  Subsequent `validate` calls
    /// for it fail.  Unverifiable tokens are ignored — there is no session
    /// to invalidate.
    pub fn revoke(&self, token: &str) {
        // Expiry is irrelevant here; a revoked-then-expired token must stay
        // invalid, so verify against the issue-time clock bound only.
        if self.signer.verify(token, 0).is_err() {
            debug!("revoke ignored: token does not verify");
            return;
        }
        if let Some((_, tag)) = token.split_once('.') {
            self.revoked.lock().unwrap().insert(tag.to_string());
            info!("session token revoked");
        }
    }

    fn is_revoked(&self, token: &str) -> bool {
        match token.split_once('.') {
            Some((_, tag)) => self.revoked.lock().unwrap().contains(tag),
            None => false,
        }
    }
}

fn dedup_preserving_order(groups: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    groups.into_iter().filter(|g| seen.insert(g.clone())).collect()
}

/// Seconds since the Unix epoch.
pub fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
