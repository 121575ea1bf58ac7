//! Access levels and authenticated sessions.
//!
//! rdesk uses a deliberately coarse two-tier permission model: an operator
//! either may only *watch* the desktop (`ViewOnly`) or may also *drive* it
//! (`FullControl`).  The tier is derived from the operator's group
//! membership at login time and baked into the session; there are no
//! per-action permission checks beyond this level.

use serde::{Deserialize, Serialize};

// ── Access level ──────────────────────────────────────────────────────────────

/// Coarse permission tier derived from group membership.
///
/// The derived `Ord` follows declaration order, giving the total ordering
/// `None < ViewOnly < FullControl` that [`Session::allows`] relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    /// No remote-access entitlement.  A login resolving to this level is
    /// rejected even when the credentials themselves were valid.
    None,
    /// May receive the screen/telemetry stream but not send input.
    ViewOnly,
    /// May receive the stream and drive pointer/keyboard input.
    FullControl,
}

impl AccessLevel {
    /// Stable string form used on the wire and inside token claims.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessLevel::None => "none",
            AccessLevel::ViewOnly => "view_only",
            AccessLevel::FullControl => "full_control",
        }
    }

    /// Parses the wire string form.  Inverse of [`AccessLevel::as_str`].
    pub fn parse(s: &str) -> Option<AccessLevel> {
        match s {
            "none" => Some(AccessLevel::None),
            "view_only" => Some(AccessLevel::ViewOnly),
            "full_control" => Some(AccessLevel::FullControl),
            _ => None,
        }
    }
}

impl std::fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derives the access level from an operator's resolved group list.
///
/// Precedence: membership in `control_group` wins over membership in
/// `view_group`; membership in neither yields [`AccessLevel::None`].
pub fn derive_access_level(
    groups: &[String],
    control_group: &str,
    view_group: &str,
) -> AccessLevel {
    if groups.iter().any(|g| g == control_group) {
        AccessLevel::FullControl
    } else if groups.iter().any(|g| g == view_group) {
        AccessLevel::ViewOnly
    } else {
        AccessLevel::None
    }
}

// ── Session ───────────────────────────────────────────────────────────────────

/// The authenticated, time-bounded right to act as a given user.
///
/// A `Session` is created by the access gate on successful authentication
/// and is immutable from then on: revocation invalidates the token, it never
/// edits the session in place.  Handlers receive it by reference and only
/// ever read it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Account name the credentials resolved to.
    pub username: String,
    /// Full group list: primary group first, then supplementary groups in
    /// discovery order, de-duplicated.
    pub groups: Vec<String>,
    /// Permission tier derived from `groups` at issue time.
    pub access_level: AccessLevel,
    /// Opaque signed token the client presents on subsequent requests.
    pub token: String,
    /// Seconds since the Unix epoch at issue time.
    pub issued_at: u64,
}

impl Session {
    /// Returns `true` if this session's level is at least `required`.
    pub fn allows(&self, required: AccessLevel) -> bool {
        self.access_level >= required
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with_level(level: AccessLevel) -> Session {
        Session {
            username: "operator".to_string(),
            groups: vec![],
            access_level: level,
            token: "tok".to_string(),
            issued_at: 0,
        }
    }

    #[test]
    fn test_level_ordering_is_none_view_control() {
        assert!(AccessLevel::None < AccessLevel::ViewOnly);
        assert!(AccessLevel::ViewOnly < AccessLevel::FullControl);
    }

    #[test]
    fn test_allows_rejects_higher_requirement() {
        let s = session_with_level(AccessLevel::ViewOnly);
        assert!(!s.allows(AccessLevel::FullControl));
    }

    #[test]
    fn test_allows_accepts_equal_and_lower_requirement() {
        let s = session_with_level(AccessLevel::FullControl);
        assert!(s.allows(AccessLevel::FullControl));
        assert!(s.allows(AccessLevel::ViewOnly));
        assert!(s.allows(AccessLevel::None));
    }

    #[test]
    fn test_control_group_wins_over_view_group() {
        let groups = vec!["users".to_string(), "rd-view".to_string(), "rd-control".to_string()];
        assert_eq!(
            derive_access_level(&groups, "rd-control", "rd-view"),
            AccessLevel::FullControl
        );
    }

    #[test]
    fn test_view_group_alone_gives_view_only() {
        let groups = vec!["users".to_string(), "rd-view".to_string()];
        assert_eq!(
            derive_access_level(&groups, "rd-control", "rd-view"),
            AccessLevel::ViewOnly
        );
    }

    #[test]
    fn test_no_matching_group_gives_none() {
        let groups = vec!["users".to_string(), "audio".to_string()];
        assert_eq!(
            derive_access_level(&groups, "rd-control", "rd-view"),
            AccessLevel::None
        );
    }

    #[test]
    fn test_wire_string_roundtrip() {
        for level in [AccessLevel::None, AccessLevel::ViewOnly, AccessLevel::FullControl] {
            assert_eq!(AccessLevel::parse(level.as_str()), Some(level));
        }
        assert_eq!(AccessLevel::parse("admin"), None);
    }

    #[test]
    fn test_serde_uses_snake_case_strings() {
        let json = serde_json::to_string(&AccessLevel::FullControl).unwrap();
        assert_eq!(json, "\"full_control\"");
    }
}
