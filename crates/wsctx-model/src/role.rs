//! Workspace roles
//!
//! Roles are ordered by increasing privilege: `viewer < member < admin < owner`.
//! The derived `Ord` follows declaration order, so comparisons read naturally.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role of the current user inside a shared workspace
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Read-only access
    Viewer,
    /// Can create and edit content
    Member,
    /// Can manage members, settings and delete content
    Admin,
    /// Full control including billing
    Owner,
}

impl Role {
    /// All roles in ascending privilege order
    pub const ALL: [Role; 4] = [Role::Viewer, Role::Member, Role::Admin, Role::Owner];

    /// Ordinal position in `[viewer, member, admin, owner]`
    #[inline]
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Role::Viewer => 0,
            Role::Member => 1,
            Role::Admin => 2,
            Role::Owner => 3,
        }
    }

    /// Wire name of the role
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Viewer => "viewer",
            Role::Member => "member",
            Role::Admin => "admin",
            Role::Owner => "owner",
        }
    }

    /// Check if this role is at least `min`
    #[inline]
    #[must_use]
    pub const fn at_least(self, min: Role) -> bool {
        self.rank() >= min.rank()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a role
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct ParseRoleError(pub String);

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "viewer" => Ok(Role::Viewer),
            "member" => Ok(Role::Member),
            "admin" => Ok(Role::Admin),
            "owner" => Ok(Role::Owner),
            _ => Err(ParseRoleError(s.to_string())),
        }
    }
}

/// Decode an optional role, mapping unknown strings to `None`
///
/// A single workspace with an unexpected role must not fail decoding of the
/// whole list; it simply resolves to no permissions.
pub(crate) fn deserialize_lenient<'de, D>(deserializer: D) -> Result<Option<Role>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.parse().ok()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_ordering_follows_privilege() {
        assert!(Role::Viewer < Role::Member);
        assert!(Role::Member < Role::Admin);
        assert!(Role::Admin < Role::Owner);
        assert_eq!(Role::ALL.iter().max(), Some(&Role::Owner));
    }

    #[test]
    fn role_parse_is_case_insensitive() {
        assert_eq!("Admin".parse::<Role>(), Ok(Role::Admin));
        assert_eq!(" owner ".parse::<Role>(), Ok(Role::Owner));
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn role_serde_lowercase() {
        let json = serde_json::to_string(&Role::Member).unwrap();
        assert_eq!(json, "\"member\"");

        let role: Role = serde_json::from_str("\"viewer\"").unwrap();
        assert_eq!(role, Role::Viewer);
    }

    #[test]
    fn at_least_matches_rank() {
        assert!(Role::Owner.at_least(Role::Admin));
        assert!(Role::Member.at_least(Role::Member));
        assert!(!Role::Viewer.at_least(Role::Member));
    }
}
