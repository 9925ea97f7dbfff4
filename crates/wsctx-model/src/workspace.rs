//! Workspace records
//!
//! A [`Workspace`] is either the user's personal workspace (no id) or a
//! shared workspace returned by the backend. Personal status is derived from
//! the id, never stored, so the two can not disagree.

use crate::permission::{PermissionResolver, PermissionSet};
use crate::role::{self, Role};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Identifier of a shared workspace
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct WorkspaceId(String);

impl WorkspaceId {
    /// Create from any string-like value
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow as `&str`
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WorkspaceId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for WorkspaceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for WorkspaceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// Some backends emit numeric primary keys; accept both.
impl<'de> Deserialize<'de> for WorkspaceId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(i64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => Self(s),
            Raw::Number(n) => Self(n.to_string()),
        })
    }
}

/// Personal or shared workspace
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Workspace {
    /// Identifier, absent for the personal workspace
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<WorkspaceId>,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Optional logo URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    /// Role of the current user; `None` for personal or unrecognized roles
    #[serde(
        default,
        deserialize_with = "role::deserialize_lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub my_role: Option<Role>,
    /// Number of members (informational)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_count: Option<u32>,
    /// Subscription tier (informational)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_tier: Option<String>,
    /// Creation timestamp (informational)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Workspace {
    /// The personal workspace sentinel
    #[inline]
    #[must_use]
    pub fn personal() -> Self {
        Self::default()
    }

    /// Create a shared workspace record
    #[must_use]
    pub fn shared(id: impl Into<WorkspaceId>, name: impl Into<String>, role: Role) -> Self {
        Self {
            id: Some(id.into()),
            name: name.into(),
            my_role: Some(role),
            ..Self::default()
        }
    }

    /// With description
    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// With member count
    #[inline]
    #[must_use]
    pub fn with_member_count(mut self, count: u32) -> Self {
        self.member_count = Some(count);
        self
    }

    /// True exactly when the workspace has no id
    #[inline]
    #[must_use]
    pub fn is_personal(&self) -> bool {
        self.id.is_none()
    }

    /// Identifier as `&str`, if shared
    #[inline]
    #[must_use]
    pub fn id_str(&self) -> Option<&str> {
        self.id.as_ref().map(WorkspaceId::as_str)
    }

    /// Explicit role, meaningful only for shared workspaces
    #[inline]
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        if self.is_personal() {
            None
        } else {
            self.my_role
        }
    }

    /// Capability flags for this workspace
    #[inline]
    #[must_use]
    pub fn permissions(&self) -> PermissionSet {
        PermissionResolver::resolve(self.is_personal(), self.my_role)
    }

    /// Check for an exact role
    #[inline]
    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        PermissionResolver::has_role(self.is_personal(), self.my_role, role)
    }

    /// Check for a role at or above `min`
    #[inline]
    #[must_use]
    pub fn has_min_role(&self, min: Role) -> bool {
        PermissionResolver::has_min_role(self.is_personal(), self.my_role, min)
    }

    /// Name to show in a switcher
    #[must_use]
    pub fn display_name(&self, kind: WorkspaceKind) -> String {
        if self.is_personal() {
            format!("Personal {}", kind.label())
        } else {
            self.name.clone()
        }
    }
}

/// Entity name used when presenting workspaces
///
/// Teams and projects share identical semantics; only the wording differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkspaceKind {
    /// Collaborative team
    #[default]
    Team,
    /// Shared project
    Project,
}

impl WorkspaceKind {
    /// Singular label
    #[inline]
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            WorkspaceKind::Team => "Team",
            WorkspaceKind::Project => "Project",
        }
    }

    /// Plural label
    #[inline]
    #[must_use]
    pub const fn plural(self) -> &'static str {
        match self {
            WorkspaceKind::Team => "Teams",
            WorkspaceKind::Project => "Projects",
        }
    }
}

/// Payload for creating a shared workspace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewWorkspace {
    /// Display name, required
    pub name: String,
    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Optional logo URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
}

impl NewWorkspace {
    /// Create payload with a name
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            logo_url: None,
        }
    }

    /// With description
    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// With logo URL
    #[inline]
    #[must_use]
    pub fn with_logo_url(mut self, url: impl Into<String>) -> Self {
        self.logo_url = Some(url.into());
        self
    }

    /// Trim fields and reject an empty name
    ///
    /// # Errors
    /// Returns [`InvalidWorkspace`] when the trimmed name is empty.
    pub fn validated(mut self) -> Result<Self, InvalidWorkspace> {
        self.name = self.name.trim().to_string();
        if self.name.is_empty() {
            return Err(InvalidWorkspace("name must not be empty".to_string()));
        }
        self.description = self
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        self.logo_url = self
            .logo_url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty());
        Ok(self)
    }
}

/// Creation payload rejected before reaching the backend
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid workspace: {0}")]
pub struct InvalidWorkspace(pub String);
