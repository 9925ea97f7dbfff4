//! Permission resolution
//!
//! Pure mapping from `(is_personal, my_role)` to capability flags:
//!
//! | capability                        | personal | owner | admin | member | viewer | none |
//! |-----------------------------------|----------|-------|-------|--------|--------|------|
//! | create / edit content             | yes      | yes   | yes   | yes    | no     | no   |
//! | delete, members, settings, invite | yes      | yes   | yes   | no     | no     | no   |
//! | manage billing                    | yes      | yes   | no    | no     | no     | no   |
//!
//! A shared workspace without a role gets no capabilities.

use crate::role::Role;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Derived capability flags for a workspace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PermissionSet {
    /// Create new content
    pub can_create_content: bool,
    /// Edit existing content
    pub can_edit_content: bool,
    /// Delete content
    pub can_delete_content: bool,
    /// Change member roles or remove members
    pub can_manage_members: bool,
    /// Change workspace settings
    pub can_manage_settings: bool,
    /// Invite new members
    pub can_invite_members: bool,
    /// Manage subscription and billing
    pub can_manage_billing: bool,
    /// Shared workspace with the viewer role
    pub is_viewer_role: bool,
}

impl PermissionSet {
    /// Everything granted (personal workspace)
    #[must_use]
    pub const fn all() -> Self {
        Self {
            can_create_content: true,
            can_edit_content: true,
            can_delete_content: true,
            can_manage_members: true,
            can_manage_settings: true,
            can_invite_members: true,
            can_manage_billing: true,
            is_viewer_role: false,
        }
    }

    /// Nothing granted
    #[must_use]
    pub const fn none() -> Self {
        Self {
            can_create_content: false,
            can_edit_content: false,
            can_delete_content: false,
            can_manage_members: false,
            can_manage_settings: false,
            can_invite_members: false,
            can_manage_billing: false,
            is_viewer_role: false,
        }
    }

    /// Check a single capability
    #[inline]
    #[must_use]
    pub const fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::CreateContent => self.can_create_content,
            Capability::EditContent => self.can_edit_content,
            Capability::DeleteContent => self.can_delete_content,
            Capability::ManageMembers => self.can_manage_members,
            Capability::ManageSettings => self.can_manage_settings,
            Capability::InviteMembers => self.can_invite_members,
            Capability::ManageBilling => self.can_manage_billing,
        }
    }

    /// Capabilities granted, in declaration order
    #[must_use]
    pub fn granted(&self) -> Vec<Capability> {
        Capability::ALL
            .into_iter()
            .filter(|c| self.allows(*c))
            .collect()
    }
}

/// A single gated action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Create new content
    CreateContent,
    /// Edit existing content
    EditContent,
    /// Delete content
    DeleteContent,
    /// Manage members
    ManageMembers,
    /// Manage settings
    ManageSettings,
    /// Invite members
    InviteMembers,
    /// Manage billing
    ManageBilling,
}

impl Capability {
    /// All capabilities
    pub const ALL: [Capability; 7] = [
        Capability::CreateContent,
        Capability::EditContent,
        Capability::DeleteContent,
        Capability::ManageMembers,
        Capability::ManageSettings,
        Capability::InviteMembers,
        Capability::ManageBilling,
    ];

    /// Minimum role that grants this capability on a shared workspace
    #[inline]
    #[must_use]
    pub const fn min_role(self) -> Role {
        match self {
            Capability::CreateContent | Capability::EditContent => Role::Member,
            Capability::DeleteContent
            | Capability::ManageMembers
            | Capability::ManageSettings
            | Capability::InviteMembers => Role::Admin,
            Capability::ManageBilling => Role::Owner,
        }
    }

    /// Snake-case name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Capability::CreateContent => "create_content",
            Capability::EditContent => "edit_content",
            Capability::DeleteContent => "delete_content",
            Capability::ManageMembers => "manage_members",
            Capability::ManageSettings => "manage_settings",
            Capability::InviteMembers => "invite_members",
            Capability::ManageBilling => "manage_billing",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stateless resolver from workspace status and role to permissions
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissionResolver;

impl PermissionResolver {
    /// Resolve the full permission set
    ///
    /// Total: every input yields a set. A personal workspace ignores `role`.
    #[must_use]
    pub fn resolve(is_personal: bool, role: Option<Role>) -> PermissionSet {
        if is_personal {
            return PermissionSet::all();
        }
        let Some(role) = role else {
            return PermissionSet::none();
        };

        let grants = |c: Capability| role.at_least(c.min_role());
        PermissionSet {
            can_create_content: grants(Capability::CreateContent),
            can_edit_content: grants(Capability::EditContent),
            can_delete_content: grants(Capability::DeleteContent),
            can_manage_members: grants(Capability::ManageMembers),
            can_manage_settings: grants(Capability::ManageSettings),
            can_invite_members: grants(Capability::InviteMembers),
            can_manage_billing: grants(Capability::ManageBilling),
            is_viewer_role: role == Role::Viewer,
        }
    }

    /// Exact role match; always false for personal
    #[inline]
    #[must_use]
    pub fn has_role(is_personal: bool, role: Option<Role>, expected: Role) -> bool {
        !is_personal && role == Some(expected)
    }

    /// Role at or above `min`; always true for personal, false without a role
    #[inline]
    #[must_use]
    pub fn has_min_role(is_personal: bool, role: Option<Role>, min: Role) -> bool {
        if is_personal {
            return true;
        }
        role.is_some_and(|r| r.at_least(min))
    }
}
