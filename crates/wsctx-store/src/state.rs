//! Published store state

use serde::Serialize;
use wsctx_model::{PermissionSet, Role, Workspace, WorkspaceId};

/// Snapshot of the store published to subscribers
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct WorkspaceState {
    /// Shared workspaces visible to the user
    pub workspaces: Vec<Workspace>,
    /// Active workspace: personal or a member of `workspaces`
    pub active: Workspace,
    /// A load is in flight
    pub loading: bool,
}

impl WorkspaceState {
    /// Look up a loaded workspace by id
    #[must_use]
    pub fn find(&self, id: &WorkspaceId) -> Option<&Workspace> {
        self.workspaces.iter().find(|w| w.id.as_ref() == Some(id))
    }

    /// Active workspace is personal
    #[inline]
    #[must_use]
    pub fn is_personal(&self) -> bool {
        self.active.is_personal()
    }

    /// Permissions of the active workspace
    #[inline]
    #[must_use]
    pub fn permissions(&self) -> PermissionSet {
        self.active.permissions()
    }

    /// Exact role check on the active workspace
    #[inline]
    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.active.has_role(role)
    }

    /// Minimum role check on the active workspace
    #[inline]
    #[must_use]
    pub fn has_min_role(&self, min: Role) -> bool {
        self.active.has_min_role(min)
    }
}
