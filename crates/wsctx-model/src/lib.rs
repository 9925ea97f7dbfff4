//! wsctx Model
//!
//! Workspace records, roles and the permission resolver.
//!
//! # Overview
//!
//! - **Workspace**: personal sentinel or shared workspace with a role
//! - **Role**: `viewer < member < admin < owner`
//! - **PermissionResolver**: pure mapping to a [`PermissionSet`]
//!
//! # Example
//!
//! ```rust
//! use wsctx_model::{Role, Workspace};
//!
//! let acme = Workspace::shared("ws_1", "Acme", Role::Member);
//! let perms = acme.permissions();
//!
//! assert!(perms.can_create_content);
//! assert!(!perms.can_manage_members);
//! assert!(acme.has_min_role(Role::Viewer));
//! ```

#![warn(missing_docs)]

pub mod permission;
pub mod role;
pub mod workspace;

// Re-exports
pub use permission::{Capability, PermissionResolver, PermissionSet};
pub use role::{ParseRoleError, Role};
pub use workspace::{InvalidWorkspace, NewWorkspace, Workspace, WorkspaceId, WorkspaceKind};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for workspace and permission handling
    pub use crate::{
        Capability, NewWorkspace, PermissionResolver, PermissionSet, Role, Workspace,
        WorkspaceId, WorkspaceKind,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
