//! Backend collaborator
//!
//! The store talks to the backend only through [`RemoteWorkspaceService`].
//! The HTTP binding lives in `wsctx-client`; tests use an in-memory fake.

use crate::error::RemoteError;
use async_trait::async_trait;
use wsctx_model::{NewWorkspace, Workspace, WorkspaceId};

/// Workspace endpoints of the backend
#[async_trait]
pub trait RemoteWorkspaceService: Send + Sync + 'static {
    /// All workspaces visible to the authenticated user
    async fn list_workspaces(&self) -> Result<Vec<Workspace>, RemoteError>;

    /// Server-recorded active workspace; `None` means personal
    async fn current_workspace(&self) -> Result<Option<Workspace>, RemoteError>;

    /// Switch the server-side context; `None` selects personal
    async fn switch_workspace(&self, id: Option<&WorkspaceId>) -> Result<(), RemoteError>;

    /// Create a shared workspace and return the new record
    async fn create_workspace(&self, data: &NewWorkspace) -> Result<Workspace, RemoteError>;
}
