//! Error types for the workspace store
//!
//! - [`RemoteError`]: failures reported by the backend or the transport
//! - [`PersistenceError`]: local key-value storage failures
//! - [`StoreError`]: what store operations return to callers

use wsctx_model::{InvalidWorkspace, Workspace, WorkspaceId};

/// Backend call failed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    /// Credentials missing or rejected
    #[error("unauthorized")]
    Unauthorized,

    /// Non-success HTTP status
    #[error("request failed with status {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body or reason phrase
        message: String,
    },

    /// Connection, TLS or timeout failure
    #[error("transport error: {0}")]
    Transport(String),

    /// Response body did not match the expected shape
    #[error("invalid response: {0}")]
    Decode(String),
}

impl RemoteError {
    /// Check if the failure is worth retrying at the transport layer
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Status { status, .. } => *status >= 500 || *status == 429,
            Self::Unauthorized | Self::Decode(_) => false,
        }
    }
}

/// Local storage failed
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// Filesystem failure
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored data could not be encoded or decoded
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Main store error type
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Backend call failed
    #[error("remote error: {0}")]
    Remote(#[from] RemoteError),

    /// Target workspace is not in the loaded list
    #[error("unknown workspace: {0}")]
    UnknownWorkspace(WorkspaceId),

    /// Creation payload rejected locally
    #[error(transparent)]
    InvalidWorkspace(#[from] InvalidWorkspace),

    /// Workspace exists server-side but could not be made active
    #[error("workspace {} created but not activated: {source}", .workspace.name)]
    CreatedNotActivated {
        /// The created record
        workspace: Box<Workspace>,
        /// Refresh or switch failure
        source: Box<StoreError>,
    },

    /// Store was disposed
    #[error("workspace store disposed")]
    Disposed,
}

impl StoreError {
    /// Check if error is retryable
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Remote(e) => e.is_retryable(),
            Self::CreatedNotActivated { source, .. } => source.is_retryable(),
            Self::UnknownWorkspace(_) | Self::InvalidWorkspace(_) | Self::Disposed => false,
        }
    }

    /// Workspace created server-side despite the error, if any
    #[inline]
    #[must_use]
    pub fn created_workspace(&self) -> Option<&Workspace> {
        match self {
            Self::CreatedNotActivated { workspace, .. } => Some(workspace),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_error_is_retryable() {
        assert!(RemoteError::Transport("reset".to_string()).is_retryable());
        assert!(RemoteError::Status {
            status: 503,
            message: String::new()
        }
        .is_retryable());
        assert!(!RemoteError::Status {
            status: 404,
            message: String::new()
        }
        .is_retryable());
        assert!(!RemoteError::Unauthorized.is_retryable());
    }

    #[test]
    fn store_error_display() {
        let err = StoreError::UnknownWorkspace(WorkspaceId::new("ws_9"));
        assert!(err.to_string().contains("ws_9"));
    }

    #[test]
    fn created_not_activated_exposes_workspace() {
        let err = StoreError::CreatedNotActivated {
            workspace: Box::new(Workspace::shared("ws_1", "Acme", wsctx_model::Role::Owner)),
            source: Box::new(StoreError::Remote(RemoteError::Transport("down".to_string()))),
        };
        assert_eq!(err.created_workspace().map(|w| w.name.as_str()), Some("Acme"));
        assert!(err.is_retryable());
        assert!(err.to_string().contains("Acme"));
    }
}
