//! Store configuration

use serde::{Deserialize, Serialize};
use wsctx_model::WorkspaceKind;

/// Default persistence key for the last active workspace id
pub const DEFAULT_STORAGE_KEY: &str = "current_workspace_id";

/// Workspace store configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Key under which the active workspace id is persisted
    pub storage_key: String,
    /// Entity name used for display
    pub kind: WorkspaceKind,
}

impl StoreConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With storage key
    #[inline]
    #[must_use]
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// With display kind
    #[inline]
    #[must_use]
    pub fn with_kind(mut self, kind: WorkspaceKind) -> Self {
        self.kind = kind;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            kind: WorkspaceKind::Team,
        }
    }
}
