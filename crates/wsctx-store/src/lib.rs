//! wsctx Store
//!
//! Tracks which workspace is active for the current user and keeps it in
//! sync with the backend and local storage.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use wsctx_store::{MemoryPersistence, StoreConfig, WorkspaceStore};
//!
//! # async fn example(remote: Arc<dyn wsctx_store::RemoteWorkspaceService>) {
//! let store = WorkspaceStore::new(remote, Arc::new(MemoryPersistence::new()), StoreConfig::new());
//! let state = store.init().await;
//!
//! if state.permissions().can_create_content {
//!     // show the editor
//! }
//! # }
//! ```

#![warn(unreachable_pub)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod persistence;
pub mod remote;
pub mod state;
pub mod store;

// Re-exports
pub use config::{StoreConfig, DEFAULT_STORAGE_KEY};
pub use error::{PersistenceError, RemoteError, StoreError};
pub use persistence::{FilePersistence, MemoryPersistence, PersistenceAdapter};
pub use remote::RemoteWorkspaceService;
pub use state::WorkspaceState;
pub use store::{ChangeListener, WorkspaceStore};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving a workspace store
    pub use crate::{
        PersistenceAdapter, RemoteWorkspaceService, StoreConfig, StoreError, WorkspaceState,
        WorkspaceStore,
    };
    pub use wsctx_model::prelude::*;
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
