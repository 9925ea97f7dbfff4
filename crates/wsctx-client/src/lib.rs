//! wsctx Client
//!
//! [`HttpWorkspaceService`] implements [`wsctx_store::RemoteWorkspaceService`]
//! over HTTP with `reqwest`.

#![warn(unreachable_pub)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod http;

// Re-exports
pub use config::ClientConfig;
pub use error::ClientError;
pub use http::HttpWorkspaceService;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
