//! Client construction errors
//!
//! Request failures are reported as [`wsctx_store::RemoteError`].

/// Building an HTTP client failed
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// `base_url` is not an absolute http(s) URL
    #[error("invalid base url: {0}")]
    InvalidBaseUrl(String),

    /// reqwest rejected the client configuration
    #[error("failed to build http client: {0}")]
    Build(#[from] reqwest::Error),
}
