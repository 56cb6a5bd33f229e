//! Error types for polsync-remote

/// Result type for polsync-remote operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors building a remote client. Per-call failures are
/// [`polsync_core::RemoteError`]s instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The configured base URL cannot carry API paths
    #[error("Invalid remote URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    /// The HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
