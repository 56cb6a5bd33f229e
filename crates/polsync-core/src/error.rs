//! Error types for polsync-core

use polsync_meta::Kind;

/// Result type for polsync-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in polsync-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Fetching or bulk-applying a whole kind failed
    #[error("Remote {kind} request failed: {source}")]
    Remote {
        kind: Kind,
        #[source]
        source: crate::remote::RemoteError,
    },

    /// The policy-evaluation runtime could not be invoked or answered garbage
    #[error("Evaluator failed for policy '{policy}': {message}")]
    Evaluator { policy: String, message: String },

    /// Configuration is missing a required value or is inconsistent
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Metadata error from polsync-meta (scan and schema failures)
    #[error(transparent)]
    Meta(#[from] polsync_meta::Error),

    /// Filesystem error from polsync-fs
    #[error(transparent)]
    Fs(#[from] polsync_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// YAML serialization error
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}
