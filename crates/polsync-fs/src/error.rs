//! Error types for polsync-fs

use std::path::PathBuf;

/// Result type for polsync-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in polsync-fs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {format} document at {path}: {message}")]
    Parse {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error("Unsupported document format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("File too large: {path} is {size} bytes (max {max})")]
    TooLarge { path: PathBuf, size: u64, max: u64 },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
