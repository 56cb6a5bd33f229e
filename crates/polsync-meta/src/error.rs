//! Error types for polsync-meta

use std::path::PathBuf;

use crate::Kind;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Fs(#[from] polsync_fs::Error),

    #[error("No name found in {path}: set `name` or `metadata.name`")]
    MissingIdentity { path: PathBuf },

    #[error("Duplicate name '{name}' defined in {first} and {second}")]
    DuplicateDefinition {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("Invalid {kind} definition at {path}: {message}")]
    InvalidRecord {
        kind: Kind,
        path: PathBuf,
        message: String,
    },

    #[error("Refusing {kind} record with an empty name")]
    EmptyName { kind: Kind },

    #[error("Duplicate {kind} record '{name}'")]
    DuplicateRecord { kind: Kind, name: String },

    #[error("Unknown kind: {value}")]
    UnknownKind { value: String },
}
