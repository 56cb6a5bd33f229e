//! Remote accessor boundary
//!
//! The engine never talks HTTP itself. Everything it needs from the remote
//! service goes through [`RemoteAccessor`]: one synchronous call per
//! record, no retries, with non-success responses surfaced as
//! [`RemoteError::Status`].

use serde::{Deserialize, Serialize};

use polsync_meta::{Kind, Record, RecordSet};

/// A failed remote call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    /// The service answered with a non-success status
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The request never got an answer
    #[error("Network error: {0}")]
    Network(String),

    /// The answer could not be decoded
    #[error("Invalid response: {0}")]
    Decode(String),

    /// The remote has no bulk endpoint for this kind
    #[error("Bulk reconciliation is not supported by this remote")]
    Unsupported,
}

impl RemoteError {
    /// HTTP status, when the service answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Outcome of a bulk reconciliation request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkOutcome {
    #[serde(default)]
    pub created: usize,
    #[serde(default)]
    pub updated: usize,
    #[serde(default)]
    pub deleted: usize,
    #[serde(default)]
    pub errors: Vec<BulkItemError>,
}

/// One record the bulk endpoint rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkItemError {
    pub name: String,
    pub message: String,
}

/// Synchronous access to the authoritative record sets.
///
/// Calls are idempotent at record-name granularity on the remote side; a
/// repeated `create` is for the service to reject, not for the engine to
/// prevent.
pub trait RemoteAccessor {
    /// Fetch every record of kind `R::KIND`.
    fn fetch_all<R: Record>(&self) -> Result<RecordSet<R>, RemoteError>;

    fn create<R: Record>(&self, record: &R) -> Result<(), RemoteError>;

    /// Replace the named record wholesale.
    fn replace<R: Record>(&self, record: &R) -> Result<(), RemoteError>;

    fn delete(&self, kind: Kind, name: &str) -> Result<(), RemoteError>;

    /// Send the entire local set in one request and let the service
    /// reconcile it.
    fn bulk_reconcile<R: Record>(
        &self,
        records: &[R],
        delete_missing: bool,
    ) -> Result<BulkOutcome, RemoteError> {
        let _ = (records, delete_missing);
        Err(RemoteError::Unsupported)
    }
}
