//! Reconciliation engine
//!
//! - **reconcile**: three-way diff of a local and a remote [`RecordSet`]
//! - **apply**: issue the diff through a [`RemoteAccessor`](crate::RemoteAccessor)
//! - **preview**: render a diff for humans without touching the remote

mod apply;
mod preview;

pub use apply::{ApplyOptions, ApplyReport, Operation, RecordFailure, apply, apply_bulk};
pub use preview::{DiffPreview, UpdatePreview};

use polsync_meta::{Record, RecordSet, structural_eq};

/// How two records with the same name are compared.
pub enum EqualityRule<R> {
    /// Serialized form, surrogate `id` removed.
    Structural,
    /// A kind-specific comparison.
    Custom(fn(&R, &R) -> bool),
}

impl<R: Record> EqualityRule<R> {
    /// The rule a kind declares through [`Record::same_content`].
    pub fn for_kind() -> Self {
        Self::Custom(R::same_content)
    }

    pub fn equals(&self, local: &R, remote: &R) -> bool {
        match self {
            Self::Structural => structural_eq(local, remote),
            Self::Custom(eq) => eq(local, remote),
        }
    }
}

impl<R: Record> Default for EqualityRule<R> {
    fn default() -> Self {
        Self::for_kind()
    }
}

/// The operations that make a remote set match a local set.
///
/// A name appears in at most one of the three sets. Names present on both
/// sides with equal content appear in none of them.
#[derive(Debug, Clone)]
pub struct DiffResult<R> {
    pub to_insert: RecordSet<R>,
    /// Local content, carrying the remote surrogate id where one exists.
    pub to_update: RecordSet<R>,
    pub to_delete: RecordSet<R>,
    pub unchanged: Vec<String>,
}

impl<R: Record> DiffResult<R> {
    pub fn is_empty(&self) -> bool {
        self.to_insert.is_empty() && self.to_update.is_empty() && self.to_delete.is_empty()
    }
}

/// Compute the three-way diff between `local` and `remote`.
pub fn reconcile<R: Record>(
    local: &RecordSet<R>,
    remote: &RecordSet<R>,
    equality: &EqualityRule<R>,
) -> DiffResult<R> {
    let mut to_insert = Vec::new();
    let mut to_update = Vec::new();
    let mut to_delete = Vec::new();
    let mut unchanged = Vec::new();

    for record in local {
        match remote.get(record.name()) {
            None => to_insert.push(record.clone()),
            Some(existing) if equality.equals(record, existing) => {
                unchanged.push(record.name().to_string());
            }
            Some(existing) => {
                let id = existing.remote_id().map(str::to_string);
                to_update.push(record.clone().with_remote_id(id));
            }
        }
    }

    for record in remote {
        if !local.contains(record.name()) {
            to_delete.push(record.clone());
        }
    }

    tracing::debug!(
        kind = %R::KIND,
        insert = to_insert.len(),
        update = to_update.len(),
        delete = to_delete.len(),
        unchanged = unchanged.len(),
        "Reconciled"
    );

    DiffResult {
        to_insert: into_set(to_insert),
        to_update: into_set(to_update),
        to_delete: into_set(to_delete),
        unchanged,
    }
}

// Inputs are already name-unique sets, so the partitions are too.
fn into_set<R: Record>(records: Vec<R>) -> RecordSet<R> {
    let mut set = RecordSet::new();
    for record in records {
        if let Err(e) = set.insert(record) {
            tracing::error!("Dropping record during reconcile: {}", e);
        }
    }
    set
}
