//! Applying a diff through the remote accessor

use serde::Serialize;

use polsync_meta::{Kind, Record, RecordSet};

use super::DiffResult;
use crate::remote::{RemoteAccessor, RemoteError};
use crate::{Error, Result};

/// Options for applying a diff
#[derive(Debug, Clone, Copy, Default)]
pub struct ApplyOptions {
    /// Issue `delete` calls for remote records missing locally.
    /// When false, those records are only reported as "would delete".
    pub delete_enabled: bool,
    /// Make no remote calls at all; report what would happen.
    pub dry_run: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Replace,
    Delete,
}

impl Operation {
    fn verb(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Replace => "update",
            Self::Delete => "delete",
        }
    }

    fn past_tense(&self) -> &'static str {
        match self {
            Self::Create => "Created",
            Self::Replace => "Updated",
            Self::Delete => "Deleted",
        }
    }
}

/// One record the remote refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordFailure {
    pub name: String,
    pub operation: Operation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub message: String,
}

/// Report from applying one kind's diff.
///
/// In a dry run the name lists hold what would have been done.
#[derive(Debug, Clone, Serialize)]
pub struct ApplyReport {
    pub kind: Kind,
    pub dry_run: bool,
    pub created: Vec<String>,
    pub updated: Vec<String>,
    pub deleted: Vec<String>,
    /// Remote-only records left alone because deletes are disabled.
    pub skipped_deletes: Vec<String>,
    pub unchanged: usize,
    /// Human-readable description of each step.
    pub actions: Vec<String>,
    pub failures: Vec<RecordFailure>,
}

impl ApplyReport {
    pub fn new(kind: Kind, dry_run: bool) -> Self {
        Self {
            kind,
            dry_run,
            created: Vec::new(),
            updated: Vec::new(),
            deleted: Vec::new(),
            skipped_deletes: Vec::new(),
            unchanged: 0,
            actions: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn success(&self) -> bool {
        self.failures.is_empty()
    }

    /// True when nothing was, or would be, changed.
    pub fn is_noop(&self) -> bool {
        self.created.is_empty() && self.updated.is_empty() && self.deleted.is_empty()
    }

    fn action(&mut self, operation: Operation, name: &str) {
        let label = self.kind.label();
        let action = if self.dry_run {
            format!("[dry-run] Would {} {} '{}'", operation.verb(), label, name)
        } else {
            format!("{} {} '{}'", operation.past_tense(), label, name)
        };
        self.actions.push(action);
    }

    fn skip_delete(&mut self, name: &str) {
        let prefix = if self.dry_run { "[dry-run] " } else { "" };
        self.actions.push(format!(
            "{}Would delete {} '{}' (deletes disabled)",
            prefix,
            self.kind.label(),
            name
        ));
        self.skipped_deletes.push(name.to_string());
    }

    fn fail(&mut self, name: &str, operation: Operation, error: &RemoteError) {
        tracing::warn!(
            kind = %self.kind,
            record = name,
            ?operation,
            "Remote call failed: {}",
            error
        );
        self.failures.push(RecordFailure {
            name: name.to_string(),
            operation,
            status: error.status(),
            message: error.to_string(),
        });
    }
}

/// Apply `diff` record by record.
///
/// Order is always deletes (when enabled), then inserts, then updates, so
/// a delete can free a name before anything else claims it. A failed call
/// is recorded and the rest of the diff still runs.
pub fn apply<R: Record, A: RemoteAccessor>(
    diff: &DiffResult<R>,
    accessor: &A,
    options: ApplyOptions,
) -> ApplyReport {
    let mut report = ApplyReport::new(R::KIND, options.dry_run);
    report.unchanged = diff.unchanged.len();

    if options.delete_enabled {
        for record in &diff.to_delete {
            let name = record.name();
            if !options.dry_run {
                if let Err(e) = accessor.delete(R::KIND, name) {
                    report.fail(name, Operation::Delete, &e);
                    continue;
                }
            }
            report.action(Operation::Delete, name);
            report.deleted.push(name.to_string());
        }
    } else {
        for record in &diff.to_delete {
            report.skip_delete(record.name());
        }
    }

    for record in &diff.to_insert {
        let name = record.name();
        if !options.dry_run {
            if let Err(e) = accessor.create(record) {
                report.fail(name, Operation::Create, &e);
                continue;
            }
        }
        report.action(Operation::Create, name);
        report.created.push(name.to_string());
    }

    for record in &diff.to_update {
        let name = record.name();
        if !options.dry_run {
            if let Err(e) = accessor.replace(record) {
                report.fail(name, Operation::Replace, &e);
                continue;
            }
        }
        report.action(Operation::Replace, name);
        report.updated.push(name.to_string());
    }

    tracing::info!(
        kind = %R::KIND,
        dry_run = options.dry_run,
        created = report.created.len(),
        updated = report.updated.len(),
        deleted = report.deleted.len(),
        failed = report.failures.len(),
        "Applied"
    );

    report
}

/// Apply through the remote's bulk endpoint.
///
/// The diff is still computed locally: it drives the dry-run report and
/// the "would delete" list when deletes are disabled. A real run sends the
/// complete local set in one request. Items the service rejects become
/// per-record failures; a failure of the request itself fails the kind.
pub fn apply_bulk<R: Record, A: RemoteAccessor>(
    diff: &DiffResult<R>,
    local: &[R],
    accessor: &A,
    options: ApplyOptions,
) -> Result<ApplyReport> {
    if options.dry_run {
        return Ok(apply(diff, accessor, options));
    }

    let outcome = accessor
        .bulk_reconcile(local, options.delete_enabled)
        .map_err(|source| Error::Remote {
            kind: R::KIND,
            source,
        })?;

    let mut report = ApplyReport::new(R::KIND, false);
    report.unchanged = diff.unchanged.len();
    let rejected = |name: &str| outcome.errors.iter().any(|e| e.name == name);

    let accepted = |set: &RecordSet<R>| -> Vec<String> {
        set.names()
            .filter(|n| !rejected(*n))
            .map(String::from)
            .collect()
    };

    report.created = accepted(&diff.to_insert);
    report.updated = accepted(&diff.to_update);
    if options.delete_enabled {
        report.deleted = accepted(&diff.to_delete);
    } else {
        for name in diff.to_delete.names() {
            report.skip_delete(name);
        }
    }

    report.actions.push(format!(
        "Bulk applied {}: {} created, {} updated, {} deleted",
        R::KIND,
        outcome.created,
        outcome.updated,
        outcome.deleted
    ));

    for item in &outcome.errors {
        let operation = if diff.to_insert.contains(&item.name) {
            Operation::Create
        } else if diff.to_delete.contains(&item.name) {
            Operation::Delete
        } else {
            Operation::Replace
        };
        tracing::warn!(
            kind = %R::KIND,
            record = %item.name,
            "Bulk item rejected: {}",
            item.message
        );
        report.failures.push(RecordFailure {
            name: item.name.clone(),
            operation,
            status: None,
            message: item.message.clone(),
        });
    }

    Ok(report)
}
