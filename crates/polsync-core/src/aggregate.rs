//! Multi-kind aggregation
//!
//! Runs one reconcile-and-apply closure per kind, strictly in order, and
//! rolls the per-kind outcomes up into a single process outcome.

use serde::Serialize;

use polsync_meta::Kind;

use crate::Result;
use crate::reconcile::ApplyReport;

/// One kind's unit of work.
pub struct KindTask<'a> {
    pub kind: Kind,
    /// Whether the kind's local directory exists. An absent directory
    /// means "nothing to push" and the closure is never called.
    pub local_dir_exists: bool,
    pub run: Box<dyn FnOnce() -> Result<ApplyReport> + 'a>,
}

impl<'a> KindTask<'a> {
    pub fn new(
        kind: Kind,
        local_dir_exists: bool,
        run: impl FnOnce() -> Result<ApplyReport> + 'a,
    ) -> Self {
        Self {
            kind,
            local_dir_exists,
            run: Box::new(run),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KindStatus {
    Success,
    Warning,
    Failure,
}

#[derive(Debug, Clone, Serialize)]
pub struct KindResult {
    pub kind: Kind,
    pub status: KindStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<ApplyReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Process-level outcome, worst first when compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProcessOutcome {
    Success,
    /// Some kinds had nothing to push; nothing failed.
    Warnings,
    /// At least one kind failed, but not all of them.
    PartialFailure,
    TotalFailure,
}

impl ProcessOutcome {
    /// Exit code for this outcome. Warnings only fail the process when
    /// `warnings_fatal` is set.
    pub fn exit_code(&self, warnings_fatal: bool) -> i32 {
        match self {
            Self::Success => 0,
            Self::Warnings if warnings_fatal => 1,
            Self::Warnings => 0,
            Self::PartialFailure => 1,
            Self::TotalFailure => 2,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AggregateReport {
    pub outcome: ProcessOutcome,
    pub results: Vec<KindResult>,
}

impl AggregateReport {
    pub fn failures(&self) -> usize {
        self.count(KindStatus::Failure)
    }

    pub fn warnings(&self) -> usize {
        self.count(KindStatus::Warning)
    }

    fn count(&self, status: KindStatus) -> usize {
        self.results.iter().filter(|r| r.status == status).count()
    }
}

/// Run every task in order and reduce the results.
///
/// A kind fails when its closure errors or when any record in its report
/// failed to apply. Later kinds still run after a failure.
pub fn run_kinds(tasks: Vec<KindTask<'_>>) -> AggregateReport {
    let mut results = Vec::with_capacity(tasks.len());

    for task in tasks {
        let kind = task.kind;
        if !task.local_dir_exists {
            tracing::warn!(kind = %kind, "No local directory; nothing to push");
            results.push(KindResult {
                kind,
                status: KindStatus::Warning,
                report: None,
                message: Some(format!("No local {} directory found", kind)),
            });
            continue;
        }

        let result = match (task.run)() {
            Ok(report) if report.success() => KindResult {
                kind,
                status: KindStatus::Success,
                report: Some(report),
                message: None,
            },
            Ok(report) => {
                let message = format!("{} record(s) failed to apply", report.failures.len());
                KindResult {
                    kind,
                    status: KindStatus::Failure,
                    report: Some(report),
                    message: Some(message),
                }
            }
            Err(e) => {
                tracing::error!(kind = %kind, "Sync failed: {}", e);
                KindResult {
                    kind,
                    status: KindStatus::Failure,
                    report: None,
                    message: Some(e.to_string()),
                }
            }
        };
        results.push(result);
    }

    let outcome = reduce(&results);
    AggregateReport { outcome, results }
}

fn reduce(results: &[KindResult]) -> ProcessOutcome {
    let total = results.len();
    let failures = results
        .iter()
        .filter(|r| r.status == KindStatus::Failure)
        .count();
    let warnings = results
        .iter()
        .filter(|r| r.status == KindStatus::Warning)
        .count();

    if failures > 0 && failures == total {
        ProcessOutcome::TotalFailure
    } else if failures > 0 {
        ProcessOutcome::PartialFailure
    } else if warnings > 0 {
        ProcessOutcome::Warnings
    } else {
        ProcessOutcome::Success
    }
}
