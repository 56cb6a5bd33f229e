//! Validation outcome engine
//!
//! Each policy definition becomes a [`ValidationRun`], is evaluated by a
//! [`PolicyEvaluator`], and is judged into a [`ValidationVerdict`].

mod evaluator;
mod run;
mod subprocess;
mod verdict;

pub use evaluator::{
    ActualOutcome, CaseResult, EvaluationOutput, EvaluationRequest, PolicyEvaluator,
};
pub use run::{EvaluatedRun, ValidationRun};
pub use subprocess::SubprocessEvaluator;
pub use verdict::{FixtureMismatch, ValidationVerdict, VerdictBasis};

use serde::Serialize;

use polsync_fs::NormalizedPath;
use polsync_meta::{Kind, ScanOutput, Scanner};

use crate::Result;

/// Verdicts for every validated policy, plus scan-level warnings.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationSummary {
    pub verdicts: Vec<ValidationVerdict>,
    pub warnings: Vec<String>,
}

impl ValidationSummary {
    pub fn passed(&self) -> bool {
        self.verdicts.iter().all(|v| v.passed)
    }

    pub fn failed(&self) -> impl Iterator<Item = &ValidationVerdict> {
        self.verdicts.iter().filter(|v| !v.passed)
    }
}

/// Validate every definition in `scan`, or only `only` when given.
///
/// An evaluator that cannot be invoked fails that policy's verdict; the
/// remaining policies still run.
pub fn validate_scan(
    kind: Kind,
    scan: &ScanOutput,
    evaluator: &dyn PolicyEvaluator,
    only: Option<&str>,
) -> ValidationSummary {
    let mut summary = ValidationSummary::default();

    for orphan in scan.orphan_fixtures() {
        summary.warnings.push(format!(
            "Fixture {} refers to '{}', which has no definition",
            orphan.path, orphan.policy
        ));
    }
    for definition in scan.dotted_definitions() {
        summary.warnings.push(format!(
            "Policy '{}' contains a dot; fixtures named after it cannot be matched",
            definition.name
        ));
    }

    for definition in &scan.definitions {
        if only.is_some_and(|name| name != definition.name) {
            continue;
        }

        let run = ValidationRun::from_definition(kind, definition, scan.fixtures_for(&definition.name));
        let verdict = match run.evaluate(evaluator) {
            Ok(evaluated) => evaluated.judge(),
            Err(e) => {
                tracing::warn!(policy = %definition.name, "Evaluation failed: {}", e);
                ValidationVerdict::invocation_failed(definition.name.clone(), e.to_string())
            }
        };
        summary.verdicts.push(verdict);
    }

    summary
}

/// Scan `dir` and validate what it holds. A scan failure is returned as-is.
pub fn validate_dir(
    kind: Kind,
    dir: &NormalizedPath,
    evaluator: &dyn PolicyEvaluator,
    only: Option<&str>,
) -> Result<ValidationSummary> {
    let scan = Scanner::new(dir.clone()).scan()?;
    Ok(validate_scan(kind, &scan, evaluator, only))
}
