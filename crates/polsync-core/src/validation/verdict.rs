//! Judged validation results

use serde::Serialize;

use polsync_fs::NormalizedPath;
use polsync_meta::ExpectedOutcome;

use super::evaluator::ActualOutcome;

/// Which rule decided a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum VerdictBasis {
    /// Every labeled fixture compared against its own runtime result
    PerFixture,
    /// Fixture expectation counts against the structural error count
    Counts,
    /// The runtime's overall validity flag
    RuntimeFlag,
    /// The runtime could not be invoked
    InvocationFailed,
}

/// A labeled fixture whose result disagreed with its label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixtureMismatch {
    pub case_id: String,
    pub path: NormalizedPath,
    pub expected: ExpectedOutcome,
    /// `None` when the runtime returned nothing for this fixture.
    pub actual: Option<ActualOutcome>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationVerdict {
    pub policy: String,
    pub passed: bool,
    pub basis: VerdictBasis,
    /// Always populated, including on a passing verdict.
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mismatches: Vec<FixtureMismatch>,
}

impl ValidationVerdict {
    pub fn invocation_failed(policy: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            policy: policy.into(),
            passed: false,
            basis: VerdictBasis::InvocationFailed,
            errors: vec![message.into()],
            warnings: Vec::new(),
            mismatches: Vec::new(),
        }
    }
}
