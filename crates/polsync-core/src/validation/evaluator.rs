//! The seam to the external policy-evaluation runtime

use serde::{Deserialize, Serialize};

use polsync_fs::NormalizedPath;
use polsync_meta::Fixture;

use crate::Result;

/// How the runtime classified one fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActualOutcome {
    /// Compliant: zero findings
    Success,
    /// At least one finding, or an explicit rejection
    Failure,
}

/// The runtime's answer for one fixture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseResult {
    /// Fixture case id, or the fixture's path.
    pub case: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<ActualOutcome>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub findings: Vec<String>,
}

impl CaseResult {
    /// The explicit outcome, else classified by whether findings were produced.
    pub fn actual(&self) -> ActualOutcome {
        match self.outcome {
            Some(outcome) => outcome,
            None if self.findings.is_empty() => ActualOutcome::Success,
            None => ActualOutcome::Failure,
        }
    }

    /// The result is keyed by the fixture's path.
    pub fn names_path(&self, fixture: &Fixture) -> bool {
        self.case == fixture.path.as_str()
    }

    /// The result is keyed by the fixture's case id.
    pub fn names_case(&self, fixture: &Fixture) -> bool {
        self.case == fixture.case_id
    }
}

/// Everything the runtime reported for one policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationOutput {
    /// The runtime's own overall validity flag.
    #[serde(default)]
    pub valid: bool,
    /// Per-fixture outcomes. Absent when the runtime only reports totals.
    #[serde(default)]
    pub results: Option<Vec<CaseResult>>,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

/// One policy and its fixtures, as handed to an evaluator.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationRequest<'a> {
    pub policy: &'a str,
    /// Definition file the source was read from.
    pub policy_path: &'a NormalizedPath,
    /// Policy source text: a policy's `body`, or a cluster policy document.
    pub policy_source: &'a str,
    pub fixtures: &'a [Fixture],
}

/// A policy-evaluation runtime.
///
/// `Err` means the runtime could not be invoked or gave no usable answer.
/// Problems in the policy itself belong in [`EvaluationOutput::errors`].
pub trait PolicyEvaluator {
    fn evaluate(&self, request: &EvaluationRequest<'_>) -> Result<EvaluationOutput>;
}
