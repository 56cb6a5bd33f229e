//! One policy's validation, from unevaluated to judged
//!
//! ```text
//! ValidationRun ──evaluate()──▶ EvaluatedRun ──judge()──▶ ValidationVerdict
//! ```
//!
//! Each state is a separate type, so a run cannot be judged before it was
//! evaluated or evaluated twice.

use polsync_fs::NormalizedPath;
use polsync_meta::{Definition, ExpectedOutcome, Fixture, Kind};

use super::evaluator::{
    ActualOutcome, CaseResult, EvaluationOutput, EvaluationRequest, PolicyEvaluator,
};
use super::verdict::{FixtureMismatch, ValidationVerdict, VerdictBasis};
use crate::Result;

/// A policy and its fixtures, not yet submitted to a runtime.
#[derive(Debug, Clone)]
pub struct ValidationRun {
    policy: String,
    policy_path: NormalizedPath,
    source: String,
    fixtures: Vec<Fixture>,
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ValidationRun {
    pub fn new(
        policy: impl Into<String>,
        policy_path: NormalizedPath,
        source: impl Into<String>,
        fixtures: Vec<Fixture>,
    ) -> Self {
        let mut run = Self {
            policy: policy.into(),
            policy_path,
            source: source.into(),
            fixtures,
            errors: Vec::new(),
            warnings: Vec::new(),
        };
        for (index, fixture) in run.fixtures.iter().enumerate() {
            if fixture.expected == ExpectedOutcome::Unknown {
                run.warnings.push(format!(
                    "Fixture {} has no expected outcome and is not checked",
                    fixture.path
                ));
            }
            if let Some(first) = run.fixtures[..index]
                .iter()
                .find(|f| f.case_id == fixture.case_id)
            {
                run.warnings.push(format!(
                    "Fixtures {} and {} share case id '{}'; results keyed by case id are paired in fixture order",
                    first.path, fixture.path, fixture.case_id
                ));
            }
        }
        run
    }

    /// Build a run from a scanned definition, with structural checks.
    ///
    /// A policy submits its `body`; a cluster policy submits the whole
    /// document. An empty source is recorded as a structural error.
    pub fn from_definition(kind: Kind, definition: &Definition, fixtures: &[Fixture]) -> Self {
        let document = &definition.document;
        let source = match kind {
            Kind::Policies => document.str_at("body").unwrap_or_default().to_string(),
            _ => document.raw.clone(),
        };
        let empty = match kind {
            Kind::Policies => source.trim().is_empty(),
            _ => document.value.get("spec").is_none(),
        };

        let mut run = Self::new(
            definition.name.clone(),
            document.path.clone(),
            source,
            fixtures.to_vec(),
        );
        if empty {
            run.record_error(format!(
                "{} '{}' has an empty body",
                kind.label(),
                definition.name
            ));
        }
        run
    }

    pub fn policy(&self) -> &str {
        &self.policy
    }

    pub fn fixtures(&self) -> &[Fixture] {
        &self.fixtures
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Record a structural problem found before evaluation.
    pub fn record_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// Submit the policy and fixtures to `evaluator`.
    ///
    /// When structural errors were already recorded the runtime is not
    /// called; the run proceeds with no results and an invalid flag.
    pub fn evaluate(self, evaluator: &dyn PolicyEvaluator) -> Result<EvaluatedRun> {
        if !self.errors.is_empty() {
            tracing::debug!(
                policy = %self.policy,
                errors = self.errors.len(),
                "Skipping evaluation: structural errors"
            );
            return Ok(EvaluatedRun {
                run: self,
                output: EvaluationOutput::default(),
            });
        }

        let request = EvaluationRequest {
            policy: &self.policy,
            policy_path: &self.policy_path,
            policy_source: &self.source,
            fixtures: &self.fixtures,
        };
        let output = evaluator.evaluate(&request)?;
        tracing::debug!(
            policy = %self.policy,
            valid = output.valid,
            results = output.results.as_ref().map(Vec::len),
            "Evaluated"
        );
        Ok(EvaluatedRun { run: self, output })
    }
}

/// A run with the runtime's answer attached.
#[derive(Debug, Clone)]
pub struct EvaluatedRun {
    run: ValidationRun,
    output: EvaluationOutput,
}

impl EvaluatedRun {
    /// Pair a run with an output obtained elsewhere.
    pub fn from_parts(run: ValidationRun, output: EvaluationOutput) -> Self {
        Self { run, output }
    }

    pub fn output(&self) -> &EvaluationOutput {
        &self.output
    }

    /// Decide the verdict. First matching rule wins:
    ///
    /// 1. Per-case results returned and at least one labeled fixture:
    ///    pass iff every labeled fixture's result matches its label.
    /// 2. Counts of fixtures expecting success (S) and failure (F)
    ///    against errors (E): `S>0, E=0` pass; `F>0, E>0` pass;
    ///    `S>0, E>0` fail; `F>0, E=0` fail.
    /// 3. The runtime's validity flag.
    pub fn judge(self) -> ValidationVerdict {
        let Self { run, output } = self;

        let mut errors = run.errors;
        errors.extend(output.errors);
        let mut warnings = run.warnings;
        warnings.extend(output.warnings);

        let labeled: Vec<&Fixture> = run
            .fixtures
            .iter()
            .filter(|f| f.expected != ExpectedOutcome::Unknown)
            .collect();
        let expecting = |outcome| labeled.iter().filter(|f| f.expected == outcome).count();
        let successes = expecting(ExpectedOutcome::Success);
        let failures = expecting(ExpectedOutcome::Failure);
        let error_count = errors.len();

        let (passed, basis, mismatches) = match &output.results {
            Some(results) if !labeled.is_empty() => {
                let bound = bind_results(&run.fixtures, results);
                let mismatches: Vec<FixtureMismatch> = run
                    .fixtures
                    .iter()
                    .zip(bound)
                    .filter(|(fixture, _)| fixture.expected != ExpectedOutcome::Unknown)
                    .filter_map(|(fixture, result)| {
                        let actual = result.map(CaseResult::actual);
                        let agrees = match (fixture.expected, actual) {
                            (ExpectedOutcome::Success, Some(ActualOutcome::Success)) => true,
                            (ExpectedOutcome::Failure, Some(ActualOutcome::Failure)) => true,
                            _ => false,
                        };
                        (!agrees).then(|| FixtureMismatch {
                            case_id: fixture.case_id.clone(),
                            path: fixture.path.clone(),
                            expected: fixture.expected,
                            actual,
                        })
                    })
                    .collect();
                (mismatches.is_empty(), VerdictBasis::PerFixture, mismatches)
            }
            _ if successes > 0 && error_count == 0 => (true, VerdictBasis::Counts, Vec::new()),
            _ if failures > 0 && error_count > 0 => (true, VerdictBasis::Counts, Vec::new()),
            _ if successes > 0 && error_count > 0 => (false, VerdictBasis::Counts, Vec::new()),
            _ if failures > 0 && error_count == 0 => (false, VerdictBasis::Counts, Vec::new()),
            _ => (output.valid, VerdictBasis::RuntimeFlag, Vec::new()),
        };

        tracing::info!(policy = %run.policy, passed, ?basis, "Judged");

        ValidationVerdict {
            policy: run.policy,
            passed,
            basis,
            errors,
            warnings,
            mismatches,
        }
    }
}

/// Pair each fixture with at most one result, and each result with at most
/// one fixture. Results keyed by path bind first; the remaining fixtures
/// then take the next unbound result carrying their case id, in order.
fn bind_results<'r>(fixtures: &[Fixture], results: &'r [CaseResult]) -> Vec<Option<&'r CaseResult>> {
    let mut taken = vec![false; results.len()];
    let mut bound: Vec<Option<&'r CaseResult>> = vec![None; fixtures.len()];
    let passes: [fn(&CaseResult, &Fixture) -> bool; 2] =
        [CaseResult::names_path, CaseResult::names_case];

    for names in passes {
        for (slot, fixture) in bound.iter_mut().zip(fixtures) {
            if slot.is_some() {
                continue;
            }
            let free = (0..results.len()).find(|&i| !taken[i] && names(&results[i], fixture));
            if let Some(index) = free {
                taken[index] = true;
                *slot = Some(&results[index]);
            }
        }
    }
    bound
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(case_id: &str, expected: ExpectedOutcome) -> Fixture {
        Fixture {
            policy: "require-labels".into(),
            case_id: case_id.into(),
            expected,
            path: NormalizedPath::new(format!("policies/require-labels.{}.yaml", case_id)),
            content: "{}".into(),
        }
    }

    fn run(fixtures: Vec<Fixture>) -> ValidationRun {
        ValidationRun::new(
            "require-labels",
            NormalizedPath::new("policies/require-labels.yaml"),
            "deny {}",
            fixtures,
        )
    }

    fn output(valid: bool, errors: usize, results: Option<Vec<CaseResult>>) -> EvaluationOutput {
        EvaluationOutput {
            valid,
            results,
            errors: (0..errors).map(|i| format!("error {}", i)).collect(),
            warnings: Vec::new(),
        }
    }

    #[test]
    fn test_errors_are_kept_on_passing_verdict() {
        let evaluated = EvaluatedRun::from_parts(
            run(vec![fixture("bad", ExpectedOutcome::Failure)]),
            output(false, 1, None),
        );
        let verdict = evaluated.judge();
        assert!(verdict.passed);
        assert_eq!(verdict.errors, vec!["error 0".to_string()]);
    }

    #[test]
    fn test_missing_case_result_is_a_mismatch() {
        let evaluated = EvaluatedRun::from_parts(
            run(vec![
                fixture("a", ExpectedOutcome::Success),
                fixture("b", ExpectedOutcome::Success),
            ]),
            output(
                true,
                0,
                Some(vec![CaseResult {
                    case: "a".into(),
                    outcome: Some(ActualOutcome::Success),
                    findings: vec![],
                }]),
            ),
        );
        let verdict = evaluated.judge();
        assert!(!verdict.passed);
        assert_eq!(verdict.basis, VerdictBasis::PerFixture);
        assert_eq!(verdict.mismatches.len(), 1);
        assert_eq!(verdict.mismatches[0].case_id, "b");
        assert_eq!(verdict.mismatches[0].actual, None);
    }

    #[test]
    fn test_path_results_are_bound_before_case_results() {
        let mut first = fixture("dup", ExpectedOutcome::Failure);
        first.path = NormalizedPath::new("policies/require-labels.dup.failure.yaml");
        let mut second = fixture("dup", ExpectedOutcome::Success);
        second.path = NormalizedPath::new("policies/require-labels.dup.success.yaml");
        let results = vec![
            CaseResult {
                case: "dup".into(),
                outcome: Some(ActualOutcome::Failure),
                findings: vec![],
            },
            CaseResult {
                case: "policies/require-labels.dup.failure.yaml".into(),
                outcome: Some(ActualOutcome::Failure),
                findings: vec![],
            },
        ];

        let bound = bind_results(&[first, second], &results);
        assert_eq!(bound[0], Some(&results[1]));
        assert_eq!(bound[1], Some(&results[0]));
    }

    #[test]
    fn test_unknown_fixtures_warn() {
        let run = run(vec![fixture("smoke", ExpectedOutcome::Unknown)]);
        let verdict = EvaluatedRun::from_parts(run, output(true, 0, None)).judge();
        assert_eq!(verdict.basis, VerdictBasis::RuntimeFlag);
        assert!(verdict.passed);
        assert_eq!(verdict.warnings.len(), 1);
    }
}
