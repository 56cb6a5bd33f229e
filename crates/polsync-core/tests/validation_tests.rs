//! Validation precedence and evaluator tests

use polsync_core::validation::{
    ActualOutcome, CaseResult, EvaluatedRun, EvaluationOutput, SubprocessEvaluator,
    ValidationRun, VerdictBasis, validate_dir,
};
use polsync_fs::NormalizedPath;
use polsync_meta::{ExpectedOutcome, Fixture, Kind};
use polsync_test_utils::{PolicyTree, StaticEvaluator};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn fixtures(successes: usize, failures: usize) -> Vec<Fixture> {
    let make = |case_id: String, expected| Fixture {
        policy: "require-labels".into(),
        path: NormalizedPath::new(format!("policies/require-labels.{}.yaml", case_id)),
        case_id,
        expected,
        content: "{}".into(),
    };
    (0..successes)
        .map(|i| make(format!("s{}", i), ExpectedOutcome::Success))
        .chain((0..failures).map(|i| make(format!("f{}", i), ExpectedOutcome::Failure)))
        .collect()
}

fn results(cases: &[(&str, ActualOutcome)]) -> Option<Vec<CaseResult>> {
    Some(
        cases
            .iter()
            .map(|(case, outcome)| CaseResult {
                case: case.to_string(),
                outcome: Some(*outcome),
                findings: Vec::new(),
            })
            .collect(),
    )
}

#[rstest]
// Two should-allow fixtures, no errors: the policy allowed them.
#[case(2, 0, 0, false, None, true, VerdictBasis::Counts)]
// Same policy with one structural error.
#[case(2, 0, 1, true, None, false, VerdictBasis::Counts)]
// One should-reject fixture and one error: the error is the rejection.
#[case(0, 1, 1, false, None, true, VerdictBasis::Counts)]
#[case(0, 1, 0, true, None, false, VerdictBasis::Counts)]
#[case(1, 1, 1, false, None, true, VerdictBasis::Counts)]
#[case(0, 0, 0, true, None, true, VerdictBasis::RuntimeFlag)]
#[case(0, 0, 2, false, None, false, VerdictBasis::RuntimeFlag)]
// Per-case results take precedence over counts.
#[case(0, 1, 0, false, results(&[("f0", ActualOutcome::Failure)]), true, VerdictBasis::PerFixture)]
#[case(1, 0, 0, true, results(&[("s0", ActualOutcome::Failure)]), false, VerdictBasis::PerFixture)]
#[case(1, 1, 1, true, results(&[("s0", ActualOutcome::Success), ("f0", ActualOutcome::Failure)]), true, VerdictBasis::PerFixture)]
// Results without labeled fixtures fall through to the flag.
#[case(0, 0, 0, false, results(&[("x", ActualOutcome::Success)]), false, VerdictBasis::RuntimeFlag)]
fn test_precedence(
    #[case] successes: usize,
    #[case] failures: usize,
    #[case] errors: usize,
    #[case] valid: bool,
    #[case] case_results: Option<Vec<CaseResult>>,
    #[case] passed: bool,
    #[case] basis: VerdictBasis,
) {
    let run = ValidationRun::new(
        "require-labels",
        NormalizedPath::new("policies/require-labels.yaml"),
        "deny {}",
        fixtures(successes, failures),
    );
    let output = EvaluationOutput {
        valid,
        results: case_results,
        errors: (0..errors).map(|i| format!("compile error {}", i)).collect(),
        warnings: Vec::new(),
    };

    let verdict = EvaluatedRun::from_parts(run, output).judge();

    assert_eq!(verdict.passed, passed);
    assert_eq!(verdict.basis, basis);
    assert_eq!(verdict.errors.len(), errors);
}

#[test]
fn test_result_matches_fixture_by_path() {
    let fixture = &fixtures(1, 0)[0];
    let result = CaseResult {
        case: fixture.path.as_str().to_string(),
        outcome: None,
        findings: Vec::new(),
    };
    assert!(result.names_path(fixture));
    assert!(!result.names_case(fixture));
}

fn case_result(case: &str, outcome: ActualOutcome) -> CaseResult {
    CaseResult {
        case: case.to_string(),
        outcome: Some(outcome),
        findings: Vec::new(),
    }
}

fn judged_with(tree: &PolicyTree, results: Vec<CaseResult>) -> polsync_core::ValidationVerdict {
    let evaluator = StaticEvaluator::new().with_output(
        "p",
        EvaluationOutput {
            valid: true,
            results: Some(results),
            ..EvaluationOutput::default()
        },
    );
    let summary =
        validate_dir(Kind::Policies, &tree.kind_dir(Kind::Policies), &evaluator, None).unwrap();
    summary.verdicts.into_iter().next().unwrap()
}

fn tree_with_shared_case_id() -> PolicyTree {
    let tree = PolicyTree::new();
    tree.definition(Kind::Policies, "p", "body: deny {}\n")
        .write("policies/p.success.yaml", "labels: {owner: alice}\n")
        .write("policies/p.failure.yaml", "labels: {}\n");
    tree
}

#[test]
fn test_fixtures_sharing_a_case_id_pair_with_results_in_order() {
    let tree = tree_with_shared_case_id();

    // Fixtures are submitted in path order: p.failure.yaml, then p.success.yaml.
    let verdict = judged_with(
        &tree,
        vec![
            case_result("default", ActualOutcome::Failure),
            case_result("default", ActualOutcome::Success),
        ],
    );

    assert_eq!(verdict.basis, VerdictBasis::PerFixture);
    assert!(verdict.passed, "{:?}", verdict.mismatches);
    assert!(
        verdict.warnings.iter().any(|w| w.contains("share case id 'default'")),
        "{:?}",
        verdict.warnings
    );
}

#[test]
fn test_path_keyed_results_bind_regardless_of_order() {
    let tree = tree_with_shared_case_id();
    let dir = tree.kind_dir(Kind::Policies);

    let verdict = judged_with(
        &tree,
        vec![
            case_result(dir.join("p.success.yaml").as_str(), ActualOutcome::Success),
            case_result(dir.join("p.failure.yaml").as_str(), ActualOutcome::Failure),
        ],
    );

    assert!(verdict.passed, "{:?}", verdict.mismatches);
}

#[test]
fn test_one_result_cannot_satisfy_two_fixtures() {
    let tree = tree_with_shared_case_id();

    let verdict = judged_with(&tree, vec![case_result("default", ActualOutcome::Failure)]);

    assert!(!verdict.passed);
    assert_eq!(verdict.mismatches.len(), 1);
    assert!(verdict.mismatches[0].path.as_str().ends_with("p.success.yaml"));
    assert_eq!(verdict.mismatches[0].actual, None);
}

#[test]
fn test_runtime_receives_policy_source() {
    let tree = PolicyTree::new();
    tree.definition(Kind::Policies, "require-labels", "body: deny {}\n");
    tree.write(
        "cluster-policies/disallow-latest.yaml",
        "metadata:\n  name: disallow-latest\nspec:\n  rules: []\n",
    );
    let evaluator = StaticEvaluator::new();

    validate_dir(Kind::Policies, &tree.kind_dir(Kind::Policies), &evaluator, None).unwrap();
    validate_dir(
        Kind::ClusterPolicies,
        &tree.kind_dir(Kind::ClusterPolicies),
        &evaluator,
        None,
    )
    .unwrap();

    assert_eq!(
        evaluator.sources(),
        vec![
            ("require-labels".to_string(), "deny {}".to_string()),
            (
                "disallow-latest".to_string(),
                "metadata:\n  name: disallow-latest\nspec:\n  rules: []\n".to_string()
            ),
        ]
    );
}

#[test]
fn test_empty_body_skips_runtime() {
    let tree = PolicyTree::new();
    tree.definition(Kind::Policies, "require-labels", "body: ''\n")
        .fixture(
            Kind::Policies,
            "require-labels",
            "case1",
            ExpectedOutcome::Success,
            "{}\n",
        );
    let evaluator = StaticEvaluator::new();

    let summary = validate_dir(Kind::Policies, &tree.kind_dir(Kind::Policies), &evaluator, None)
        .unwrap();

    assert!(evaluator.calls().is_empty());
    let verdict = &summary.verdicts[0];
    assert!(!verdict.passed);
    assert_eq!(verdict.basis, VerdictBasis::Counts);
    assert!(verdict.errors[0].contains("empty body"), "{:?}", verdict.errors);
}

#[test]
fn test_invocation_failure_fails_only_that_policy() {
    let tree = PolicyTree::new();
    tree.definition(Kind::Policies, "a", "body: deny {}\n")
        .definition(Kind::Policies, "b", "body: deny {}\n");
    let evaluator = StaticEvaluator::new().with_failure("a", "runtime not found");

    let summary = validate_dir(Kind::Policies, &tree.kind_dir(Kind::Policies), &evaluator, None)
        .unwrap();

    assert_eq!(summary.verdicts.len(), 2);
    assert_eq!(summary.verdicts[0].basis, VerdictBasis::InvocationFailed);
    assert!(!summary.verdicts[0].passed);
    assert!(summary.verdicts[1].passed);
    assert!(!summary.passed());
    assert_eq!(evaluator.calls(), vec!["a", "b"]);
}

#[test]
fn test_only_filter_and_orphans() {
    let tree = PolicyTree::new();
    tree.definition(Kind::Policies, "a", "body: deny {}\n")
        .definition(Kind::Policies, "b", "body: deny {}\n")
        .fixture(Kind::Policies, "ghost", "c1", ExpectedOutcome::Success, "{}\n");
    let evaluator = StaticEvaluator::new();

    let summary = validate_dir(
        Kind::Policies,
        &tree.kind_dir(Kind::Policies),
        &evaluator,
        Some("b"),
    )
    .unwrap();

    assert_eq!(evaluator.calls(), vec!["b"]);
    assert_eq!(summary.verdicts.len(), 1);
    assert_eq!(summary.warnings.len(), 1);
    assert!(summary.warnings[0].contains("ghost"));
}

#[test]
fn test_dotted_policy_name_is_warned() {
    let tree = PolicyTree::new();
    tree.definition(Kind::Policies, "labels.v2", "body: deny {}\n")
        .definition(Kind::Policies, "plain", "body: deny {}\n");

    let summary = validate_dir(
        Kind::Policies,
        &tree.kind_dir(Kind::Policies),
        &StaticEvaluator::new(),
        None,
    )
    .unwrap();

    assert_eq!(summary.verdicts.len(), 2);
    assert_eq!(
        summary.warnings,
        vec!["Policy 'labels.v2' contains a dot; fixtures named after it cannot be matched"]
    );
}

#[test]
fn test_scan_failure_is_returned() {
    let tree = PolicyTree::new();
    tree.write("policies/anonymous.yaml", "body: deny {}\n");

    let result = validate_dir(
        Kind::Policies,
        &tree.kind_dir(Kind::Policies),
        &StaticEvaluator::new(),
        None,
    );
    assert!(result.is_err());
}

#[cfg(unix)]
mod subprocess {
    use super::*;
    use pretty_assertions::assert_eq;

    fn evaluator(tree: &PolicyTree, script: &str) -> SubprocessEvaluator {
        tree.write("eval.sh", script);
        let script_path = tree.root().join("eval.sh").to_string_lossy().to_string();
        SubprocessEvaluator::new(&["sh".to_string(), script_path]).unwrap()
    }

    fn tree_with_policy() -> PolicyTree {
        let tree = PolicyTree::new();
        tree.definition(Kind::Policies, "require-labels", "body: deny {}\n")
            .fixture(
                Kind::Policies,
                "require-labels",
                "case1",
                ExpectedOutcome::Success,
                "{}\n",
            )
            .fixture(
                Kind::Policies,
                "require-labels",
                "no-owner",
                ExpectedOutcome::Failure,
                "{}\n",
            );
        tree
    }

    #[test]
    fn test_reads_json_report_from_stdout() {
        let tree = tree_with_policy();
        let evaluator = evaluator(
            &tree,
            r#"case "$*" in
  *--policy*polsync-require-labels-*--input*--input*)
    echo '{"valid": false, "results": [{"case": "case1", "outcome": "success"}, {"case": "no-owner", "findings": ["owner label missing"]}]}'
    exit 1 ;;
  *) echo "unexpected args: $*" >&2; exit 3 ;;
esac
"#,
        );

        let summary = validate_dir(
            Kind::Policies,
            &tree.kind_dir(Kind::Policies),
            &evaluator,
            None,
        )
        .unwrap();

        let verdict = &summary.verdicts[0];
        assert_eq!(verdict.basis, VerdictBasis::PerFixture);
        assert!(verdict.passed, "{:?}", verdict);
    }

    #[test]
    fn test_policy_argument_holds_the_body() {
        let tree = tree_with_policy();
        let evaluator = evaluator(
            &tree,
            r#"[ "$1" = "--policy" ] || exit 3
if [ "$(cat "$2")" = "deny {}" ]; then
  echo '{"valid": true, "results": [{"case": "case1"}, {"case": "no-owner", "outcome": "failure"}]}'
else
  echo "unexpected policy source: $(cat "$2")" >&2
  exit 4
fi
"#,
        );

        let summary = validate_dir(
            Kind::Policies,
            &tree.kind_dir(Kind::Policies),
            &evaluator,
            None,
        )
        .unwrap();

        let verdict = &summary.verdicts[0];
        assert_eq!(verdict.basis, VerdictBasis::PerFixture, "{:?}", verdict.errors);
        assert!(verdict.passed);
    }

    #[test]
    fn test_non_zero_exit_without_json_is_invocation_failure() {
        let tree = tree_with_policy();
        let evaluator = evaluator(&tree, "echo 'cannot compile runtime' >&2\nexit 2\n");

        let summary = validate_dir(
            Kind::Policies,
            &tree.kind_dir(Kind::Policies),
            &evaluator,
            None,
        )
        .unwrap();

        let verdict = &summary.verdicts[0];
        assert_eq!(verdict.basis, VerdictBasis::InvocationFailed);
        assert!(verdict.errors[0].contains("exited with code 2"), "{:?}", verdict.errors);
        assert!(verdict.errors[0].contains("cannot compile runtime"));
    }

    #[test]
    fn test_missing_program_is_invocation_failure() {
        let tree = tree_with_policy();
        let evaluator =
            SubprocessEvaluator::new(&["polsync-no-such-evaluator".to_string()]).unwrap();

        let summary = validate_dir(
            Kind::Policies,
            &tree.kind_dir(Kind::Policies),
            &evaluator,
            None,
        )
        .unwrap();

        assert_eq!(summary.verdicts[0].basis, VerdictBasis::InvocationFailed);
    }
}
