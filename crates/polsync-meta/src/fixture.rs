//! Policy test fixtures and their filename convention
//!
//! A fixture file is named `<policy>.<case-id>.<success|failure>.yaml`, or
//! carries a `testcase` segment when its outcome is not labeled:
//!
//! ```text
//! require-labels.yaml                   definition
//! require-labels.case1.success.yaml     fixture, case "case1", expects success
//! require-labels.no-owner.failure.yaml  fixture, case "no-owner", expects failure
//! require-labels.testcase.smoke.yaml    fixture, case "smoke", unknown outcome
//! ```

use serde::{Deserialize, Serialize};

use polsync_fs::NormalizedPath;

/// Segment marking a fixture without a labeled outcome.
pub const TESTCASE_MARKER: &str = "testcase";
/// Segment marking a fixture the policy should accept.
pub const SUCCESS_MARKER: &str = "success";
/// Segment marking a fixture the policy should reject.
pub const FAILURE_MARKER: &str = "failure";

/// Case id used when the filename has no segment between name and marker.
pub const DEFAULT_CASE_ID: &str = "default";

/// What a fixture's author expects the policy to do with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpectedOutcome {
    Success,
    Failure,
    Unknown,
}

/// A labeled test input tied to a policy by filename.
#[derive(Debug, Clone, Serialize)]
pub struct Fixture {
    pub policy: String,
    pub case_id: String,
    pub expected: ExpectedOutcome,
    pub path: NormalizedPath,
    /// Raw input document, submitted to the evaluation runtime as-is.
    #[serde(skip)]
    pub content: String,
}

/// The parts of a fixture filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureName {
    pub policy: String,
    pub case_id: String,
    pub expected: ExpectedOutcome,
}

fn is_marker(segment: &str) -> bool {
    matches!(segment, TESTCASE_MARKER | SUCCESS_MARKER | FAILURE_MARKER)
}

impl FixtureName {
    /// Classify a file stem (filename without its final extension).
    ///
    /// Returns `None` for definition files: stems with no marker segment
    /// after the first.
    pub fn parse(stem: &str) -> Option<Self> {
        let mut segments = stem.split('.');
        let policy = segments.next().filter(|s| !s.is_empty())?;
        let rest: Vec<&str> = segments.collect();

        if !rest.iter().any(|s| is_marker(s)) {
            return None;
        }

        let expected = rest
            .iter()
            .find_map(|s| match *s {
                SUCCESS_MARKER => Some(ExpectedOutcome::Success),
                FAILURE_MARKER => Some(ExpectedOutcome::Failure),
                _ => None,
            })
            .unwrap_or(ExpectedOutcome::Unknown);

        let case_parts: Vec<&str> = rest
            .iter()
            .copied()
            .filter(|s| !is_marker(s) && !s.is_empty())
            .collect();
        let case_id = if case_parts.is_empty() {
            DEFAULT_CASE_ID.to_string()
        } else {
            case_parts.join(".")
        };

        Some(Self {
            policy: policy.to_string(),
            case_id,
            expected,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("require-labels.case1.success", "require-labels", "case1", ExpectedOutcome::Success)]
    #[case("require-labels.no-owner.failure", "require-labels", "no-owner", ExpectedOutcome::Failure)]
    #[case("require-labels.testcase.smoke", "require-labels", "smoke", ExpectedOutcome::Unknown)]
    #[case("require-labels.success", "require-labels", "default", ExpectedOutcome::Success)]
    #[case("p.v1.2.failure", "p", "v1.2", ExpectedOutcome::Failure)]
    #[case("p.testcase.a.success", "p", "a", ExpectedOutcome::Success)]
    fn test_parse_fixture_names(
        #[case] stem: &str,
        #[case] policy: &str,
        #[case] case_id: &str,
        #[case] expected: ExpectedOutcome,
    ) {
        let name = FixtureName::parse(stem).unwrap();
        assert_eq!(name.policy, policy);
        assert_eq!(name.case_id, case_id);
        assert_eq!(name.expected, expected);
    }

    #[rstest]
    #[case("require-labels")]
    #[case("require-labels.v2")]
    #[case("success")]
    #[case(".success")]
    fn test_definitions_are_not_fixtures(#[case] stem: &str) {
        assert_eq!(FixtureName::parse(stem), None);
    }
}
