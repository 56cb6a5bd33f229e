//! [`StaticEvaluator`]: canned policy-evaluation answers.

use std::cell::RefCell;
use std::collections::HashMap;

use polsync_core::validation::{EvaluationOutput, EvaluationRequest, PolicyEvaluator};
use polsync_core::{Error, Result};

/// Answers each policy with a preconfigured output, or `valid: true` with
/// nothing else when unconfigured. Records which policies were evaluated
/// and the source text each was submitted with.
#[derive(Default)]
pub struct StaticEvaluator {
    outputs: HashMap<String, EvaluationOutput>,
    failures: HashMap<String, String>,
    calls: RefCell<Vec<String>>,
    sources: RefCell<Vec<(String, String)>>,
}

impl StaticEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output(mut self, policy: &str, output: EvaluationOutput) -> Self {
        self.outputs.insert(policy.to_string(), output);
        self
    }

    /// Make evaluating `policy` fail as if the runtime could not be started.
    pub fn with_failure(mut self, policy: &str, message: &str) -> Self {
        self.failures.insert(policy.to_string(), message.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// `(policy, source)` pairs in evaluation order.
    pub fn sources(&self) -> Vec<(String, String)> {
        self.sources.borrow().clone()
    }
}

impl PolicyEvaluator for StaticEvaluator {
    fn evaluate(&self, request: &EvaluationRequest<'_>) -> Result<EvaluationOutput> {
        self.calls.borrow_mut().push(request.policy.to_string());
        self.sources
            .borrow_mut()
            .push((request.policy.to_string(), request.policy_source.to_string()));
        if let Some(message) = self.failures.get(request.policy) {
            return Err(Error::Evaluator {
                policy: request.policy.to_string(),
                message: message.clone(),
            });
        }
        Ok(self
            .outputs
            .get(request.policy)
            .cloned()
            .unwrap_or(EvaluationOutput {
                valid: true,
                ..EvaluationOutput::default()
            }))
    }
}
