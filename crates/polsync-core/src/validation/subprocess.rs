//! Policy evaluation through an external command
//!
//! The configured argv is run once per policy as
//! `<argv...> --policy <source> --input <fixture> ...`, and its stdout is
//! read as an [`EvaluationOutput`] JSON document. `<source>` is a temporary
//! file holding the policy source (a policy's `body`, or a cluster policy
//! document), removed once the process exits.

use std::io::Write;
use std::path::Path;
use std::process::Command;

use tempfile::NamedTempFile;

use super::evaluator::{EvaluationOutput, EvaluationRequest, PolicyEvaluator};
use crate::{Error, Result};

#[derive(Debug, Clone)]
pub struct SubprocessEvaluator {
    program: String,
    args: Vec<String>,
}

impl SubprocessEvaluator {
    /// Build from an argv; the first element is the program.
    pub fn new(argv: &[String]) -> Result<Self> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| Error::config("validate.evaluator must name a program"))?;
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }

    fn command(&self, request: &EvaluationRequest<'_>, source: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).arg("--policy").arg(source);
        for fixture in request.fixtures {
            cmd.arg("--input").arg(fixture.path.to_native());
        }
        cmd
    }
}

impl PolicyEvaluator for SubprocessEvaluator {
    /// A non-zero exit is fine as long as stdout is a valid report; many
    /// runtimes signal findings through the exit code.
    fn evaluate(&self, request: &EvaluationRequest<'_>) -> Result<EvaluationOutput> {
        let failed = |message: String| Error::Evaluator {
            policy: request.policy.to_string(),
            message,
        };

        tracing::debug!(
            policy = request.policy,
            program = %self.program,
            definition = %request.policy_path,
            fixtures = request.fixtures.len(),
            "Running evaluator"
        );
        let source = write_source(request)
            .map_err(|e| failed(format!("failed to stage policy source: {}", e)))?;
        let output = self
            .command(request, source.path())
            .output()
            .map_err(|e| failed(format!("failed to start '{}': {}", self.program, e)))?;

        match serde_json::from_slice::<EvaluationOutput>(&output.stdout) {
            Ok(parsed) => {
                if !output.status.success() {
                    tracing::debug!(
                        policy = request.policy,
                        code = ?output.status.code(),
                        "Evaluator exited non-zero with a report"
                    );
                }
                Ok(parsed)
            }
            Err(e) if output.status.success() => {
                Err(failed(format!("invalid JSON on stdout: {}", e)))
            }
            Err(_) => {
                let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
                let code = output.status.code().unwrap_or(-1);
                Err(failed(format!("exited with code {}: {}", code, stderr)))
            }
        }
    }
}

fn write_source(request: &EvaluationRequest<'_>) -> std::io::Result<NamedTempFile> {
    let stem: String = request
        .policy
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    let mut file = tempfile::Builder::new()
        .prefix(&format!("polsync-{}-", stem))
        .tempfile()?;
    file.write_all(request.policy_source.as_bytes())?;
    file.flush()?;
    Ok(file)
}
