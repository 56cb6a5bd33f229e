//! Validate command implementation

use colored::Colorize;
use serde::Serialize;

use polsync_core::validation::{ValidationSummary, ValidationVerdict, validate_dir};
use polsync_core::SubprocessEvaluator;
use polsync_meta::Kind;

use crate::context::Context;
use crate::error::{CliError, Result};

#[derive(Serialize)]
struct KindSummary {
    kind: Kind,
    #[serde(flatten)]
    summary: ValidationSummary,
}

/// Run the validate command and return the process exit code.
///
/// Policies and cluster policies are validated; a scan failure in either
/// aborts the command.
pub fn run_validate(ctx: &Context, policy: Option<&str>, json: bool) -> Result<i32> {
    let kinds: Vec<Kind> = Kind::ALL
        .into_iter()
        .filter(|k| k.is_policy() && ctx.config.kind_dir(*k).is_dir())
        .collect();

    if kinds.is_empty() {
        if !json {
            println!(
                "{} No policy directories under {}",
                "WARN".yellow().bold(),
                ctx.config.source_dir.as_str().yellow()
            );
        } else {
            println!("[]");
        }
        return Ok(if ctx.config.fail_on_warning { 1 } else { 0 });
    }

    let argv = ctx.config.evaluator.as_deref().ok_or_else(|| {
        CliError::user("No evaluator configured; set [validate] evaluator in polsync.toml")
    })?;
    let evaluator = SubprocessEvaluator::new(argv)?;

    let mut summaries = Vec::new();
    for kind in kinds {
        let summary = validate_dir(kind, &ctx.config.kind_dir(kind), &evaluator, policy)?;
        summaries.push(KindSummary { kind, summary });
    }

    if let Some(name) = policy {
        if summaries.iter().all(|s| s.summary.verdicts.is_empty()) {
            return Err(CliError::user(format!("No policy named '{}'", name)));
        }
    }

    let passed = summaries.iter().all(|s| s.summary.passed());

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    } else {
        for kind in &summaries {
            for warning in &kind.summary.warnings {
                println!("{} {}", "WARN".yellow().bold(), warning);
            }
            for verdict in &kind.summary.verdicts {
                print_verdict(verdict);
            }
        }
        println!();
        if passed {
            println!("{}", "All policies passed.".green().bold());
        } else {
            let failed: usize = summaries.iter().map(|s| s.summary.failed().count()).sum();
            println!("{}", format!("{} policy(ies) failed.", failed).red().bold());
        }
    }

    Ok(if passed { 0 } else { 1 })
}

fn print_verdict(verdict: &ValidationVerdict) {
    let status = if verdict.passed {
        "PASS".green().bold()
    } else {
        "FAIL".red().bold()
    };
    println!("{} {}", status, verdict.policy.cyan());
    for mismatch in &verdict.mismatches {
        let actual = match mismatch.actual {
            Some(actual) => format!("{:?}", actual).to_lowercase(),
            None => "no result".to_string(),
        };
        println!(
            "   {} {}: expected {:?}, got {}",
            "!".red(),
            mismatch.case_id,
            mismatch.expected,
            actual
        );
    }
    for error in &verdict.errors {
        println!("   {} {}", "error:".red(), error);
    }
    for warning in &verdict.warnings {
        println!("   {} {}", "warning:".yellow(), warning);
    }
}
