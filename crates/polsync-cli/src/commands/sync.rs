//! Sync command implementation

use colored::Colorize;

use polsync_core::sync::sync_kinds;
use polsync_core::{AggregateReport, ApplyOptions, ApplyReport, KindStatus, ProcessOutcome};

use crate::cli::Target;
use crate::context::Context;
use crate::error::Result;

/// Run the sync command and return the process exit code.
pub fn run_sync(ctx: &Context, target: Target, dry_run: bool, json: bool) -> Result<i32> {
    let kinds = ctx.kinds(target);
    let remote = ctx.connect(&kinds)?;
    let options = ApplyOptions {
        delete_enabled: ctx.config.delete_missing,
        dry_run,
    };

    if !json {
        println!(
            "{} Syncing {} kind(s) from {}{}",
            "=>".blue().bold(),
            kinds.len(),
            ctx.config.source_dir.as_str().yellow(),
            if dry_run { " (dry run)" } else { "" }
        );
    }

    let report = sync_kinds(&ctx.config, &kinds, &remote, options);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(report.outcome.exit_code(ctx.config.fail_on_warning))
}

fn print_report(report: &AggregateReport) {
    for result in &report.results {
        let kind = result.kind.to_string();
        match result.status {
            KindStatus::Success => {
                let summary = result.report.as_ref().map(summarize).unwrap_or_default();
                println!("{} {}: {}", "OK".green().bold(), kind.cyan(), summary);
            }
            KindStatus::Warning => {
                println!(
                    "{} {}: {}",
                    "WARN".yellow().bold(),
                    kind.cyan(),
                    result.message.as_deref().unwrap_or_default()
                );
            }
            KindStatus::Failure => {
                println!(
                    "{} {}: {}",
                    "FAIL".red().bold(),
                    kind.cyan(),
                    result.message.as_deref().unwrap_or_default()
                );
            }
        }

        if let Some(apply) = &result.report {
            for action in &apply.actions {
                println!("   {} {}", "-".dimmed(), action);
            }
            for failure in &apply.failures {
                println!("   {} {}: {}", "!".red(), failure.name, failure.message);
            }
        }
    }

    println!();
    let outcome = match report.outcome {
        ProcessOutcome::Success => "Sync complete.".green().bold(),
        ProcessOutcome::Warnings => "Sync complete with warnings.".yellow().bold(),
        ProcessOutcome::PartialFailure => "Sync partially failed.".red().bold(),
        ProcessOutcome::TotalFailure => "Sync failed.".red().bold(),
    };
    println!("{}", outcome);
}

fn summarize(report: &ApplyReport) -> String {
    let mut summary = format!(
        "{} created, {} updated, {} deleted, {} unchanged",
        report.created.len(),
        report.updated.len(),
        report.deleted.len(),
        report.unchanged
    );
    if !report.skipped_deletes.is_empty() {
        summary.push_str(&format!(
            " ({} delete(s) skipped; pass --delete to apply)",
            report.skipped_deletes.len()
        ));
    }
    summary
}
