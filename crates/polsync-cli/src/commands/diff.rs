//! Diff command implementation
//!
//! Previews what sync would change without applying it.

use colored::Colorize;
use serde_json::json;

use polsync_core::DiffPreview;
use polsync_core::sync::preview;

use crate::cli::Target;
use crate::context::Context;
use crate::error::Result;

/// Run the diff command and return the process exit code.
pub fn run_diff(ctx: &Context, target: Target, json: bool) -> Result<i32> {
    let kinds = ctx.kinds(target);
    let remote = ctx.connect(&kinds)?;

    let mut previews = Vec::new();
    let mut errors = Vec::new();
    let mut missing = Vec::new();

    for kind in kinds {
        let dir = ctx.config.kind_dir(kind);
        if !dir.is_dir() {
            missing.push(kind);
            continue;
        }
        match preview(kind, &dir, &remote) {
            Ok(diff) => previews.push(diff),
            Err(e) => errors.push((kind, e.to_string())),
        }
    }

    if json {
        let output = json!({
            "has_changes": previews.iter().any(|p| !p.is_empty()),
            "kinds": previews,
            "missing": missing,
            "errors": errors
                .iter()
                .map(|(kind, message)| json!({ "kind": kind, "message": message }))
                .collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        for diff in &previews {
            print_preview(diff);
        }
        for kind in &missing {
            println!(
                "{} {}: no local directory",
                "WARN".yellow().bold(),
                kind.to_string().cyan()
            );
        }
        for (kind, message) in &errors {
            println!(
                "{} {}: {}",
                "FAIL".red().bold(),
                kind.to_string().cyan(),
                message
            );
        }
        if errors.is_empty() && previews.iter().all(DiffPreview::is_empty) {
            println!("{} No changes needed. Remote is in sync.", "OK".green().bold());
        }
    }

    Ok(if errors.is_empty() { 0 } else { 1 })
}

fn print_preview(diff: &DiffPreview) {
    println!(
        "{} {} ({} unchanged)",
        "Diff".blue().bold(),
        diff.kind.to_string().cyan(),
        diff.unchanged
    );
    for name in &diff.inserts {
        println!("   {} {}", "+".green(), name);
    }
    for name in &diff.deletes {
        println!("   {} {}", "-".red(), name);
    }
    for update in &diff.updates {
        println!("   {} {}", "~".yellow(), update.name);
        for line in update.unified_diff().lines() {
            let line = if line.starts_with('+') && !line.starts_with("+++") {
                line.green().to_string()
            } else if line.starts_with('-') && !line.starts_with("---") {
                line.red().to_string()
            } else if line.starts_with("@@") {
                line.cyan().to_string()
            } else {
                line.to_string()
            };
            println!("      {}", line);
        }
    }
}
