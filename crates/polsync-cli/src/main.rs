//! polsync CLI
//!
//! Pushes a directory of policy and configuration records to the policy
//! service, previews the differences, and validates policies against their
//! fixtures.

mod cli;
mod commands;
mod context;
mod error;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use context::Context;
use error::Result;
use polsync_core::Overrides;

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            std::process::exit(1);
        }
    }
}

/// Logs go to stderr so `--json` output on stdout stays parseable.
/// `RUST_LOG` refines the filter unless `--verbose` is given.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    tracing::debug!("Verbose mode enabled");

    let config = cli.config.as_ref();
    match cli.command {
        Commands::Sync {
            target,
            dir,
            dry_run,
            delete,
            fail_on_warning,
            json,
        } => {
            let overrides = Overrides {
                delete_missing: delete.then_some(true),
                fail_on_warning: fail_on_warning.then_some(true),
                ..Overrides::default()
            };
            let ctx = Context::new(&dir, config, &cli.remote, overrides)?;
            commands::run_sync(&ctx, target, dry_run, json)
        }
        Commands::Diff { target, dir, json } => {
            let ctx = Context::new(&dir, config, &cli.remote, Overrides::default())?;
            commands::run_diff(&ctx, target, json)
        }
        Commands::Validate { dir, policy, json } => {
            let ctx = Context::new(&dir, config, &cli.remote, Overrides::default())?;
            commands::run_validate(&ctx, policy.as_deref(), json)
        }
    }
}
