//! CLI argument parsing using clap derive

use std::path::PathBuf;
use std::str::FromStr;

use clap::{Args, Parser, Subcommand};

use polsync_meta::Kind;

/// polsync - Keep a policy service in sync with a directory of YAML
#[derive(Parser, Debug)]
#[command(name = "polsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Extra config file, merged over polsync.toml
    #[arg(long, global = true, env = "POLSYNC_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub remote: RemoteArgs,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Connection flags, each with an environment fallback
#[derive(Args, Debug, Clone, Default)]
pub struct RemoteArgs {
    /// Base URL of the policy service
    #[arg(long, global = true, env = "POLSYNC_URL")]
    pub url: Option<String>,

    /// Organization to sync into
    #[arg(long = "org", global = true, env = "POLSYNC_ORG")]
    pub organization: Option<String>,

    /// Bearer token
    #[arg(long, global = true, env = "POLSYNC_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}

/// Which kinds a command covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    All,
    One(Kind),
}

impl FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        s.parse::<Kind>().map(Self::One).map_err(|e| e.to_string())
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Push local records to the remote service
    ///
    /// Examples:
    ///   polsync sync all --dry-run         # Preview every kind
    ///   polsync sync teams --delete        # Also delete remote-only teams
    Sync {
        /// Kind to sync, or "all"
        target: Target,

        /// Source directory holding one subdirectory per kind
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,

        /// Preview changes without applying them
        #[arg(long)]
        dry_run: bool,

        /// Delete remote records that have no local definition
        #[arg(long)]
        delete: bool,

        /// Exit non-zero when a kind had nothing to push
        #[arg(long)]
        fail_on_warning: bool,

        /// Output as JSON for CI/CD integration
        #[arg(long)]
        json: bool,
    },

    /// Show what sync would change, with a text diff per update
    Diff {
        /// Kind to diff, or "all"
        target: Target,

        /// Source directory holding one subdirectory per kind
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Run policies against their fixtures
    Validate {
        /// Source directory holding one subdirectory per kind
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,

        /// Only validate this policy
        #[arg(long)]
        policy: Option<String>,

        /// Output as JSON for CI/CD integration
        #[arg(long)]
        json: bool,
    },
}
