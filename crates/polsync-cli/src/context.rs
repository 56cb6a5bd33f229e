//! Command context: resolved configuration and the remote connection
//!
//! Every command builds a [`Context`] from the global flags and its source
//! directory. The remote is connected only when a kind actually has local
//! records to compare.

use std::path::{Path, PathBuf};

use polsync_core::remote::{BulkOutcome, RemoteAccessor, RemoteError};
use polsync_core::{ConfigResolver, Overrides, ResolvedConfig};
use polsync_fs::NormalizedPath;
use polsync_meta::{Kind, Record, RecordSet};
use polsync_remote::HttpRemote;

use crate::cli::{RemoteArgs, Target};
use crate::error::{CliError, Result};

pub struct Context {
    pub config: ResolvedConfig,
}

impl Context {
    pub fn new(
        dir: &Path,
        config_file: Option<&PathBuf>,
        remote: &RemoteArgs,
        overrides: Overrides,
    ) -> Result<Self> {
        if dir.exists() && !dir.is_dir() {
            return Err(CliError::user(format!("{} is not a directory", dir.display())));
        }
        let mut resolver = ConfigResolver::new(NormalizedPath::new(dir));
        if let Some(path) = config_file {
            resolver = resolver.with_config_file(path.as_path());
        }
        let overrides = Overrides {
            url: remote.url.clone(),
            organization: remote.organization.clone(),
            token: remote.token.clone(),
            ..overrides
        };
        Ok(Self {
            config: resolver.resolve(&overrides)?,
        })
    }

    /// The kinds a target covers, in configured order.
    pub fn kinds(&self, target: Target) -> Vec<Kind> {
        match target {
            Target::All => self.config.kinds.clone(),
            Target::One(kind) => vec![kind],
        }
    }

    /// Connect when any of `kinds` has a local directory. Otherwise no
    /// remote call will be made and a missing URL is not an error.
    pub fn connect(&self, kinds: &[Kind]) -> Result<Remote> {
        let needed = kinds.iter().any(|k| self.config.kind_dir(*k).is_dir());
        if !needed {
            tracing::debug!("No local kind directories; not connecting");
            return Ok(Remote::Offline);
        }
        let settings = self
            .config
            .remote()
            .map_err(|e| CliError::user(e.to_string()))?;
        tracing::debug!(url = %settings.url, org = %settings.organization, "Connecting");
        Ok(Remote::Http(HttpRemote::new(&settings)?))
    }
}

/// The remote, or its absence when nothing needs it.
pub enum Remote {
    Http(HttpRemote),
    Offline,
}

fn offline() -> RemoteError {
    RemoteError::Network("no remote configured".to_string())
}

impl RemoteAccessor for Remote {
    fn fetch_all<R: Record>(&self) -> std::result::Result<RecordSet<R>, RemoteError> {
        match self {
            Self::Http(remote) => remote.fetch_all(),
            Self::Offline => Err(offline()),
        }
    }

    fn create<R: Record>(&self, record: &R) -> std::result::Result<(), RemoteError> {
        match self {
            Self::Http(remote) => remote.create(record),
            Self::Offline => Err(offline()),
        }
    }

    fn replace<R: Record>(&self, record: &R) -> std::result::Result<(), RemoteError> {
        match self {
            Self::Http(remote) => remote.replace(record),
            Self::Offline => Err(offline()),
        }
    }

    fn delete(&self, kind: Kind, name: &str) -> std::result::Result<(), RemoteError> {
        match self {
            Self::Http(remote) => remote.delete(kind, name),
            Self::Offline => Err(offline()),
        }
    }

    fn bulk_reconcile<R: Record>(
        &self,
        records: &[R],
        delete_missing: bool,
    ) -> std::result::Result<BulkOutcome, RemoteError> {
        match self {
            Self::Http(remote) => remote.bulk_reconcile(records, delete_missing),
            Self::Offline => Err(offline()),
        }
    }
}
