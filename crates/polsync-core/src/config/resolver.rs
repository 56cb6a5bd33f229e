//! Configuration resolution with hierarchical merge

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

use polsync_fs::{NormalizedPath, document};
use polsync_meta::Kind;

use super::manifest::{KindSection, Manifest, Strategy};
use crate::{Error, Result};

/// Name of the per-source-tree config file.
pub const CONFIG_FILE: &str = "polsync.toml";
/// Environment variable holding the bearer token unless `remote.token_env` says otherwise.
pub const DEFAULT_TOKEN_ENV: &str = "POLSYNC_TOKEN";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Values from the command line, applied last.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub url: Option<String>,
    pub organization: Option<String>,
    pub token: Option<String>,
    pub delete_missing: Option<bool>,
    pub fail_on_warning: Option<bool>,
}

/// Everything a remote accessor needs to connect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSettings {
    pub url: String,
    pub organization: String,
    pub token: Option<String>,
    pub timeout: Duration,
}

/// The effective configuration after merging all layers.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedConfig {
    pub source_dir: NormalizedPath,
    pub url: Option<String>,
    pub organization: Option<String>,
    #[serde(skip)]
    pub token: Option<String>,
    pub timeout_secs: u64,
    pub delete_missing: bool,
    pub fail_on_warning: bool,
    pub kinds: Vec<Kind>,
    #[serde(skip)]
    kind_sections: BTreeMap<Kind, KindSection>,
    pub evaluator: Option<Vec<String>>,
}

impl ResolvedConfig {
    /// Directory holding `kind`'s definitions.
    pub fn kind_dir(&self, kind: Kind) -> NormalizedPath {
        let dir = self
            .kind_sections
            .get(&kind)
            .and_then(|s| s.dir.as_deref())
            .unwrap_or(kind.as_str());
        self.source_dir.join(dir)
    }

    pub fn strategy(&self, kind: Kind) -> Strategy {
        self.kind_sections
            .get(&kind)
            .and_then(|s| s.strategy)
            .unwrap_or_default()
    }

    /// Connection settings. Only an error when a remote call is needed and
    /// the URL or organization is missing.
    pub fn remote(&self) -> Result<RemoteSettings> {
        let url = self.url.clone().ok_or_else(|| {
            Error::config("no remote URL; set remote.url, POLSYNC_URL or --url")
        })?;
        let organization = self.organization.clone().ok_or_else(|| {
            Error::config("no organization; set remote.organization, POLSYNC_ORG or --org")
        })?;
        Ok(RemoteSettings {
            url,
            organization,
            token: self.token.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        })
    }
}

/// Resolves configuration by merging, in order:
///
/// 1. Global defaults (`<config_dir>/polsync/config.toml`)
/// 2. Source tree config (`<source-dir>/polsync.toml`)
/// 3. An explicit `--config` file, when given
/// 4. Command-line and environment overrides
///
/// Missing layers 1 and 2 are skipped. Invalid TOML in any layer is an error.
pub struct ConfigResolver {
    source_dir: NormalizedPath,
    global_config_dir_override: Option<PathBuf>,
    config_file: Option<NormalizedPath>,
}

impl ConfigResolver {
    pub fn new(source_dir: NormalizedPath) -> Self {
        Self {
            source_dir,
            global_config_dir_override: None,
            config_file: None,
        }
    }

    /// Use `dir` in place of the platform config directory. For tests.
    pub fn with_global_config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.global_config_dir_override = Some(dir.into());
        self
    }

    pub fn with_config_file(mut self, path: impl Into<NormalizedPath>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    fn global_config_dir(&self) -> Option<PathBuf> {
        if let Some(ref dir) = self.global_config_dir_override {
            return Some(dir.clone());
        }
        dirs::config_dir().map(|d| d.join("polsync"))
    }

    pub fn resolve(&self, overrides: &Overrides) -> Result<ResolvedConfig> {
        let mut manifest = Manifest::default();

        if let Some(global_dir) = self.global_config_dir() {
            let path = NormalizedPath::new(global_dir.join("config.toml"));
            if path.is_file() {
                tracing::debug!(%path, "Loading global config");
                manifest.merge(&load(&path)?);
            } else {
                tracing::debug!(%path, "No global config; skipping");
            }
        }

        let source_config = self.source_dir.join(CONFIG_FILE);
        if source_config.is_file() {
            tracing::debug!(path = %source_config, "Loading source config");
            manifest.merge(&load(&source_config)?);
        }

        if let Some(path) = &self.config_file {
            if !path.is_file() {
                return Err(Error::config(format!("config file {} does not exist", path)));
            }
            tracing::debug!(%path, "Loading explicit config");
            manifest.merge(&load(path)?);
        }

        let token = match &overrides.token {
            Some(token) => Some(token.clone()),
            None => {
                let var = manifest
                    .remote
                    .token_env
                    .as_deref()
                    .unwrap_or(DEFAULT_TOKEN_ENV);
                std::env::var(var).ok().filter(|t| !t.is_empty())
            }
        };

        Ok(ResolvedConfig {
            source_dir: self.source_dir.clone(),
            url: overrides.url.clone().or(manifest.remote.url),
            organization: overrides
                .organization
                .clone()
                .or(manifest.remote.organization),
            token,
            timeout_secs: manifest
                .remote
                .timeout_secs
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
            delete_missing: overrides
                .delete_missing
                .or(manifest.sync.delete_missing)
                .unwrap_or(false),
            fail_on_warning: overrides
                .fail_on_warning
                .or(manifest.sync.fail_on_warning)
                .unwrap_or(false),
            kinds: manifest.sync.kinds.unwrap_or_else(|| Kind::ALL.to_vec()),
            kind_sections: manifest.kinds,
            evaluator: manifest.validate.evaluator,
        })
    }
}

fn load(path: &NormalizedPath) -> Result<Manifest> {
    document::load(path).map_err(|e| match e {
        polsync_fs::Error::Parse { .. } => Error::config(e.to_string()),
        other => other.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn resolver(source: &TempDir, global: &TempDir) -> ConfigResolver {
        ConfigResolver::new(NormalizedPath::new(source.path()))
            .with_global_config_dir(global.path())
    }

    #[test]
    fn test_defaults_without_config() {
        let source = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();

        let config = resolver(&source, &global)
            .resolve(&Overrides::default())
            .unwrap();

        assert_eq!(config.kinds, Kind::ALL.to_vec());
        assert!(!config.delete_missing);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.strategy(Kind::Teams), Strategy::PerRecord);
        assert!(config.kind_dir(Kind::PolicyMappings).as_str().ends_with("/policy-mappings"));
    }

    #[test]
    fn test_missing_remote_only_fails_on_demand() {
        let source = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();
        let config = resolver(&source, &global)
            .resolve(&Overrides::default())
            .unwrap();

        let err = config.remote().unwrap_err();
        assert!(err.to_string().contains("remote URL"), "{}", err);
    }

    #[test]
    fn test_layers_override_in_order() {
        let source = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();
        fs::write(
            global.path().join("config.toml"),
            "[remote]\nurl = \"https://global\"\norganization = \"acme\"\ntimeout_secs = 5\n",
        )
        .unwrap();
        fs::write(
            source.path().join(CONFIG_FILE),
            "[remote]\nurl = \"https://source\"\n[sync]\ndelete_missing = true\n[kinds.teams]\ndir = \"people\"\nstrategy = \"bulk\"\n",
        )
        .unwrap();

        let overrides = Overrides {
            organization: Some("globex".into()),
            token: Some("s3cret".into()),
            ..Overrides::default()
        };
        let config = resolver(&source, &global).resolve(&overrides).unwrap();
        let remote = config.remote().unwrap();

        assert_eq!(remote.url, "https://source");
        assert_eq!(remote.organization, "globex");
        assert_eq!(remote.token.as_deref(), Some("s3cret"));
        assert_eq!(remote.timeout, Duration::from_secs(5));
        assert!(config.delete_missing);
        assert!(config.kind_dir(Kind::Teams).as_str().ends_with("/people"));
        assert_eq!(config.strategy(Kind::Teams), Strategy::Bulk);
    }

    #[test]
    fn test_invalid_toml_names_file() {
        let source = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();
        fs::write(source.path().join(CONFIG_FILE), "[remote\n").unwrap();

        let err = resolver(&source, &global)
            .resolve(&Overrides::default())
            .unwrap_err();
        assert!(err.to_string().contains(CONFIG_FILE), "{}", err);
    }

    #[test]
    fn test_explicit_config_must_exist() {
        let source = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();
        let err = resolver(&source, &global)
            .with_config_file(source.path().join("nope.toml"))
            .resolve(&Overrides::default())
            .unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }
}
