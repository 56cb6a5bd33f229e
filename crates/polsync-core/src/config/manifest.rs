//! Manifest parsing for polsync.toml files
//!
//! A manifest is one configuration file. Every field is optional so that
//! an unset value in a later layer never clobbers an earlier one.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use polsync_meta::Kind;

/// How one kind's diff is pushed to the remote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// One create/replace/delete call per record
    #[default]
    PerRecord,
    /// One request carrying the whole local set
    Bulk,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RemoteSection {
    pub url: Option<String>,
    pub organization: Option<String>,
    /// Name of the environment variable holding the bearer token
    pub token_env: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SyncSection {
    pub delete_missing: Option<bool>,
    pub fail_on_warning: Option<bool>,
    /// Kinds processed by `sync all`, in order
    pub kinds: Option<Vec<Kind>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KindSection {
    /// Directory relative to the source root
    pub dir: Option<String>,
    pub strategy: Option<Strategy>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValidateSection {
    /// Evaluator argv; `--policy` and `--input` arguments are appended
    pub evaluator: Option<Vec<String>>,
}

/// One parsed polsync.toml
///
/// ```
/// use polsync_core::config::{Manifest, Strategy};
/// use polsync_meta::Kind;
///
/// let manifest: Manifest = toml::from_str(r#"
/// [remote]
/// organization = "acme"
///
/// [kinds.cluster-policies]
/// strategy = "bulk"
/// "#).unwrap();
///
/// assert_eq!(manifest.remote.organization.as_deref(), Some("acme"));
/// assert_eq!(manifest.kinds[&Kind::ClusterPolicies].strategy, Some(Strategy::Bulk));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub remote: RemoteSection,
    #[serde(default)]
    pub sync: SyncSection,
    #[serde(default)]
    pub kinds: BTreeMap<Kind, KindSection>,
    #[serde(default)]
    pub validate: ValidateSection,
}

impl Manifest {
    /// Merge `other` into this manifest; values set in `other` win.
    pub fn merge(&mut self, other: &Manifest) {
        overlay(&mut self.remote.url, &other.remote.url);
        overlay(&mut self.remote.organization, &other.remote.organization);
        overlay(&mut self.remote.token_env, &other.remote.token_env);
        overlay(&mut self.remote.timeout_secs, &other.remote.timeout_secs);

        overlay(&mut self.sync.delete_missing, &other.sync.delete_missing);
        overlay(&mut self.sync.fail_on_warning, &other.sync.fail_on_warning);
        overlay(&mut self.sync.kinds, &other.sync.kinds);

        for (kind, section) in &other.kinds {
            let base = self.kinds.entry(*kind).or_default();
            overlay(&mut base.dir, &section.dir);
            overlay(&mut base.strategy, &section.strategy);
        }

        overlay(&mut self.validate.evaluator, &other.validate.evaluator);
    }
}

fn overlay<T: Clone>(base: &mut Option<T>, other: &Option<T>) {
    if other.is_some() {
        base.clone_from(other);
    }
}
