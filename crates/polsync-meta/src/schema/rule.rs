//! Automation rule definitions - loaded from `rules/*.yaml`

use serde::{Deserialize, Serialize};

use super::criteria::{Criterion, canonical};
use crate::Kind;
use crate::record::Record;

fn default_enabled() -> bool {
    true
}

/// An automation rule: when `trigger` fires for a matching resource, run
/// `actions` in order.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Rule {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub trigger: Trigger,
    #[serde(default, rename = "match", skip_serializing_if = "Vec::is_empty")]
    pub matches: Vec<Criterion>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<Criterion>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<RuleAction>,
}

impl Default for Rule {
    fn default() -> Self {
        Self {
            name: String::new(),
            id: None,
            description: String::new(),
            enabled: default_enabled(),
            trigger: Trigger::default(),
            matches: Vec::new(),
            exclude: Vec::new(),
            actions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Trigger {
    #[default]
    Violation,
    Schedule,
    ResourceChange,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RuleAction {
    /// e.g. `notify`, `ticket`, `remediate`
    #[serde(rename = "type")]
    pub action: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub target: String,
}

impl Record for Rule {
    const KIND: Kind = Kind::Rules;

    fn name(&self) -> &str {
        &self.name
    }

    fn remote_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn with_remote_id(mut self, id: Option<String>) -> Self {
        self.id = id;
        self
    }

    // Criteria order is irrelevant; action order is not.
    fn same_content(&self, other: &Self) -> bool {
        self.name == other.name
            && self.description == other.description
            && self.enabled == other.enabled
            && self.trigger == other.trigger
            && canonical(&self.matches) == canonical(&other.matches)
            && canonical(&self.exclude) == canonical(&other.exclude)
            && self.actions == other.actions
    }
}
