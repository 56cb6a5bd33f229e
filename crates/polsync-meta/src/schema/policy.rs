//! Policy definitions - loaded from `policies/*.yaml`
//!
//! # Example YAML
//!
//! ```yaml
//! name: require-labels
//! description: Every workload must carry an owner label.
//! severity: high
//! enforcement: enforce
//! tags: [labels, governance]
//! body: |
//!   deny[msg] { not input.metadata.labels.owner; msg := "owner label missing" }
//! ```

use serde::{Deserialize, Serialize};

use crate::record::{Record, sorted};
use crate::Kind;

/// An admission or compliance policy.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Policy {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub enforcement: Enforcement,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Policy source text, handed to the evaluation runtime unchanged.
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

/// What the service does when a policy finds a violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Enforcement {
    /// Report only
    #[default]
    Audit,
    /// Reject the request
    Enforce,
}

/// Body text with trailing whitespace on each line and trailing blank
/// lines removed. YAML block scalars routinely differ in just these.
fn normalized_body(body: &str) -> String {
    body.lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim_end()
        .to_string()
}

impl Record for Policy {
    const KIND: Kind = Kind::Policies;

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

    fn same_content(&self, other: &Self) -> bool {
        self.name == other.name
            && self.description == other.description
            && self.severity == other.severity
            && self.enforcement == other.enforcement
            && sorted(&self.tags) == sorted(&other.tags)
            && normalized_body(&self.body) == normalized_body(&other.body)
    }
}
