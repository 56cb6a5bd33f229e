//! Policy mapping definitions - loaded from `policy-mappings/*.yaml`

use serde::{Deserialize, Serialize};

use super::policy::Enforcement;
use crate::Kind;
use crate::record::{Record, sorted};

/// Binds policies to app groups, optionally overriding enforcement.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PolicyMapping {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default)]
    pub policies: Vec<String>,
    #[serde(default)]
    pub app_groups: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enforcement: Option<Enforcement>,
}

impl Record for PolicyMapping {
    const KIND: Kind = Kind::PolicyMappings;

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
            && self.enforcement == other.enforcement
            && sorted(&self.policies) == sorted(&other.policies)
            && sorted(&self.app_groups) == sorted(&other.app_groups)
    }
}
