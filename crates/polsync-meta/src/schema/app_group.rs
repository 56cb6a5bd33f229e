//! App group definitions - loaded from `app-groups/*.yaml`

use serde::{Deserialize, Serialize};

use super::criteria::{Criterion, canonical};
use crate::Kind;
use crate::record::Record;

/// A named grouping of workloads, selected by criteria.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AppGroup {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, rename = "match", skip_serializing_if = "Vec::is_empty")]
    pub matches: Vec<Criterion>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<Criterion>,
}

impl Record for AppGroup {
    const KIND: Kind = Kind::AppGroups;

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
            && canonical(&self.matches) == canonical(&other.matches)
            && canonical(&self.exclude) == canonical(&other.exclude)
    }
}
