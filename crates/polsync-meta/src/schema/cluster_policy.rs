//! Cluster policy definitions - loaded from `cluster-policies/*.yaml`
//!
//! Cluster policies are native cluster resources. polsync does not model
//! their schema; the whole file is kept as an opaque document and the
//! identity comes from `metadata.name`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::record::Record;
use crate::scanner::Definition;
use crate::{Kind, Result};

/// Fields the cluster fills in after admission. They never count as drift.
pub const SERVER_MANAGED_FIELDS: &[&str] = &[
    "status",
    "metadata.uid",
    "metadata.resourceVersion",
    "metadata.creationTimestamp",
    "metadata.generation",
    "metadata.managedFields",
];

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ClusterPolicy {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub document: Value,
}

impl ClusterPolicy {
    /// The document with [`SERVER_MANAGED_FIELDS`] removed.
    pub fn desired_state(&self) -> Value {
        let mut doc = self.document.clone();
        for field in SERVER_MANAGED_FIELDS {
            remove_path(&mut doc, field);
        }
        doc
    }
}

fn remove_path(value: &mut Value, dotted: &str) {
    match dotted.split_once('.') {
        None => {
            if let Value::Object(map) = value {
                map.remove(dotted);
            }
        }
        Some((head, rest)) => {
            if let Some(child) = value.get_mut(head) {
                remove_path(child, rest);
            }
        }
    }
}

impl Record for ClusterPolicy {
    const KIND: Kind = Kind::ClusterPolicies;

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
        self.name == other.name && self.desired_state() == other.desired_state()
    }

    fn from_definition(definition: &Definition) -> Result<Self> {
        Ok(Self {
            name: definition.name.clone(),
            id: None,
            document: definition.document.value.clone(),
        })
    }
}
