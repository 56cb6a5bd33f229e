//! Match and exclude criteria shared by rules and app groups

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::record::sorted;

/// Selects resources by kind, namespace, and labels.
///
/// Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Deserialize, Serialize)]
pub struct Criterion {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub kinds: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub namespaces: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

impl Criterion {
    fn canonical(&self) -> Self {
        Self {
            kinds: sorted(&self.kinds),
            namespaces: sorted(&self.namespaces),
            labels: self.labels.clone(),
        }
    }
}

/// Canonical form of a criteria list: inner lists and the list itself sorted.
pub(crate) fn canonical(criteria: &[Criterion]) -> Vec<Criterion> {
    let mut list: Vec<Criterion> = criteria.iter().map(Criterion::canonical).collect();
    list.sort();
    list
}
