//! Configuration record kinds

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// A category of configuration record sharing one reconciliation shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Kind {
    Policies,
    ClusterPolicies,
    AppGroups,
    Rules,
    PolicyMappings,
    Teams,
}

impl Kind {
    /// Every kind, in the default sync order.
    ///
    /// Mappings reference policies and app groups by name, so they come
    /// after both.
    pub const ALL: [Kind; 6] = [
        Kind::Policies,
        Kind::ClusterPolicies,
        Kind::AppGroups,
        Kind::Rules,
        Kind::PolicyMappings,
        Kind::Teams,
    ];

    /// Path segment used both for the local subdirectory and the API route.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Policies => "policies",
            Self::ClusterPolicies => "cluster-policies",
            Self::AppGroups => "app-groups",
            Self::Rules => "rules",
            Self::PolicyMappings => "policy-mappings",
            Self::Teams => "teams",
        }
    }

    /// Singular human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Policies => "policy",
            Self::ClusterPolicies => "cluster policy",
            Self::AppGroups => "app group",
            Self::Rules => "rule",
            Self::PolicyMappings => "policy mapping",
            Self::Teams => "team",
        }
    }

    /// Whether this kind carries a policy body that fixtures can exercise.
    pub fn is_policy(&self) -> bool {
        matches!(self, Self::Policies | Self::ClusterPolicies)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        Kind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| Error::UnknownKind {
                value: s.to_string(),
            })
    }
}
