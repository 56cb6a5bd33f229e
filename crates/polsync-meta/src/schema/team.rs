//! Team definitions - loaded from `teams/*.yaml`
//!
//! # Example YAML
//!
//! ```yaml
//! name: platform
//! members: [alice@example.com, bob@example.com]
//! permissions:
//!   - scope: app-groups/payments
//!     access: write
//! ```

use serde::{Deserialize, Serialize};

use crate::Kind;
use crate::record::{Record, sorted};

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Team {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

/// A permission boundary: what the team may do within `scope`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Deserialize, Serialize)]
pub struct Permission {
    pub scope: String,
    pub access: Access,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    Read,
    Write,
    Admin,
}

impl Record for Team {
    const KIND: Kind = Kind::Teams;

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
            && sorted(&self.members) == sorted(&other.members)
            && sorted(&self.permissions) == sorted(&other.permissions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_order_is_not_a_change() {
        let a = Team {
            name: "platform".into(),
            members: vec!["bob".into(), "alice".into()],
            ..Team::default()
        };
        let b = Team {
            members: vec!["alice".into(), "bob".into()],
            ..a.clone()
        };
        assert!(a.same_content(&b));
    }

    #[test]
    fn test_access_level_change_is_a_change() {
        let read = Team {
            name: "platform".into(),
            permissions: vec![Permission {
                scope: "teams".into(),
                access: Access::Read,
            }],
            ..Team::default()
        };
        let admin = Team {
            permissions: vec![Permission {
                scope: "teams".into(),
                access: Access::Admin,
            }],
            ..read.clone()
        };
        assert!(!read.same_content(&admin));
    }
}
