//! Record schemas, one module per kind
//!
//! Every schema carries a `name` and an optional remote `id`. Local files
//! never need the `id`; it is filled in from the remote side when an
//! update is sent.

mod app_group;
mod cluster_policy;
mod criteria;
mod policy;
mod policy_mapping;
mod rule;
mod team;

pub use app_group::AppGroup;
pub use cluster_policy::{ClusterPolicy, SERVER_MANAGED_FIELDS};
pub use criteria::Criterion;
pub use policy::{Enforcement, Policy, Severity};
pub use policy_mapping::PolicyMapping;
pub use rule::{Rule, RuleAction, Trigger};
pub use team::{Access, Permission, Team};
