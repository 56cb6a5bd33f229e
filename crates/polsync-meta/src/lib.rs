//! Record kinds, schemas, and local scanning for polsync
//!
//! This crate owns everything polsync knows about configuration records
//! before they meet the remote service:
//!
//! - [`Kind`]: the six record categories and their directory/API names
//! - [`Record`] and [`RecordSet`]: the name-keyed shape every kind shares
//! - [`schema`]: one typed struct per kind
//! - [`Fixture`]: labeled policy test inputs
//! - [`Scanner`]: classifies a directory tree into definitions and fixtures

pub mod error;
pub mod fixture;
pub mod kind;
pub mod record;
pub mod scanner;
pub mod schema;

pub use error::{Error, Result};
pub use fixture::{ExpectedOutcome, Fixture, FixtureName};
pub use kind::Kind;
pub use record::{Record, RecordSet, structural_eq};
pub use scanner::{Definition, ScanOutput, Scanner};
pub use schema::{AppGroup, ClusterPolicy, Policy, PolicyMapping, Rule, Team};
