//! Shared test utilities for the polsync workspace.
//!
//! Dev-dependency only, never published. Use it from `tests/` integration
//! tests; in-crate unit tests would see a second copy of the engine types.
//!
//! # Modules
//!
//! - [`remote`]: [`FakeRemote`], an in-memory accessor that records calls
//! - [`tree`]: [`PolicyTree`] builder for on-disk source trees
//! - [`evaluator`]: [`StaticEvaluator`] with canned runtime answers

pub mod evaluator;
pub mod remote;
pub mod tree;

pub use evaluator::StaticEvaluator;
pub use remote::{Call, FakeRemote};
pub use tree::PolicyTree;
