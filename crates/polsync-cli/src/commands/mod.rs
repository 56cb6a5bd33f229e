//! Command implementations for polsync-cli

pub mod diff;
pub mod sync;
pub mod validate;

pub use diff::run_diff;
pub use sync::run_sync;
pub use validate::run_validate;
