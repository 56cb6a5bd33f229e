//! Engines for polsync
//!
//! This crate sits between the local record model and the outer surfaces,
//! implementing:
//!
//! - **Reconciliation**: three-way diff of local and remote record sets, and
//!   applying it with dry-run and delete gating
//! - **Aggregation**: a sequential run over kinds, reduced to one outcome
//! - **Validation**: judging a policy against its labeled fixtures
//! - **Configuration resolution**: layered `polsync.toml` merge
//!
//! # Architecture
//!
//! ```text
//!                 polsync-cli
//!                  |       |
//!        polsync-core   polsync-remote
//!           |      |       |
//!   polsync-meta   +-------+  (RemoteAccessor)
//!           |
//!      polsync-fs
//! ```
//!
//! The engines never perform I/O against the remote directly; everything
//! goes through [`RemoteAccessor`].

pub mod aggregate;
pub mod config;
pub mod error;
pub mod reconcile;
pub mod remote;
pub mod sync;
pub mod validation;

pub use aggregate::{AggregateReport, KindResult, KindStatus, KindTask, ProcessOutcome, run_kinds};
pub use config::{ConfigResolver, Manifest, Overrides, RemoteSettings, ResolvedConfig, Strategy};
pub use error::{Error, Result};
pub use reconcile::{
    ApplyOptions, ApplyReport, DiffPreview, DiffResult, EqualityRule, Operation, RecordFailure,
    UpdatePreview, apply, apply_bulk, reconcile,
};
pub use remote::{BulkItemError, BulkOutcome, RemoteAccessor, RemoteError};
pub use validation::{
    ActualOutcome, CaseResult, EvaluatedRun, EvaluationOutput, EvaluationRequest, PolicyEvaluator,
    SubprocessEvaluator, ValidationRun, ValidationSummary, ValidationVerdict, VerdictBasis,
};
