//! Scan, fetch, reconcile, and apply for one kind or all of them

use polsync_fs::NormalizedPath;
use polsync_meta::{
    AppGroup, ClusterPolicy, Kind, Policy, PolicyMapping, Record, RecordSet, Rule, Scanner, Team,
};

use crate::aggregate::{AggregateReport, KindTask, run_kinds};
use crate::config::{ResolvedConfig, Strategy};
use crate::reconcile::{
    ApplyOptions, ApplyReport, DiffPreview, DiffResult, EqualityRule, apply, apply_bulk, reconcile,
};
use crate::remote::RemoteAccessor;
use crate::{Error, Result};

/// Local and remote sets for one kind, and the diff between them.
struct Plan<R> {
    local: RecordSet<R>,
    remote: RecordSet<R>,
    diff: DiffResult<R>,
}

fn plan<R: Record, A: RemoteAccessor>(dir: &NormalizedPath, accessor: &A) -> Result<Plan<R>> {
    let scan = Scanner::new(dir.clone()).scan()?;
    let local = scan.records::<R>()?;
    let remote = accessor.fetch_all::<R>().map_err(|source| Error::Remote {
        kind: R::KIND,
        source,
    })?;
    let diff = reconcile(&local, &remote, &EqualityRule::for_kind());
    Ok(Plan {
        local,
        remote,
        diff,
    })
}

/// Sync one kind of records from `dir` to the remote.
///
/// A scan failure or a failed fetch aborts before anything is applied.
pub fn sync_kind<R: Record, A: RemoteAccessor>(
    dir: &NormalizedPath,
    accessor: &A,
    options: ApplyOptions,
    strategy: Strategy,
) -> Result<ApplyReport> {
    let Plan { local, diff, .. } = plan::<R, A>(dir, accessor)?;
    match strategy {
        Strategy::PerRecord => Ok(apply(&diff, accessor, options)),
        Strategy::Bulk => apply_bulk(&diff, &local.into_vec(), accessor, options),
    }
}

/// Compute the diff for one kind without applying it.
pub fn preview_kind<R: Record, A: RemoteAccessor>(
    dir: &NormalizedPath,
    accessor: &A,
) -> Result<DiffPreview> {
    let plan = plan::<R, A>(dir, accessor)?;
    DiffPreview::new(&plan.diff, &plan.remote)
}

/// [`sync_kind`] for a kind known only at runtime.
pub fn sync(
    kind: Kind,
    dir: &NormalizedPath,
    accessor: &impl RemoteAccessor,
    options: ApplyOptions,
    strategy: Strategy,
) -> Result<ApplyReport> {
    match kind {
        Kind::Policies => sync_kind::<Policy, _>(dir, accessor, options, strategy),
        Kind::ClusterPolicies => sync_kind::<ClusterPolicy, _>(dir, accessor, options, strategy),
        Kind::AppGroups => sync_kind::<AppGroup, _>(dir, accessor, options, strategy),
        Kind::Rules => sync_kind::<Rule, _>(dir, accessor, options, strategy),
        Kind::PolicyMappings => sync_kind::<PolicyMapping, _>(dir, accessor, options, strategy),
        Kind::Teams => sync_kind::<Team, _>(dir, accessor, options, strategy),
    }
}

/// [`preview_kind`] for a kind known only at runtime.
pub fn preview(
    kind: Kind,
    dir: &NormalizedPath,
    accessor: &impl RemoteAccessor,
) -> Result<DiffPreview> {
    match kind {
        Kind::Policies => preview_kind::<Policy, _>(dir, accessor),
        Kind::ClusterPolicies => preview_kind::<ClusterPolicy, _>(dir, accessor),
        Kind::AppGroups => preview_kind::<AppGroup, _>(dir, accessor),
        Kind::Rules => preview_kind::<Rule, _>(dir, accessor),
        Kind::PolicyMappings => preview_kind::<PolicyMapping, _>(dir, accessor),
        Kind::Teams => preview_kind::<Team, _>(dir, accessor),
    }
}

/// Sync `kinds` in order, using each kind's configured directory and strategy.
pub fn sync_kinds<A: RemoteAccessor>(
    config: &ResolvedConfig,
    kinds: &[Kind],
    accessor: &A,
    options: ApplyOptions,
) -> AggregateReport {
    let tasks = kinds
        .iter()
        .map(|&kind| {
            let dir = config.kind_dir(kind);
            let strategy = config.strategy(kind);
            KindTask::new(kind, dir.is_dir(), move || {
                sync(kind, &dir, accessor, options, strategy)
            })
        })
        .collect();
    run_kinds(tasks)
}
