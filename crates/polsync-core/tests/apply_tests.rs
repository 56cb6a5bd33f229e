//! Applying diffs through a recording fake remote

use polsync_core::{
    ApplyOptions, EqualityRule, Error, Operation, RemoteError, apply, apply_bulk, reconcile,
};
use polsync_meta::{Kind, Policy, Record, RecordSet, Team};
use polsync_test_utils::{Call, FakeRemote};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn policy(name: &str, body: &str) -> Policy {
    Policy {
        name: name.to_string(),
        body: body.to_string(),
        ..Policy::default()
    }
}

fn local_abc() -> RecordSet<Policy> {
    RecordSet::from_records([policy("A", "v1"), policy("B", "v1")]).unwrap()
}

/// Remote holds `{B: v0, C: v1}`.
fn remote_abc() -> FakeRemote {
    let remote = FakeRemote::new();
    remote.seed([policy("B", "v0"), policy("C", "v1")]);
    remote
}

fn diff_against(remote: &FakeRemote, local: &RecordSet<Policy>) -> polsync_core::DiffResult<Policy> {
    use polsync_core::RemoteAccessor;
    let current = remote.fetch_all::<Policy>().unwrap();
    remote.clear_calls();
    reconcile(local, &current, &EqualityRule::for_kind())
}

#[rstest]
#[case(false)]
#[case(true)]
fn test_dry_run_makes_no_calls(#[case] delete_enabled: bool) {
    let remote = remote_abc();
    let diff = diff_against(&remote, &local_abc());

    let report = apply(
        &diff,
        &remote,
        ApplyOptions {
            delete_enabled,
            dry_run: true,
        },
    );

    assert!(remote.calls().is_empty());
    assert!(report.dry_run);
    assert_eq!(report.created, vec!["A".to_string()]);
    assert_eq!(report.updated, vec!["B".to_string()]);
    assert!(report.actions.iter().any(|a| a == "[dry-run] Would create policy 'A'"));
    assert!(report.actions.iter().any(|a| a == "[dry-run] Would update policy 'B'"));
    if delete_enabled {
        assert_eq!(report.deleted, vec!["C".to_string()]);
    } else {
        assert_eq!(report.skipped_deletes, vec!["C".to_string()]);
        assert!(
            report
                .actions
                .iter()
                .any(|a| a == "[dry-run] Would delete policy 'C' (deletes disabled)"),
            "{:?}",
            report.actions
        );
    }
    assert_eq!(remote.names(Kind::Policies), vec!["B", "C"]);
}

#[test]
fn test_deletes_disabled_issue_no_delete() {
    let remote = remote_abc();
    let diff = diff_against(&remote, &local_abc());

    let report = apply(&diff, &remote, ApplyOptions::default());

    assert!(!remote.calls().iter().any(|c| matches!(c, Call::Delete(..))));
    assert_eq!(report.skipped_deletes, vec!["C".to_string()]);
    assert!(report.deleted.is_empty());
    assert!(
        report
            .actions
            .iter()
            .any(|a| a == "Would delete policy 'C' (deletes disabled)")
    );
    assert!(!report.actions.iter().any(|a| a.starts_with("[dry-run]")));
    assert_eq!(remote.names(Kind::Policies), vec!["B", "C", "A"]);
}

#[test]
fn test_order_is_delete_insert_update() {
    let remote = remote_abc();
    let diff = diff_against(&remote, &local_abc());

    let report = apply(
        &diff,
        &remote,
        ApplyOptions {
            delete_enabled: true,
            dry_run: false,
        },
    );

    assert_eq!(
        remote.calls(),
        vec![
            Call::Delete(Kind::Policies, "C".into()),
            Call::Create(Kind::Policies, "A".into()),
            Call::Replace(Kind::Policies, "B".into()),
        ]
    );
    assert!(report.success());
    assert_eq!(report.actions[0], "Deleted policy 'C'");

    let after = remote.records::<Policy>();
    assert_eq!(after.get("B").unwrap().body, "v1");
    assert!(after.get("B").unwrap().remote_id().is_some());
    assert!(!after.contains("C"));
}

#[test]
fn test_second_apply_is_noop() {
    let remote = remote_abc();
    let local = local_abc();
    let options = ApplyOptions {
        delete_enabled: true,
        dry_run: false,
    };
    apply(&diff_against(&remote, &local), &remote, options);

    let diff = diff_against(&remote, &local);
    assert!(diff.is_empty());
    let report = apply(&diff, &remote, options);
    assert!(report.is_noop());
    assert!(remote.calls().is_empty());
}

#[test]
fn test_failure_does_not_stop_the_batch() {
    let remote = FakeRemote::new();
    remote.fail_on(Kind::Policies, "A", 500);
    let local = RecordSet::from_records([policy("A", "v1"), policy("B", "v1")]).unwrap();
    let diff = diff_against(&remote, &local);

    let report = apply(&diff, &remote, ApplyOptions::default());

    assert_eq!(report.created, vec!["B".to_string()]);
    assert_eq!(report.failures.len(), 1);
    let failure = &report.failures[0];
    assert_eq!(failure.name, "A");
    assert_eq!(failure.operation, Operation::Create);
    assert_eq!(failure.status, Some(500));
    assert!(!report.success());
}

#[test]
fn test_bulk_dry_run_makes_no_calls() {
    let remote = FakeRemote::with_bulk();
    remote.seed([policy("C", "v1")]);
    let local = local_abc();
    let diff = diff_against(&remote, &local);

    let report = apply_bulk(
        &diff,
        &local.clone().into_vec(),
        &remote,
        ApplyOptions {
            delete_enabled: true,
            dry_run: true,
        },
    )
    .unwrap();

    assert!(remote.calls().is_empty());
    assert_eq!(report.created.len(), 2);
    assert_eq!(report.deleted, vec!["C".to_string()]);
}

#[test]
fn test_bulk_sends_one_request() {
    let remote = FakeRemote::with_bulk();
    remote.seed([policy("B", "v0"), policy("C", "v1")]);
    remote.fail_on(Kind::Policies, "A", 422);
    let local = local_abc();
    let diff = diff_against(&remote, &local);

    let report = apply_bulk(
        &diff,
        &local.clone().into_vec(),
        &remote,
        ApplyOptions {
            delete_enabled: true,
            dry_run: false,
        },
    )
    .unwrap();

    assert_eq!(remote.calls(), vec![Call::Bulk(Kind::Policies, 2)]);
    assert!(report.created.is_empty());
    assert_eq!(report.updated, vec!["B".to_string()]);
    assert_eq!(report.deleted, vec!["C".to_string()]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].operation, Operation::Create);
    assert_eq!(remote.names(Kind::Policies), vec!["B"]);
}

#[test]
fn test_bulk_keeps_remote_only_records_when_deletes_disabled() {
    let remote = FakeRemote::with_bulk();
    remote.seed([Team {
        name: "legacy".into(),
        ..Team::default()
    }]);
    let local: Vec<Team> = Vec::new();
    let current = {
        use polsync_core::RemoteAccessor;
        remote.fetch_all::<Team>().unwrap()
    };
    let diff = reconcile(&RecordSet::new(), &current, &EqualityRule::for_kind());

    let report = apply_bulk(&diff, &local, &remote, ApplyOptions::default()).unwrap();

    assert_eq!(report.skipped_deletes, vec!["legacy".to_string()]);
    assert_eq!(remote.names(Kind::Teams), vec!["legacy"]);
}

#[test]
fn test_bulk_unsupported_fails_the_kind() {
    let remote = FakeRemote::new();
    let local = local_abc();
    let diff = diff_against(&remote, &local);

    let err = apply_bulk(
        &diff,
        &local.into_vec(),
        &remote,
        ApplyOptions::default(),
    )
    .unwrap_err();

    assert!(matches!(
        err,
        Error::Remote {
            kind: Kind::Policies,
            source: RemoteError::Unsupported
        }
    ));
}
