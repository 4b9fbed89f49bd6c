//! Tests for the PolicySyncEngine

use policy_core::{
    CopyNotice, CopyOptions, CopyRequest, CopyStage, Error, FailurePolicy, PolicyName,
    PolicySyncEngine, StoreError,
};
use policy_test_utils::MemoryPolicyStore;
use pretty_assertions::assert_eq;

const ALLOW_READ: &str = "path \"secret/*\" {\n  capabilities = [\"read\"]\n}\n";
const ALLOW_WRITE: &str = "path \"secret/*\" {\n  capabilities = [\"create\", \"update\"]\n}\n";

fn name(value: &str) -> PolicyName {
    PolicyName::new(value).unwrap()
}

fn abc_source() -> MemoryPolicyStore {
    MemoryPolicyStore::with_policies([("a", "rules-a"), ("b", "rules-b"), ("c", "rules-c")])
}

#[test]
fn test_copy_all_skips_root_and_copies_the_rest() {
    let source = MemoryPolicyStore::with_policies([
        ("root", ""),
        ("allow_read", ALLOW_READ),
        ("allow_write", ALLOW_WRITE),
    ]);
    let destination = MemoryPolicyStore::with_policies([("root", "destination-root")]);

    let engine = PolicySyncEngine::new(&source, &destination);
    let mut notices: Vec<CopyNotice> = Vec::new();
    let report = engine
        .copy_all(&mut |notice: &CopyNotice| notices.push(notice.clone()))
        .unwrap();

    assert_eq!(destination.rules("allow_read").as_deref(), Some(ALLOW_READ));
    assert_eq!(destination.rules("allow_write").as_deref(), Some(ALLOW_WRITE));
    assert_eq!(destination.rules("root").as_deref(), Some("destination-root"));
    assert_eq!(destination.put_names(), vec!["allow_read", "allow_write"]);

    assert_eq!(notices.len(), 2);
    assert_eq!(notices[0].source_name, name("allow_read"));
    assert_eq!(notices[0].dest_name, name("allow_read"));
    assert_eq!(notices[0].ruleset.as_str(), ALLOW_READ);

    assert_eq!(report.skipped, vec![name("root")]);
    assert_eq!(report.listed.len(), 3);
    assert_eq!(
        report.written_names(),
        vec![&name("allow_read"), &name("allow_write")]
    );
}

#[test]
fn test_copy_all_never_reads_root() {
    let source = MemoryPolicyStore::with_policies([("default", "d"), ("root", "")]);
    let destination = MemoryPolicyStore::new();

    PolicySyncEngine::new(&source, &destination)
        .copy_all(&mut |_: &CopyNotice| {})
        .unwrap();

    assert_eq!(source.get_names(), vec!["default"]);
}

#[test]
fn test_copy_one_renames_and_overwrites_existing_destination() {
    let source = MemoryPolicyStore::with_policies([("allow_read", ALLOW_READ)]);
    let destination = MemoryPolicyStore::with_policies([("allow_read_copy", "stale rules")]);

    let engine = PolicySyncEngine::new(&source, &destination);
    let copied = engine
        .copy_one(&name("allow_read"), &name("allow_read_copy"), &mut |_: &CopyNotice| {})
        .unwrap();

    assert_eq!(copied.source_name, name("allow_read"));
    assert_eq!(copied.dest_name, name("allow_read_copy"));
    assert_eq!(
        destination.rules("allow_read_copy").as_deref(),
        Some(ALLOW_READ)
    );
    assert!(!destination.contains("allow_read"));
}

#[test]
fn test_copy_one_twice_leaves_same_state() {
    let source = MemoryPolicyStore::with_policies([("allow_read", ALLOW_READ)]);
    let destination = MemoryPolicyStore::new();
    let engine = PolicySyncEngine::new(&source, &destination);

    engine
        .copy_one(&name("allow_read"), &name("allow_read"), &mut |_: &CopyNotice| {})
        .unwrap();
    let after_first = destination.snapshot();

    engine
        .copy_one(&name("allow_read"), &name("allow_read"), &mut |_: &CopyNotice| {})
        .unwrap();

    assert_eq!(destination.snapshot(), after_first);
}

#[test]
fn test_copy_one_to_root_is_rejected_without_touching_stores() {
    let source = MemoryPolicyStore::with_policies([("allow_read", ALLOW_READ)]);
    let destination = MemoryPolicyStore::with_policies([("root", "destination-root")]);

    let engine = PolicySyncEngine::new(&source, &destination);
    let mut notices = 0;
    let error = engine
        .copy_one(&name("allow_read"), &name("root"), &mut |_: &CopyNotice| {
            notices += 1
        })
        .unwrap_err();

    assert!(matches!(
        error,
        Error::Write {
            source: StoreError::Reserved { .. },
            ..
        }
    ));
    assert_eq!(error.policy_name(), Some(&name("root")));
    assert_eq!(notices, 0);
    assert!(source.get_names().is_empty());
    assert!(destination.puts().is_empty());
    assert_eq!(destination.rules("root").as_deref(), Some("destination-root"));
}

#[test]
fn test_copy_one_may_read_root_from_source() {
    let source = MemoryPolicyStore::with_policies([("root", "")]);
    let destination = MemoryPolicyStore::new();

    let copied = PolicySyncEngine::new(&source, &destination)
        .copy_one(&name("root"), &name("root_copy"), &mut |_: &CopyNotice| {})
        .unwrap();

    assert_eq!(copied.dest_name, name("root_copy"));
    assert!(destination.contains("root_copy"));
}

#[test]
fn test_copy_one_missing_source_is_read_error() {
    let source = MemoryPolicyStore::new();
    let destination = MemoryPolicyStore::new();

    let error = PolicySyncEngine::new(&source, &destination)
        .copy_one(&name("missing"), &name("missing"), &mut |_: &CopyNotice| {})
        .unwrap_err();

    assert_eq!(error.stage(), Some(CopyStage::Read));
    assert!(matches!(
        error,
        Error::Read {
            source: StoreError::NotFound { .. },
            ..
        }
    ));
    assert!(destination.puts().is_empty());
}

#[test]
fn test_copy_all_fail_fast_on_write() {
    let source = abc_source();
    let destination = MemoryPolicyStore::new();
    destination.fail_put("b");

    let error = PolicySyncEngine::new(&source, &destination)
        .copy_all(&mut |_: &CopyNotice| {})
        .unwrap_err();

    assert_eq!(error.stage(), Some(CopyStage::Write));
    assert_eq!(error.policy_name(), Some(&name("b")));
    assert!(destination.contains("a"));
    assert!(!destination.contains("b"));
    assert!(!destination.contains("c"));
    assert_eq!(source.get_names(), vec!["a", "b"]);
}

#[test]
fn test_copy_all_fail_fast_on_read() {
    let source = abc_source();
    source.fail_get("b");
    let destination = MemoryPolicyStore::new();

    let error = PolicySyncEngine::new(&source, &destination)
        .copy_all(&mut |_: &CopyNotice| {})
        .unwrap_err();

    assert_eq!(error.stage(), Some(CopyStage::Read));
    assert_eq!(error.policy_name(), Some(&name("b")));
    assert_eq!(destination.put_names(), vec!["a"]);
}

#[test]
fn test_copy_all_continue_collects_failures() {
    let source = abc_source();
    source.fail_get("a");
    let destination = MemoryPolicyStore::new();
    destination.fail_put("b");

    let engine = PolicySyncEngine::new(&source, &destination).with_options(CopyOptions {
        failure_policy: FailurePolicy::Continue,
        ..CopyOptions::default()
    });
    let error = engine.copy_all(&mut |_: &CopyNotice| {}).unwrap_err();

    let (failures, attempted) = match error {
        Error::Incomplete {
            failures,
            attempted,
        } => (failures, attempted),
        other => panic!("expected Incomplete, got {other:?}"),
    };
    assert_eq!(attempted, 3);
    assert_eq!(failures.len(), 2);
    assert_eq!(failures[0].policy_name(), Some(&name("a")));
    assert_eq!(failures[0].stage(), Some(CopyStage::Read));
    assert_eq!(failures[1].policy_name(), Some(&name("b")));
    assert_eq!(failures[1].stage(), Some(CopyStage::Write));
    assert_eq!(destination.put_names(), vec!["c"]);
}

#[test]
fn test_copy_all_continue_without_failures_succeeds() {
    let source = abc_source();
    let destination = MemoryPolicyStore::new();

    let report = PolicySyncEngine::new(&source, &destination)
        .with_options(CopyOptions {
            failure_policy: FailurePolicy::Continue,
            ..CopyOptions::default()
        })
        .copy_all(&mut |_: &CopyNotice| {})
        .unwrap();

    assert_eq!(report.copied.len(), 3);
}

#[test]
fn test_copy_all_list_failure() {
    let source = abc_source();
    source.fail_list();
    let destination = MemoryPolicyStore::new();

    let error = PolicySyncEngine::new(&source, &destination)
        .copy_all(&mut |_: &CopyNotice| {})
        .unwrap_err();

    assert!(matches!(error, Error::List { .. }));
    assert!(source.get_names().is_empty());
    assert!(destination.puts().is_empty());
}

#[test]
fn test_dry_run_reads_and_reports_without_writing() {
    let source = abc_source();
    let destination = MemoryPolicyStore::new();

    let engine = PolicySyncEngine::new(&source, &destination).with_options(CopyOptions {
        dry_run: true,
        ..CopyOptions::default()
    });
    let mut notices: Vec<CopyNotice> = Vec::new();
    let report = engine
        .copy_all(&mut |notice: &CopyNotice| notices.push(notice.clone()))
        .unwrap();

    assert!(report.dry_run);
    assert_eq!(report.copied.len(), 3);
    assert!(notices.iter().all(|notice| notice.dry_run));
    assert!(destination.puts().is_empty());
    assert_eq!(source.get_names(), vec!["a", "b", "c"]);
}

#[test]
fn test_execute_dispatches_requests() {
    let source = abc_source();
    let destination = MemoryPolicyStore::new();
    let engine = PolicySyncEngine::new(&source, &destination);

    let single = engine
        .execute(
            &CopyRequest::Single {
                source_name: name("a"),
                dest_name: name("a2"),
            },
            &mut |_: &CopyNotice| {},
        )
        .unwrap();
    assert!(single.listed.is_empty());
    assert_eq!(single.written_names(), vec![&name("a2")]);

    let all = engine
        .execute(&CopyRequest::All, &mut |_: &CopyNotice| {})
        .unwrap();
    assert_eq!(all.copied.len(), 3);
    assert_eq!(destination.put_names(), vec!["a2", "a", "b", "c"]);
}

#[test]
fn test_copy_report_serializes() {
    let source = MemoryPolicyStore::with_policies([("root", ""), ("a", "rules-a")]);
    let destination = MemoryPolicyStore::new();

    let report = PolicySyncEngine::new(&source, &destination)
        .copy_all(&mut |_: &CopyNotice| {})
        .unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["skipped"], serde_json::json!(["root"]));
    assert_eq!(json["copied"][0]["dest_name"], "a");
    assert_eq!(json["copied"][0]["ruleset"], "rules-a");
}
