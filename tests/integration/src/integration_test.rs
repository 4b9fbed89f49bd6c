//! End-to-end integration test for the copy flow
//!
//! This test exercises the complete library path: environment snapshot ->
//! endpoint resolution -> Vault clients -> sync engine, against two fake
//! Vault servers.

use policy_core::{
    ConfigSnapshot, CopyNotice, CopyOptions, CopyRequest, Endpoint, EndpointResolver, Error,
    PolicyName, PolicyStore, PolicySyncEngine,
};
use policy_test_utils::FakeVault;
use policy_vault::VaultClient;
use pretty_assertions::assert_eq;

const SOURCE_TOKEN: &str = "s.source";
const DESTINATION_TOKEN: &str = "s.destination";

const ALLOW_READ: &str = r#"path "secret/data/*" {
  capabilities = ["read", "list"]
}
"#;

const ALLOW_WRITE: &str = r#"path "secret/data/*" {
  capabilities = ["create", "update"]
}
"#;

/// Set up a source holding root plus two policies, and an empty destination
fn setup_vaults() -> (FakeVault, FakeVault) {
    let source = FakeVault::with_policies(
        SOURCE_TOKEN,
        [
            ("root", ""),
            ("allow_read", ALLOW_READ),
            ("allow_write", ALLOW_WRITE),
        ],
    );
    let destination = FakeVault::start(DESTINATION_TOKEN);
    (source, destination)
}

fn clients_for(source: &FakeVault, destination: &FakeVault) -> (VaultClient, VaultClient) {
    let snapshot = ConfigSnapshot::from_pairs([
        ("SOURCE_VAULT_ADDR", source.address()),
        ("SOURCE_VAULT_TOKEN", SOURCE_TOKEN),
        ("DESTINATION_VAULT_ADDR", destination.address()),
        ("DESTINATION_VAULT_TOKEN", DESTINATION_TOKEN),
        ("VAULT_ADDR", "http://unrelated.invalid:8200"),
    ]);
    let resolver = EndpointResolver::new(&snapshot);
    let (source_config, destination_config) = resolver.resolve_pair();

    assert_eq!(source_config.address(), source.address());
    assert_eq!(
        resolver.resolve_endpoint(Endpoint::Destination),
        destination_config
    );

    (
        VaultClient::new(&source_config).unwrap(),
        VaultClient::new(&destination_config).unwrap(),
    )
}

#[test]
fn test_bulk_copy_between_vaults() {
    let (source, destination) = setup_vaults();
    let (source_client, destination_client) = clients_for(&source, &destination);

    let mut notices = Vec::new();
    let report = PolicySyncEngine::new(&source_client, &destination_client)
        .execute(&CopyRequest::All, &mut |n: &CopyNotice| {
            notices.push(n.clone())
        })
        .unwrap();

    assert_eq!(notices.len(), 2);
    assert_eq!(notices[0].source_name.as_str(), "allow_read");
    assert_eq!(notices[1].ruleset.as_str(), ALLOW_WRITE);
    assert_eq!(report.skipped, vec![PolicyName::new("root").unwrap()]);

    assert_eq!(destination.put_names(), vec!["allow_read", "allow_write"]);
    assert_eq!(destination.rules("allow_read").as_deref(), Some(ALLOW_READ));
    assert_eq!(destination.rules("allow_write").as_deref(), Some(ALLOW_WRITE));

    // Source requests use the source token only
    assert!(
        source
            .requests()
            .iter()
            .all(|r| r.token.as_deref() == Some(SOURCE_TOKEN))
    );
    assert!(
        destination
            .requests()
            .iter()
            .all(|r| r.token.as_deref() == Some(DESTINATION_TOKEN))
    );
}

#[test]
fn test_bulk_copy_is_idempotent() {
    let (source, destination) = setup_vaults();
    let (source_client, destination_client) = clients_for(&source, &destination);
    let engine = PolicySyncEngine::new(&source_client, &destination_client);

    engine
        .execute(&CopyRequest::All, &mut |_: &CopyNotice| {})
        .unwrap();
    let first = destination_client.list_policies().unwrap();
    engine
        .execute(&CopyRequest::All, &mut |_: &CopyNotice| {})
        .unwrap();
    let second = destination_client.list_policies().unwrap();

    assert_eq!(first, second);
    assert_eq!(destination.rules("allow_read").as_deref(), Some(ALLOW_READ));
}

#[test]
fn test_single_copy_with_rename() {
    let (source, destination) = setup_vaults();
    destination.insert("allow_read_copy", "outdated");
    let (source_client, destination_client) = clients_for(&source, &destination);

    let request = CopyRequest::Single {
        source_name: PolicyName::new("allow_read").unwrap(),
        dest_name: PolicyName::new("allow_read_copy").unwrap(),
    };
    let report = PolicySyncEngine::new(&source_client, &destination_client)
        .execute(&request, &mut |_: &CopyNotice| {})
        .unwrap();

    assert_eq!(report.copied.len(), 1);
    assert_eq!(
        destination.rules("allow_read_copy").as_deref(),
        Some(ALLOW_READ)
    );
    assert_eq!(destination.policy_names(), vec!["allow_read_copy"]);
}

#[test]
fn test_fail_fast_keeps_earlier_writes() {
    let (source, destination) = setup_vaults();
    destination.fail_put("allow_write");
    let (source_client, destination_client) = clients_for(&source, &destination);

    let error = PolicySyncEngine::new(&source_client, &destination_client)
        .with_options(CopyOptions::default())
        .execute(&CopyRequest::All, &mut |_: &CopyNotice| {})
        .unwrap_err();

    match error {
        Error::Write { name, .. } => assert_eq!(name.as_str(), "allow_write"),
        other => panic!("expected write error, got {other:?}"),
    }
    assert_eq!(destination.policy_names(), vec!["allow_read"]);
}

#[test]
fn test_report_serializes_for_tooling() {
    let (source, destination) = setup_vaults();
    let (source_client, destination_client) = clients_for(&source, &destination);

    let report = PolicySyncEngine::new(&source_client, &destination_client)
        .execute(&CopyRequest::All, &mut |_: &CopyNotice| {})
        .unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["dry_run"], serde_json::json!(false));
    assert_eq!(json["skipped"], serde_json::json!(["root"]));
    assert_eq!(json["copied"].as_array().map(Vec::len), Some(2));
}
