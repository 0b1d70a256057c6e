use std::sync::Arc;
use std::time::Duration;

use apogee_audit::InMemoryInstanceStore;
use apogee_core::{ChangeType, ConfigNamespace, ConfigurationMap, InstanceIdentity};
use apogee_server::{ConfigServiceCore, Settings};

fn configs(pairs: &[(&str, &str)]) -> ConfigurationMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), Some(v.to_string())))
        .collect()
}

#[tokio::test]
async fn test_bootstrap_serves_diffs_and_audits() {
    let store = Arc::new(InMemoryInstanceStore::new());
    let core = ConfigServiceCore::bootstrap(&Settings::default(), store.clone());
    assert!(core.auditor().is_running());

    let client = configs(&[("k1", "v1"), ("k2", "v2")]);
    let latest = configs(&[("k1", "v1"), ("k3", "v3")]);
    let changes = core.sync_service().get_configuration_changes(
        "r2",
        Some(&latest),
        "r1",
        Some(&client),
    );
    assert_eq!(changes.len(), 2);
    assert!(
        changes
            .iter()
            .any(|c| c.key() == "k2" && c.change_type() == ChangeType::Deleted)
    );

    let accepted = core.auditor().audit(
        InstanceIdentity::new("orders", "default", None, "10.0.0.7"),
        ConfigNamespace::new("orders", "default", "application"),
        "r2",
    );
    assert!(accepted);

    tokio::time::timeout(Duration::from_secs(5), async {
        while core.auditor().stats().completed() < 1 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();
    assert_eq!(store.instance_config_count(), 1);

    core.shutdown().await;
    assert!(!core.auditor().is_running());
}

#[tokio::test]
async fn test_clones_share_components() {
    let core = ConfigServiceCore::bootstrap(
        &Settings::default(),
        Arc::new(InMemoryInstanceStore::new()),
    );
    let clone = core.clone();

    let latest = configs(&[("k1", "v1")]);
    let first = core.diff_cache().get_changes("r2", Some(&latest), "r1", None);
    let second = clone
        .sync_service()
        .get_configuration_changes("r2", None, "r1", None);
    assert!(Arc::ptr_eq(&first, &second));

    clone.shutdown().await;
    assert!(!core.auditor().is_running());
}
