//! Key-level diff between two configuration snapshots.

use apogee_core::{ConfigurationChange, ConfigurationMap};

/// Computes the changes that turn `client` into `latest`.
///
/// A missing map is treated as empty. Every key only in `latest` is
/// reported as added with its latest value, every key only in `client` as
/// deleted, and every shared key whose value differs as modified. Values
/// are compared null-safely: two null values are equal. The order of the
/// returned changes is unspecified.
pub fn calc_configuration_changes(
    latest: Option<&ConfigurationMap>,
    client: Option<&ConfigurationMap>,
) -> Vec<ConfigurationChange> {
    let empty = ConfigurationMap::new();
    let latest = latest.unwrap_or(&empty);
    let client = client.unwrap_or(&empty);

    let mut changes = Vec::new();

    for (key, current) in latest {
        match client.get(key) {
            None => changes.push(ConfigurationChange::added(key.clone(), current.clone())),
            Some(previous) if previous != current => {
                changes.push(ConfigurationChange::modified(key.clone(), current.clone()));
            },
            Some(_) => {},
        }
    }

    changes.extend(
        client
            .keys()
            .filter(|key| !latest.contains_key(*key))
            .map(|key| ConfigurationChange::deleted(key.clone())),
    );

    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use apogee_core::ChangeType;

    fn configs(pairs: &[(&str, Option<&str>)]) -> ConfigurationMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.map(str::to_string)))
            .collect()
    }

    fn sorted(mut changes: Vec<ConfigurationChange>) -> Vec<ConfigurationChange> {
        changes.sort_by(|a, b| a.key().cmp(b.key()));
        changes
    }

    #[test]
    fn test_added_key() {
        let latest = configs(&[("key1", Some("value1")), ("key2", Some("value2"))]);
        let client = configs(&[("key1", Some("value1"))]);

        let changes = calc_configuration_changes(Some(&latest), Some(&client));

        assert_eq!(
            changes,
            vec![ConfigurationChange::added("key2", Some("value2".to_string()))]
        );
    }

    #[test]
    fn test_modified_key() {
        let latest = configs(&[("key1", Some("anotherValue1"))]);
        let client = configs(&[("key1", Some("value1"))]);

        let changes = calc_configuration_changes(Some(&latest), Some(&client));

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].key(), "key1");
        assert_eq!(changes[0].new_value(), Some("anotherValue1"));
        assert_eq!(changes[0].change_type(), ChangeType::Modified);
    }

    #[test]
    fn test_deleted_key() {
        let latest = ConfigurationMap::new();
        let client = configs(&[("key1", Some("value1"))]);

        let changes = calc_configuration_changes(Some(&latest), Some(&client));

        assert_eq!(changes, vec![ConfigurationChange::deleted("key1")]);
    }

    #[test]
    fn test_latest_missing_deletes_everything() {
        let client = configs(&[("key1", Some("value1"))]);

        let changes = calc_configuration_changes(None, Some(&client));

        assert_eq!(changes, vec![ConfigurationChange::deleted("key1")]);
    }

    #[test]
    fn test_client_missing_adds_everything() {
        let latest = configs(&[("key1", Some("value1"))]);

        let changes = calc_configuration_changes(Some(&latest), None);

        assert_eq!(
            changes,
            vec![ConfigurationChange::added("key1", Some("value1".to_string()))]
        );
    }

    #[test]
    fn test_both_missing_is_empty() {
        assert!(calc_configuration_changes(None, None).is_empty());
    }

    #[test]
    fn test_unchanged_values_emit_nothing() {
        let snapshot = configs(&[("a", Some("1")), ("b", None)]);

        let changes = calc_configuration_changes(Some(&snapshot), Some(&snapshot.clone()));

        assert!(changes.is_empty());
    }

    #[test]
    fn test_null_values_compare_safely() {
        let latest = configs(&[("a", None), ("b", Some("x"))]);
        let client = configs(&[("a", Some("1")), ("b", None)]);

        let changes = sorted(calc_configuration_changes(Some(&latest), Some(&client)));

        assert_eq!(
            changes,
            vec![
                ConfigurationChange::modified("a", None),
                ConfigurationChange::modified("b", Some("x".to_string())),
            ]
        );
    }

    #[test]
    fn test_keys_are_case_sensitive() {
        let latest = configs(&[("Key", Some("v"))]);
        let client = configs(&[("key", Some("v"))]);

        let changes = sorted(calc_configuration_changes(Some(&latest), Some(&client)));

        assert_eq!(
            changes,
            vec![
                ConfigurationChange::added("Key", Some("v".to_string())),
                ConfigurationChange::deleted("key"),
            ]
        );
    }

    #[test]
    fn test_mixed_transition() {
        let client = configs(&[("k1", Some("v1")), ("k2", Some("v2"))]);
        let latest = configs(&[("k1", Some("v1-new")), ("k3", Some("v3"))]);

        let changes = sorted(calc_configuration_changes(Some(&latest), Some(&client)));

        assert_eq!(
            changes,
            vec![
                ConfigurationChange::modified("k1", Some("v1-new".to_string())),
                ConfigurationChange::deleted("k2"),
                ConfigurationChange::added("k3", Some("v3".to_string())),
            ]
        );
    }
}
