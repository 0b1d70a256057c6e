//! Cache key for per-namespace release state.

use std::fmt;

/// Key del cache de release keys: una entrada por (instance, app, namespace).
///
/// The config cluster is deliberately not part of the key: an instance has
/// one recorded release per app namespace whichever cluster served it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstanceConfigKey {
    instance_id: i64,
    config_app_id: String,
    config_namespace: String,
}

impl InstanceConfigKey {
    pub fn new(
        instance_id: i64,
        config_app_id: impl Into<String>,
        config_namespace: impl Into<String>,
    ) -> Self {
        Self {
            instance_id,
            config_app_id: config_app_id.into(),
            config_namespace: config_namespace.into(),
        }
    }

    pub fn instance_id(&self) -> i64 {
        self.instance_id
    }

    pub fn config_app_id(&self) -> &str {
        &self.config_app_id
    }

    pub fn config_namespace(&self) -> &str {
        &self.config_namespace
    }
}

impl fmt::Display for InstanceConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}+{}+{}",
            self.instance_id, self.config_app_id, self.config_namespace
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_display() {
        let key = InstanceConfigKey::new(42, "orders", "application");
        assert_eq!(key.to_string(), "42+orders+application");
    }

    #[test]
    fn test_key_accessors() {
        let key = InstanceConfigKey::new(7, "app", "ns");

        assert_eq!(key.instance_id(), 7);
        assert_eq!(key.config_app_id(), "app");
        assert_eq!(key.config_namespace(), "ns");
    }

    #[test]
    fn test_key_hash() {
        use std::collections::HashSet;

        let mut set = HashSet::new();
        set.insert(InstanceConfigKey::new(1, "app", "ns"));

        assert!(set.contains(&InstanceConfigKey::new(1, "app", "ns")));
        assert!(!set.contains(&InstanceConfigKey::new(2, "app", "ns")));
        assert!(!set.contains(&InstanceConfigKey::new(1, "app", "NS")));
    }
}
