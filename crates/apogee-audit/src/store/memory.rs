//! In-memory instance store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use apogee_core::{Instance, InstanceConfig, InstanceIdentity, NewInstanceConfig};
use async_trait::async_trait;
use parking_lot::RwLock;

use super::{InsertOutcome, InstanceStore};
use crate::error::StoreError;

type ConfigKey = (i64, String, String);

#[derive(Debug, Default)]
struct Tables {
    instances: HashMap<InstanceIdentity, Instance>,
    configs: HashMap<ConfigKey, InstanceConfig>,
    next_instance_id: i64,
    next_config_id: i64,
}

/// An [`InstanceStore`] backed by hash maps.
///
/// Enforces the same uniqueness constraints as a relational store and
/// counts every write, which makes it the store of choice for tests and
/// single-node setups. [`set_unavailable`](Self::set_unavailable) simulates
/// an outage.
#[derive(Debug, Default)]
pub struct InMemoryInstanceStore {
    tables: RwLock<Tables>,
    unavailable: AtomicBool,
    instance_inserts: AtomicU64,
    config_inserts: AtomicU64,
    config_updates: AtomicU64,
}

impl InMemoryInstanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail with [`StoreError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of instance rows.
    pub fn instance_count(&self) -> usize {
        self.tables.read().instances.len()
    }

    /// Number of instance config rows.
    pub fn instance_config_count(&self) -> usize {
        self.tables.read().configs.len()
    }

    /// Returns the stored release state, bypassing availability checks.
    pub fn instance_config(
        &self,
        instance_id: i64,
        config_app_id: &str,
        config_namespace_name: &str,
    ) -> Option<InstanceConfig> {
        let key = (
            instance_id,
            config_app_id.to_string(),
            config_namespace_name.to_string(),
        );
        self.tables.read().configs.get(&key).cloned()
    }

    /// Returns the stored instance, bypassing availability checks.
    pub fn instance(&self, identity: &InstanceIdentity) -> Option<Instance> {
        self.tables.read().instances.get(identity).cloned()
    }

    /// Successful instance inserts.
    pub fn instance_inserts(&self) -> u64 {
        self.instance_inserts.load(Ordering::Relaxed)
    }

    /// Successful instance config inserts.
    pub fn config_inserts(&self) -> u64 {
        self.config_inserts.load(Ordering::Relaxed)
    }

    /// Successful instance config updates.
    pub fn config_updates(&self) -> u64 {
        self.config_updates.load(Ordering::Relaxed)
    }

    /// All successful instance config writes.
    pub fn config_writes(&self) -> u64 {
        self.config_inserts() + self.config_updates()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("in-memory store switched off"));
        }
        Ok(())
    }
}

#[async_trait]
impl InstanceStore for InMemoryInstanceStore {
    async fn find_instance(
        &self,
        identity: &InstanceIdentity,
    ) -> Result<Option<Instance>, StoreError> {
        self.check_available()?;
        Ok(self.instance(identity))
    }

    async fn create_instance(
        &self,
        identity: &InstanceIdentity,
    ) -> Result<InsertOutcome<Instance>, StoreError> {
        self.check_available()?;

        let mut tables = self.tables.write();
        if tables.instances.contains_key(identity) {
            return Ok(InsertOutcome::AlreadyExists);
        }

        tables.next_instance_id += 1;
        let instance = Instance {
            id: tables.next_instance_id,
            identity: identity.clone(),
        };
        tables.instances.insert(identity.clone(), instance.clone());
        self.instance_inserts.fetch_add(1, Ordering::Relaxed);

        Ok(InsertOutcome::Created(instance))
    }

    async fn find_instance_config(
        &self,
        instance_id: i64,
        config_app_id: &str,
        config_namespace_name: &str,
    ) -> Result<Option<InstanceConfig>, StoreError> {
        self.check_available()?;
        Ok(self.instance_config(instance_id, config_app_id, config_namespace_name))
    }

    async fn create_instance_config(
        &self,
        config: NewInstanceConfig,
    ) -> Result<InsertOutcome<InstanceConfig>, StoreError> {
        self.check_available()?;

        let key = (
            config.instance_id,
            config.config_app_id.clone(),
            config.config_namespace_name.clone(),
        );

        let mut tables = self.tables.write();
        if tables.configs.contains_key(&key) {
            return Ok(InsertOutcome::AlreadyExists);
        }

        tables.next_config_id += 1;
        let row = config.with_id(tables.next_config_id);
        tables.configs.insert(key, row.clone());
        self.config_inserts.fetch_add(1, Ordering::Relaxed);

        Ok(InsertOutcome::Created(row))
    }

    async fn update_instance_config(&self, config: &InstanceConfig) -> Result<(), StoreError> {
        self.check_available()?;

        let key = (
            config.instance_id,
            config.config_app_id.clone(),
            config.config_namespace_name.clone(),
        );

        let mut tables = self.tables.write();
        match tables.configs.get_mut(&key) {
            Some(existing) if existing.id == config.id => {
                *existing = config.clone();
                self.config_updates.fetch_add(1, Ordering::Relaxed);
                Ok(())
            },
            _ => Err(StoreError::InstanceConfigNotFound { id: config.id }),
        }
    }

    fn name(&self) -> &str {
        "in-memory"
    }
}
