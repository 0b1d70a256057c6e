//! Shared service components.

use std::sync::Arc;

use apogee_audit::{InstanceStateAuditor, InstanceStore};
use apogee_sync::{ChangeDiffCache, IncrementalSyncService};
use tracing::info;

use crate::settings::Settings;

/// The long-lived components every request handler shares.
///
/// Cloning is cheap; all clones share the same caches and audit worker.
#[derive(Clone)]
pub struct ConfigServiceCore {
    diff_cache: Arc<ChangeDiffCache>,
    auditor: Arc<InstanceStateAuditor>,
}

impl ConfigServiceCore {
    /// Builds both components from `settings` and starts the audit worker.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn bootstrap(settings: &Settings, store: Arc<dyn InstanceStore>) -> Self {
        let diff_cache = Arc::new(ChangeDiffCache::new(settings.diff_cache.clone()));

        let store_name = store.name().to_string();
        let auditor = Arc::new(InstanceStateAuditor::new(settings.audit.clone(), store));
        auditor.start();

        info!(
            store = %store_name,
            diff_cache_capacity = settings.diff_cache.max_capacity,
            "Config service components ready"
        );

        Self {
            diff_cache,
            auditor,
        }
    }

    /// The incremental sync service, as the request layer consumes it.
    pub fn sync_service(&self) -> Arc<dyn IncrementalSyncService> {
        self.diff_cache.clone()
    }

    pub fn diff_cache(&self) -> &ChangeDiffCache {
        &self.diff_cache
    }

    pub fn auditor(&self) -> &InstanceStateAuditor {
        &self.auditor
    }

    /// Stops the audit worker and waits for it. Queued reports are dropped.
    pub async fn shutdown(&self) {
        self.auditor.shutdown().await;
        info!("Config service components stopped");
    }
}
