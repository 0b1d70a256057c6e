//! Background audit worker.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use apogee_core::{InstanceIdentity, NewInstanceConfig};
use chrono::{DateTime, TimeDelta, Utc};
use futures::FutureExt;
use metrics::counter;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info};

use crate::caches::AuditCaches;
use crate::error::AuditError;
use crate::event::AuditReportEvent;
use crate::keys::InstanceConfigKey;
use crate::stats::AuditStats;
use crate::store::{InsertOutcome, InstanceStore};

/// What processing one event did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditOutcome {
    /// The release-key cache already held this release; nothing was read.
    CacheHit,
    /// Storage already held this release and was modified recently.
    Fresh,
    /// A new release state row was inserted.
    Created,
    /// The stored release key changed.
    Updated,
    /// Only the last-modified time was refreshed.
    Touched,
    /// Another writer inserted the same row first.
    CreateRaced,
}

impl AuditOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CacheHit => "cache_hit",
            Self::Fresh => "fresh",
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Touched => "touched",
            Self::CreateRaced => "create_raced",
        }
    }
}

/// Registra las descripciones de las metricas del pipeline de auditoria.
pub fn register_audit_metrics() {
    metrics::describe_counter!(
        "apogee_audit_reports_total",
        "Instance reports offered to the audit queue, by result"
    );
    metrics::describe_counter!(
        "apogee_audit_events_total",
        "Audit events processed, by outcome"
    );
    metrics::describe_counter!(
        "apogee_audit_failures_total",
        "Audit events dropped because processing failed"
    );
}

/// Drains the audit queue into storage.
///
/// Exactly one worker runs per auditor, so writes for the same
/// (instance, namespace) never race inside a process.
pub struct AuditWorker {
    store: Arc<dyn InstanceStore>,
    caches: Arc<AuditCaches>,
    stats: Arc<AuditStats>,
    freshness_threshold: TimeDelta,
}

impl AuditWorker {
    pub fn new(
        store: Arc<dyn InstanceStore>,
        caches: Arc<AuditCaches>,
        stats: Arc<AuditStats>,
        freshness_threshold: Duration,
    ) -> Self {
        Self {
            store,
            caches,
            stats,
            freshness_threshold: TimeDelta::from_std(freshness_threshold)
                .unwrap_or(TimeDelta::MAX),
        }
    }

    /// Runs the worker loop until shutdown is signalled or the queue closes.
    ///
    /// Events still queued at shutdown are dropped.
    pub async fn run(
        self,
        mut receiver: mpsc::Receiver<AuditReportEvent>,
        mut shutdown_rx: watch::Receiver<bool>,
    ) {
        info!(store = %self.store.name(), "Starting instance audit worker");

        // A stop sent before the worker subscribed is not seen by `changed`.
        let mut stopped = *shutdown_rx.borrow_and_update();

        while !stopped {
            tokio::select! {
                biased;

                result = shutdown_rx.changed() => {
                    if result.is_err() || *shutdown_rx.borrow() {
                        stopped = true;
                    }
                }
                event = receiver.recv() => match event {
                    Some(event) => self.handle(event).await,
                    None => stopped = true,
                },
            }
        }

        receiver.close();
        info!(
            dropped = receiver.len(),
            "Instance audit worker shutting down"
        );
    }

    /// Processes one event, containing every failure.
    async fn handle(&self, event: AuditReportEvent) {
        match AssertUnwindSafe(self.process(&event)).catch_unwind().await {
            Ok(Ok(outcome)) => {
                self.stats.record_outcome(outcome);
                counter!("apogee_audit_events_total", "outcome" => outcome.as_str()).increment(1);
            },
            Ok(Err(e)) => {
                self.stats.record_failure();
                counter!("apogee_audit_failures_total").increment(1);
                error!(
                    instance = %event.instance,
                    namespace = %event.namespace,
                    release_key = %event.release_key,
                    error = %e,
                    "Failed to audit instance config"
                );
            },
            Err(_) => {
                self.stats.record_failure();
                counter!("apogee_audit_failures_total").increment(1);
                error!(
                    instance = %event.instance,
                    namespace = %event.namespace,
                    "Instance audit panicked"
                );
            },
        }
    }

    /// Converges one report into storage.
    pub async fn process(&self, event: &AuditReportEvent) -> Result<AuditOutcome, AuditError> {
        let instance_id = self.resolve_instance_id(&event.instance).await?;

        let key = InstanceConfigKey::new(
            instance_id,
            &event.namespace.app_id,
            &event.namespace.namespace_name,
        );
        if self.caches.release_key(&key).await.as_deref() == Some(event.release_key.as_str()) {
            return Ok(AuditOutcome::CacheHit);
        }
        self.caches
            .put_release_key(key, event.release_key.clone())
            .await;

        let existing = self
            .store
            .find_instance_config(
                instance_id,
                &event.namespace.app_id,
                &event.namespace.namespace_name,
            )
            .await?;

        if let Some(mut config) = existing {
            let outcome = if config.release_key != event.release_key {
                config.config_cluster_name = event.namespace.cluster_name.clone();
                config.release_key = event.release_key.clone();
                config.release_delivery_time = event.offered_at;
                AuditOutcome::Updated
            } else if self.close_enough(event.offered_at, config.last_modified_time) {
                return Ok(AuditOutcome::Fresh);
            } else {
                AuditOutcome::Touched
            };

            config.last_modified_time = event.offered_at;
            self.store.update_instance_config(&config).await?;
            debug!(
                instance_id,
                namespace = %event.namespace,
                release_key = %event.release_key,
                outcome = outcome.as_str(),
                "Instance config persisted"
            );
            return Ok(outcome);
        }

        let config = NewInstanceConfig::first_delivery(
            instance_id,
            &event.namespace,
            event.release_key.clone(),
            event.offered_at,
        );
        match self.store.create_instance_config(config).await? {
            InsertOutcome::Created(_) => {
                debug!(
                    instance_id,
                    namespace = %event.namespace,
                    release_key = %event.release_key,
                    "Instance config created"
                );
                Ok(AuditOutcome::Created)
            },
            InsertOutcome::AlreadyExists => Ok(AuditOutcome::CreateRaced),
        }
    }

    /// Returns the storage id of an instance, creating the row on first sight.
    async fn resolve_instance_id(&self, identity: &InstanceIdentity) -> Result<i64, AuditError> {
        if let Some(id) = self.caches.instance_id(identity).await {
            return Ok(id);
        }

        let id = match self.store.find_instance(identity).await? {
            Some(instance) => instance.id,
            None => match self.store.create_instance(identity).await? {
                InsertOutcome::Created(instance) => instance.id,
                InsertOutcome::AlreadyExists => {
                    debug!(instance = %identity, "Instance created concurrently, re-reading");
                    self.store
                        .find_instance(identity)
                        .await?
                        .ok_or_else(|| AuditError::InstanceVanished {
                            instance: identity.to_string(),
                        })?
                        .id
                },
            },
        };

        self.caches.put_instance_id(identity.clone(), id).await;
        Ok(id)
    }

    fn close_enough(&self, offered_at: DateTime<Utc>, last_modified: DateTime<Utc>) -> bool {
        offered_at - last_modified < self.freshness_threshold
    }
}
