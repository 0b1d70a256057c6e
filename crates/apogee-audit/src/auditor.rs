//! The instance audit entry point.

use std::sync::Arc;

use apogee_core::{ConfigNamespace, InstanceIdentity};
use metrics::counter;
use mockable::{Clock, DefaultClock};
use parking_lot::Mutex;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::caches::AuditCaches;
use crate::config::AuditConfig;
use crate::event::AuditReportEvent;
use crate::stats::AuditStats;
use crate::store::InstanceStore;
use crate::worker::AuditWorker;

/// Records which release every client instance runs.
///
/// [`audit`](Self::audit) is safe to call from any number of threads and
/// never blocks or touches storage: it stamps the report and offers it to a
/// bounded queue. A single worker task, spawned by [`start`](Self::start),
/// drains the queue.
///
/// Delivery is best effort. Reports are dropped when the queue is full, and
/// whatever is still queued at shutdown is discarded.
pub struct InstanceStateAuditor {
    sender: mpsc::Sender<AuditReportEvent>,
    receiver: Mutex<Option<mpsc::Receiver<AuditReportEvent>>>,
    shutdown_tx: watch::Sender<bool>,
    worker: Mutex<Option<JoinHandle<()>>>,
    store: Arc<dyn InstanceStore>,
    caches: Arc<AuditCaches>,
    stats: Arc<AuditStats>,
    clock: Arc<dyn Clock>,
    config: AuditConfig,
}

impl InstanceStateAuditor {
    /// Creates an auditor stamping reports with the system clock.
    ///
    /// Nothing is processed until [`start`](Self::start) is called; reports
    /// offered before that wait in the queue.
    pub fn new(config: AuditConfig, store: Arc<dyn InstanceStore>) -> Self {
        Self::with_clock(config, store, Arc::new(DefaultClock))
    }

    /// Creates an auditor stamping reports with the given clock.
    pub fn with_clock(
        config: AuditConfig,
        store: Arc<dyn InstanceStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (sender, receiver) = mpsc::channel(config.queue_capacity.max(1));
        let (shutdown_tx, _) = watch::channel(false);

        Self {
            sender,
            receiver: Mutex::new(Some(receiver)),
            shutdown_tx,
            worker: Mutex::new(None),
            store,
            caches: Arc::new(AuditCaches::new(&config)),
            stats: Arc::new(AuditStats::new()),
            clock,
            config,
        }
    }

    /// Spawns the background worker on the current tokio runtime.
    ///
    /// Returns `false` if the worker was already started.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn start(&self) -> bool {
        let Some(receiver) = self.receiver.lock().take() else {
            warn!("Instance audit worker already started");
            return false;
        };

        let worker = AuditWorker::new(
            self.store.clone(),
            self.caches.clone(),
            self.stats.clone(),
            self.config.freshness_threshold,
        );
        let handle = tokio::spawn(worker.run(receiver, self.shutdown_tx.subscribe()));
        *self.worker.lock() = Some(handle);

        info!(
            queue_capacity = self.config.queue_capacity,
            freshness_threshold = ?self.config.freshness_threshold,
            "Instance auditor started"
        );
        true
    }

    /// Offers a report for asynchronous recording.
    ///
    /// Returns `true` once the report is queued, which says nothing about
    /// whether it will be persisted. Returns `false` without blocking when
    /// the queue is full or the worker has shut down; the report is dropped.
    pub fn audit(
        &self,
        instance: InstanceIdentity,
        namespace: ConfigNamespace,
        release_key: impl Into<String>,
    ) -> bool {
        let event = AuditReportEvent::new(instance, namespace, release_key, self.clock.utc());

        match self.sender.try_send(event) {
            Ok(()) => {
                self.stats.record_accepted();
                counter!("apogee_audit_reports_total", "result" => "accepted").increment(1);
                true
            },
            Err(TrySendError::Full(event)) => {
                self.stats.record_rejected();
                counter!("apogee_audit_reports_total", "result" => "queue_full").increment(1);
                debug!(instance = %event.instance, "Audit queue full, report dropped");
                false
            },
            Err(TrySendError::Closed(event)) => {
                self.stats.record_rejected();
                counter!("apogee_audit_reports_total", "result" => "closed").increment(1);
                debug!(instance = %event.instance, "Audit worker stopped, report dropped");
                false
            },
        }
    }

    /// Signals the worker to stop and waits for it to exit.
    ///
    /// Queued reports are discarded.
    pub async fn shutdown(&self) {
        self.stop();

        let handle = self.worker.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!(error = %e, "Instance audit worker ended abnormally");
            }
        }
    }

    /// Signals the worker to stop without waiting.
    ///
    /// Takes effect even before [`start`](Self::start): a worker started
    /// afterwards exits at once.
    pub fn stop(&self) {
        self.shutdown_tx.send_replace(true);
    }

    /// Returns true while the worker task is alive.
    pub fn is_running(&self) -> bool {
        self.worker
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Number of reports waiting in the queue.
    pub fn queue_len(&self) -> usize {
        self.sender.max_capacity() - self.sender.capacity()
    }

    pub fn stats(&self) -> &AuditStats {
        &self.stats
    }

    /// The caches, for diagnostics.
    pub fn caches(&self) -> &AuditCaches {
        &self.caches
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }
}

impl Drop for InstanceStateAuditor {
    fn drop(&mut self) {
        self.stop();
    }
}
