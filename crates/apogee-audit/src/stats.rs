//! Audit pipeline statistics.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::worker::AuditOutcome;

/// Counters for the audit pipeline.
///
/// All counters are atomic and can be safely read while the worker runs.
#[derive(Debug, Default)]
pub struct AuditStats {
    /// Reports enqueued.
    accepted: AtomicU64,
    /// Reports dropped because the queue was full or closed.
    rejected: AtomicU64,
    /// Events processed without error.
    processed: AtomicU64,
    /// Events that failed.
    failed: AtomicU64,
    /// Events skipped by the release-key cache.
    cache_hits: AtomicU64,
    /// Events skipped because storage was already fresh.
    fresh: AtomicU64,
    /// Rows inserted.
    created: AtomicU64,
    /// Rows whose release key changed.
    updated: AtomicU64,
    /// Rows whose last-modified time was refreshed.
    touched: AtomicU64,
    /// Inserts that lost a uniqueness race.
    create_races: AtomicU64,
}

impl AuditStats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record_accepted(&self) {
        self.accepted.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_failure(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successfully processed event.
    pub fn record_outcome(&self, outcome: AuditOutcome) {
        self.processed.fetch_add(1, Ordering::Relaxed);
        let counter = match outcome {
            AuditOutcome::CacheHit => &self.cache_hits,
            AuditOutcome::Fresh => &self.fresh,
            AuditOutcome::Created => &self.created,
            AuditOutcome::Updated => &self.updated,
            AuditOutcome::Touched => &self.touched,
            AuditOutcome::CreateRaced => &self.create_races,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn accepted(&self) -> u64 {
        self.accepted.load(Ordering::Relaxed)
    }

    pub fn rejected(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }

    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    /// Events the worker has finished with, successfully or not.
    pub fn completed(&self) -> u64 {
        self.processed() + self.failed()
    }

    pub fn cache_hits(&self) -> u64 {
        self.cache_hits.load(Ordering::Relaxed)
    }

    pub fn fresh(&self) -> u64 {
        self.fresh.load(Ordering::Relaxed)
    }

    pub fn created(&self) -> u64 {
        self.created.load(Ordering::Relaxed)
    }

    pub fn updated(&self) -> u64 {
        self.updated.load(Ordering::Relaxed)
    }

    pub fn touched(&self) -> u64 {
        self.touched.load(Ordering::Relaxed)
    }

    pub fn create_races(&self) -> u64 {
        self.create_races.load(Ordering::Relaxed)
    }

    /// Storage writes issued for instance configs.
    pub fn writes(&self) -> u64 {
        self.created() + self.updated() + self.touched()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audit_stats_basic() {
        let stats = AuditStats::new();

        stats.record_accepted();
        stats.record_accepted();
        stats.record_rejected();
        stats.record_outcome(AuditOutcome::Created);
        stats.record_outcome(AuditOutcome::CacheHit);
        stats.record_failure();

        assert_eq!(stats.accepted(), 2);
        assert_eq!(stats.rejected(), 1);
        assert_eq!(stats.processed(), 2);
        assert_eq!(stats.failed(), 1);
        assert_eq!(stats.completed(), 3);
        assert_eq!(stats.created(), 1);
        assert_eq!(stats.cache_hits(), 1);
    }

    #[test]
    fn writes_count_only_storage_writes() {
        let stats = AuditStats::new();

        for outcome in [
            AuditOutcome::CacheHit,
            AuditOutcome::Fresh,
            AuditOutcome::Created,
            AuditOutcome::Updated,
            AuditOutcome::Touched,
            AuditOutcome::CreateRaced,
        ] {
            stats.record_outcome(outcome);
        }

        assert_eq!(stats.processed(), 6);
        assert_eq!(stats.writes(), 3);
        assert_eq!(stats.create_races(), 1);
    }
}
