#![allow(dead_code)]
use std::sync::Arc;
use std::time::Duration;

use apogee_audit::{AuditConfig, InMemoryInstanceStore, InstanceStateAuditor, InstanceStore};
use apogee_core::{ConfigNamespace, InstanceIdentity};
use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;
use parking_lot::Mutex;

/// Clock the tests move by hand.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance(&self, delta: Duration) {
        let delta = TimeDelta::from_std(delta).expect("delta out of range");
        *self.0.lock() += delta;
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.0.lock()
    }
}

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

pub fn identity() -> InstanceIdentity {
    InstanceIdentity::new("A", "C", Some(""), "1.2.3.4")
}

pub fn namespace() -> ConfigNamespace {
    ConfigNamespace::new("A", "C", "N")
}

/// Builds and starts an auditor over `store` with a hand-driven clock.
pub fn started_auditor(
    store: Arc<dyn InstanceStore>,
    clock: Arc<MutableClock>,
    config: AuditConfig,
) -> InstanceStateAuditor {
    let auditor = InstanceStateAuditor::with_clock(config, store, clock);
    assert!(auditor.start());
    auditor
}

/// Waits until the worker has finished `expected` events.
pub async fn wait_for_completed(auditor: &InstanceStateAuditor, expected: u64) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while auditor.stats().completed() < expected {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("audit worker did not drain the queue in time");
}

/// Stored release key for the default test identity and namespace.
pub fn stored_release_key(store: &InMemoryInstanceStore) -> Option<String> {
    let instance = store.instance(&identity())?;
    store
        .instance_config(instance.id, "A", "N")
        .map(|config| config.release_key)
}
