//! # Apogee Audit
//!
//! Records which release every client instance runs, per namespace.
//!
//! Clients report their release on every poll, so the report path has to be
//! cheap: [`InstanceStateAuditor::audit`] only enqueues the report and
//! returns. A single background worker drains the queue and converges the
//! reports into storage, skipping anything it already knows about through
//! two bounded caches:
//!
//! - the **instance cache** maps an instance identity to its storage id;
//! - the **release-key cache** remembers the last release recorded for an
//!   (instance, app, namespace) triple.
//!
//! Both are accelerators only. Losing them costs storage round trips, never
//! correctness.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use apogee_audit::{AuditConfig, InMemoryInstanceStore, InstanceStateAuditor};
//! use apogee_core::{ConfigNamespace, InstanceIdentity};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let store = Arc::new(InMemoryInstanceStore::new());
//! let auditor = InstanceStateAuditor::new(AuditConfig::default(), store);
//! auditor.start();
//!
//! let accepted = auditor.audit(
//!     InstanceIdentity::new("orders", "default", None, "10.0.0.7"),
//!     ConfigNamespace::new("orders", "default", "application"),
//!     "20240501-release",
//! );
//! assert!(accepted);
//!
//! auditor.shutdown().await;
//! # }
//! ```

pub mod auditor;
pub mod caches;
pub mod config;
pub mod error;
pub mod event;
pub mod keys;
pub mod stats;
pub mod store;
pub mod worker;

// Re-exports
pub use auditor::InstanceStateAuditor;
pub use caches::AuditCaches;
pub use config::AuditConfig;
pub use error::{AuditError, StoreError};
pub use event::AuditReportEvent;
pub use keys::InstanceConfigKey;
pub use stats::AuditStats;
pub use store::{InMemoryInstanceStore, InsertOutcome, InstanceStore};
pub use worker::{AuditOutcome, register_audit_metrics};

// Re-export apogee_core for consumers
pub use apogee_core;
