//! Queued audit reports.

use apogee_core::{ConfigNamespace, InstanceIdentity};
use chrono::{DateTime, Utc};

/// "Instance X runs release R of namespace N", as captured at `offered_at`.
///
/// Lives only inside the audit queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditReportEvent {
    pub instance: InstanceIdentity,
    pub namespace: ConfigNamespace,
    pub release_key: String,
    /// When the report was accepted, not when it is processed.
    pub offered_at: DateTime<Utc>,
}

impl AuditReportEvent {
    pub fn new(
        instance: InstanceIdentity,
        namespace: ConfigNamespace,
        release_key: impl Into<String>,
        offered_at: DateTime<Utc>,
    ) -> Self {
        Self {
            instance,
            namespace,
            release_key: release_key.into(),
            offered_at,
        }
    }
}
