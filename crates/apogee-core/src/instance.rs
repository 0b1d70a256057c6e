//! Client instance types.
//!
//! An instance is one running process of a client application. The audit
//! pipeline records, per instance and namespace, which release it runs.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Identifies a running client process.
///
/// The data center is optional on the wire; a missing or empty value is
/// stored as the empty string so that both spellings resolve to the same
/// instance.
///
/// # Examples
///
/// ```
/// use apogee_core::InstanceIdentity;
///
/// let a = InstanceIdentity::new("app", "default", None, "10.0.0.1");
/// let b = InstanceIdentity::new("app", "default", Some(""), "10.0.0.1");
/// assert_eq!(a, b);
/// assert_eq!(a.data_center(), "");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceIdentity {
    app_id: String,
    cluster_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    data_center: String,
    ip: String,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl InstanceIdentity {
    pub fn new(
        app_id: impl Into<String>,
        cluster_name: impl Into<String>,
        data_center: Option<&str>,
        ip: impl Into<String>,
    ) -> Self {
        Self {
            app_id: app_id.into(),
            cluster_name: cluster_name.into(),
            data_center: data_center.unwrap_or_default().to_string(),
            ip: ip.into(),
        }
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub fn cluster_name(&self) -> &str {
        &self.cluster_name
    }

    /// Returns the data center, empty when the client did not report one.
    pub fn data_center(&self) -> &str {
        &self.data_center
    }

    pub fn ip(&self) -> &str {
        &self.ip
    }
}

impl fmt::Display for InstanceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}+{}", self.app_id, self.cluster_name, self.ip)?;
        if !self.data_center.is_empty() {
            write!(f, "+{}", self.data_center)?;
        }
        Ok(())
    }
}

/// A persisted instance row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    /// Surrogate id assigned by storage.
    pub id: i64,
    #[serde(flatten)]
    pub identity: InstanceIdentity,
}

/// The configuration namespace an instance reports on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigNamespace {
    pub app_id: String,
    pub cluster_name: String,
    pub namespace_name: String,
}

impl ConfigNamespace {
    pub fn new(
        app_id: impl Into<String>,
        cluster_name: impl Into<String>,
        namespace_name: impl Into<String>,
    ) -> Self {
        Self {
            app_id: app_id.into(),
            cluster_name: cluster_name.into(),
            namespace_name: namespace_name.into(),
        }
    }
}

impl fmt::Display for ConfigNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}+{}+{}",
            self.app_id, self.cluster_name, self.namespace_name
        )
    }
}

/// Which release an instance runs for one namespace.
///
/// At most one row exists per `(instance_id, config_app_id,
/// config_namespace_name)`; the cluster is mutable because an instance may
/// be served from a different cluster after a release moves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceConfig {
    pub id: i64,
    pub instance_id: i64,
    pub config_app_id: String,
    pub config_cluster_name: String,
    pub config_namespace_name: String,
    pub release_key: String,
    pub release_delivery_time: DateTime<Utc>,
    pub created_time: DateTime<Utc>,
    pub last_modified_time: DateTime<Utc>,
}

/// Insert payload for an [`InstanceConfig`] row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInstanceConfig {
    pub instance_id: i64,
    pub config_app_id: String,
    pub config_cluster_name: String,
    pub config_namespace_name: String,
    pub release_key: String,
    pub release_delivery_time: DateTime<Utc>,
    pub created_time: DateTime<Utc>,
    pub last_modified_time: DateTime<Utc>,
}

impl NewInstanceConfig {
    /// Builds the first record of `instance_id` running `release_key`,
    /// with every timestamp set to the time the report was captured.
    pub fn first_delivery(
        instance_id: i64,
        namespace: &ConfigNamespace,
        release_key: impl Into<String>,
        delivered_at: DateTime<Utc>,
    ) -> Self {
        Self {
            instance_id,
            config_app_id: namespace.app_id.clone(),
            config_cluster_name: namespace.cluster_name.clone(),
            config_namespace_name: namespace.namespace_name.clone(),
            release_key: release_key.into(),
            release_delivery_time: delivered_at,
            created_time: delivered_at,
            last_modified_time: delivered_at,
        }
    }

    /// Attaches the storage-assigned id.
    pub fn with_id(self, id: i64) -> InstanceConfig {
        InstanceConfig {
            id,
            instance_id: self.instance_id,
            config_app_id: self.config_app_id,
            config_cluster_name: self.config_cluster_name,
            config_namespace_name: self.config_namespace_name,
            release_key: self.release_key,
            release_delivery_time: self.release_delivery_time,
            created_time: self.created_time,
            last_modified_time: self.last_modified_time,
        }
    }
}
