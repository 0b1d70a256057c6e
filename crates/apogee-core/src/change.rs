//! Configuration change types.
//!
//! A change set is what an incrementally-syncing client receives instead of
//! the full configuration of a namespace.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Configuration key/value pairs of one release.
///
/// Keys are case-sensitive; a value may be null.
pub type ConfigurationMap = HashMap<String, Option<String>>;

/// A shared, immutable change list.
///
/// Cached change sets are handed out by reference, so two lookups of the
/// same release transition return pointer-equal values.
pub type ChangeSet = Arc<Vec<ConfigurationChange>>;

/// Kind of change applied to a single key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeType {
    /// The key exists only in the latest release.
    Added,
    /// The key exists in both releases with different values.
    Modified,
    /// The key exists only in the client's release.
    Deleted,
}

impl ChangeType {
    /// Returns the wire name of this change type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "ADDED",
            Self::Modified => "MODIFIED",
            Self::Deleted => "DELETED",
        }
    }
}

/// A single key-level change between two releases.
///
/// Serialized the way clients expect it:
///
/// ```
/// use apogee_core::{ChangeType, ConfigurationChange};
///
/// let change = ConfigurationChange::added("timeout", Some("30".to_string()));
/// let json = serde_json::to_string(&change).unwrap();
/// assert_eq!(
///     json,
///     r#"{"key":"timeout","newValue":"30","configurationChangeType":"ADDED"}"#
/// );
/// assert_eq!(change.change_type(), ChangeType::Added);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationChange {
    key: String,
    new_value: Option<String>,
    #[serde(rename = "configurationChangeType")]
    change_type: ChangeType,
}

impl ConfigurationChange {
    /// Creates a change of the given type.
    pub fn new(key: impl Into<String>, new_value: Option<String>, change_type: ChangeType) -> Self {
        Self {
            key: key.into(),
            new_value,
            change_type,
        }
    }

    /// A key that appeared in the latest release.
    pub fn added(key: impl Into<String>, value: Option<String>) -> Self {
        Self::new(key, value, ChangeType::Added)
    }

    /// A key whose value changed.
    pub fn modified(key: impl Into<String>, value: Option<String>) -> Self {
        Self::new(key, value, ChangeType::Modified)
    }

    /// A key that no longer exists. Deletions never carry a value.
    pub fn deleted(key: impl Into<String>) -> Self {
        Self::new(key, None, ChangeType::Deleted)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn new_value(&self) -> Option<&str> {
        self.new_value.as_deref()
    }

    pub fn change_type(&self) -> ChangeType {
        self.change_type
    }
}
