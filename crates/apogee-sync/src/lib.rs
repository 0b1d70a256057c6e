//! # Apogee Sync
//!
//! Incremental configuration sync: instead of shipping a full namespace on
//! every poll, the server tells a client which keys were added, modified or
//! deleted between the release it holds and the latest merged release.
//!
//! Diffs are memoized per release transition, so a fleet polling the same
//! pair of releases costs one computation per cache window.
//!
//! ## Example
//!
//! ```
//! use apogee_core::{ChangeType, ConfigurationMap};
//! use apogee_sync::{ChangeDiffCache, DiffCacheConfig};
//!
//! let cache = ChangeDiffCache::new(DiffCacheConfig::default());
//!
//! let client = ConfigurationMap::from([("k1".to_string(), Some("v1".to_string()))]);
//! let latest = ConfigurationMap::from([
//!     ("k1".to_string(), Some("v1".to_string())),
//!     ("k2".to_string(), Some("v2".to_string())),
//! ]);
//!
//! let changes = cache.get_changes("release-2", Some(&latest), "release-1", Some(&client));
//! assert_eq!(changes.len(), 1);
//! assert_eq!(changes[0].change_type(), ChangeType::Added);
//! ```

pub mod config;
pub mod diff;
pub mod service;

// Re-exports
pub use config::DiffCacheConfig;
pub use diff::calc_configuration_changes;
pub use service::{ChangeDiffCache, IncrementalSyncService};
