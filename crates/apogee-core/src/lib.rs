//! Apogee Core - Domain types shared by the config service components.
//!
//! This crate holds the value types exchanged between the change-diff
//! cache, the instance audit pipeline and the request-handling layer,
//! plus the cache statistics recorder both components report through.

pub mod change;
pub mod instance;
pub mod metrics;
pub mod release;

pub use change::{ChangeSet, ChangeType, ConfigurationChange, ConfigurationMap};
pub use instance::{ConfigNamespace, Instance, InstanceConfig, InstanceIdentity, NewInstanceConfig};
pub use metrics::CacheMetrics;
pub use release::ReleaseKeyPair;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_defined() {
        assert!(!version().is_empty());
    }

    #[test]
    fn version_is_semver() {
        let v = version();
        assert_eq!(v.split('.').count(), 3, "Version should be semver");
    }
}
