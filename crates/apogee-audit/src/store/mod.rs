//! Instance storage contract.

mod memory;

pub use memory::InMemoryInstanceStore;

use apogee_core::{Instance, InstanceConfig, InstanceIdentity, NewInstanceConfig};
use async_trait::async_trait;

use crate::error::StoreError;

/// Result of an insert that may collide with a concurrent creator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome<T> {
    /// The row was inserted.
    Created(T),
    /// A row with the same unique key already exists.
    AlreadyExists,
}

impl<T> InsertOutcome<T> {
    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

/// System of record for instances and their per-namespace release state.
///
/// Implementations must enforce two uniqueness constraints and report a
/// violation as [`InsertOutcome::AlreadyExists`] instead of an error:
///
/// - one instance per [`InstanceIdentity`];
/// - one instance config per `(instance_id, config_app_id,
///   config_namespace_name)`.
///
/// Several server processes may write through the same store concurrently;
/// those constraints are the only coordination between them.
///
/// # Example
///
/// ```ignore
/// struct SqlInstanceStore { pool: Pool }
///
/// #[async_trait]
/// impl InstanceStore for SqlInstanceStore {
///     async fn create_instance(
///         &self,
///         identity: &InstanceIdentity,
///     ) -> Result<InsertOutcome<Instance>, StoreError> {
///         match self.insert_instance(identity).await {
///             Ok(id) => Ok(InsertOutcome::Created(Instance { id, identity: identity.clone() })),
///             Err(e) if e.is_unique_violation() => Ok(InsertOutcome::AlreadyExists),
///             Err(e) => Err(StoreError::query(e.to_string())),
///         }
///     }
///     // ...
/// }
/// ```
#[async_trait]
pub trait InstanceStore: Send + Sync {
    /// Finds the instance with the given identity.
    async fn find_instance(
        &self,
        identity: &InstanceIdentity,
    ) -> Result<Option<Instance>, StoreError>;

    /// Inserts an instance row.
    async fn create_instance(
        &self,
        identity: &InstanceIdentity,
    ) -> Result<InsertOutcome<Instance>, StoreError>;

    /// Finds the release state of an instance for one app namespace.
    async fn find_instance_config(
        &self,
        instance_id: i64,
        config_app_id: &str,
        config_namespace_name: &str,
    ) -> Result<Option<InstanceConfig>, StoreError>;

    /// Inserts a release state row.
    async fn create_instance_config(
        &self,
        config: NewInstanceConfig,
    ) -> Result<InsertOutcome<InstanceConfig>, StoreError>;

    /// Persists every mutable field of an existing release state row.
    async fn update_instance_config(&self, config: &InstanceConfig) -> Result<(), StoreError>;

    /// Returns the name of this store, for logging.
    fn name(&self) -> &str;
}
