//! Error types for the audit pipeline.

/// Errors reported by an [`InstanceStore`](crate::store::InstanceStore).
///
/// Uniqueness violations are not errors: stores report them as
/// [`InsertOutcome::AlreadyExists`](crate::store::InsertOutcome).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store could not be reached.
    #[error("store unavailable: {reason}")]
    Unavailable { reason: String },

    /// A query or statement failed.
    #[error("query failed: {0}")]
    Query(String),

    /// An update targeted a row that does not exist.
    #[error("instance config {id} not found")]
    InstanceConfigNotFound { id: i64 },
}

impl StoreError {
    /// Creates a new unavailable error.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    /// Creates a new query error.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Returns true if this is a transient error that might succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

/// Errors raised while processing a single audit event.
///
/// The worker logs and counts these; they never stop it.
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    /// The store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Creation reported an existing row that a re-read could not find.
    #[error("instance {instance} already exists but could not be read back")]
    InstanceVanished { instance: String },
}
