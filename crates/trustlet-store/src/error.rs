//! Error types for Trustlet storage.

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(String),

    /// A stored row could not be mapped back to a domain type.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Record not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The entity type that was not found.
        entity: &'static str,
        /// The ID that was looked up.
        id: String,
    },

    /// The owning plan's review cap has been reached.
    #[error("review limit reached: {limit}")]
    QuotaExceeded {
        /// The plan's review cap.
        limit: u64,
    },
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        Self::Database(format!("migration failed: {err}"))
    }
}

impl From<trustlet_core::DomainError> for StoreError {
    fn from(err: trustlet_core::DomainError) -> Self {
        match err {
            trustlet_core::DomainError::QuotaExceeded { limit } => Self::QuotaExceeded { limit },
            other => Self::Serialization(other.to_string()),
        }
    }
}
