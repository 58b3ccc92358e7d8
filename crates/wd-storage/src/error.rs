//! Storage error types.

use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Entity not found.
    #[error("Entity not found: {entity_type} '{key}'")]
    NotFound {
        /// Type of entity (e.g., "client", "refresh token session").
        entity_type: &'static str,
        /// Lookup key.
        key: String,
    },

    /// Backend connection error.
    #[error("Storage connection error: {0}")]
    Connection(String),

    /// Backend query or write error.
    #[error("Storage query error: {0}")]
    Query(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error.
    #[error("Internal storage error: {0}")]
    Internal(String),
}

impl StorageError {
    /// Creates a not found error.
    #[must_use]
    pub fn not_found(entity_type: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            key: key.into(),
        }
    }

    /// Checks if this is a not found error.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
