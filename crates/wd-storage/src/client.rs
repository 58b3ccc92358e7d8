//! Client storage trait.

use async_trait::async_trait;
use wd_model::Client;

use crate::error::StorageResult;

/// Read access to client registrations.
///
/// Implementations must be thread-safe and support concurrent access.
#[async_trait]
pub trait ClientStore: Send + Sync {
    /// Gets a client by `client_id`.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::NotFound` if no such client exists.
    async fn get_client(&self, id: &str) -> StorageResult<Client>;
}
