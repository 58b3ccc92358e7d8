//! Token session storage traits.

use async_trait::async_trait;
use wd_model::AccessRequest;

use crate::error::StorageResult;

/// Access token sessions keyed by access token signature.
#[async_trait]
pub trait AccessTokenStorage: Send + Sync {
    /// Stores the request under an access token signature.
    async fn create_access_token_session(
        &self,
        signature: &str,
        request: &AccessRequest,
    ) -> StorageResult<()>;

    /// Loads the request stored under an access token signature.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::NotFound` if nothing is stored.
    async fn get_access_token_session(&self, signature: &str) -> StorageResult<AccessRequest>;

    /// Deletes an access token session.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::NotFound` if nothing is stored.
    async fn delete_access_token_session(&self, signature: &str) -> StorageResult<()>;
}

/// Refresh token sessions keyed by refresh token signature.
#[async_trait]
pub trait RefreshTokenStorage: Send + Sync {
    /// Stores the request under a refresh token signature.
    async fn create_refresh_token_session(
        &self,
        signature: &str,
        request: &AccessRequest,
    ) -> StorageResult<()>;

    /// Loads the request stored under a refresh token signature.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::NotFound` if nothing is stored.
    async fn get_refresh_token_session(&self, signature: &str) -> StorageResult<AccessRequest>;

    /// Deletes a refresh token session.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::NotFound` if nothing is stored.
    async fn delete_refresh_token_session(&self, signature: &str) -> StorageResult<()>;
}

/// Storage for the refresh token grant.
#[async_trait]
pub trait RefreshTokenGrantStorage: RefreshTokenStorage {
    /// Rotates a refresh token in one step.
    ///
    /// Removes the session stored under `original_refresh_signature`, then
    /// stores `request` under `access_signature` and `refresh_signature`.
    /// The two signatures may be equal to the original when refresh tokens
    /// are permanent.
    ///
    /// Implementations must fail with `StorageError::NotFound` when the
    /// original session is already gone, so a refresh token can be
    /// exchanged at most once.
    async fn persist_refresh_token_grant_session(
        &self,
        original_refresh_signature: &str,
        access_signature: &str,
        refresh_signature: &str,
        request: &AccessRequest,
    ) -> StorageResult<()>;
}
