//! Token migration handler.
//!
//! Imports an access token, and optionally a refresh token, issued by
//! another OAuth 2.0 system. The tokens are stored under their signatures
//! exactly like locally minted ones. When the refresh session cannot be
//! written, the access session written before it is deleted again.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use wd_core::TokenConfig;
use wd_model::{AccessRequest, TokenKind};
use wd_storage::{AccessTokenStorage, RefreshTokenStorage, StorageError};

use crate::error::{OAuth2Error, OAuth2Result};
use crate::handler::{HandlerOutcome, TokenMigrationHandler};
use crate::response::AccessResponse;
use crate::strategy::{AccessTokenStrategy, RefreshTokenStrategy};

/// Stores foreign tokens with compensating rollback.
pub struct StorageTokenMigrationHandler<S>
where
    S: AccessTokenStorage + RefreshTokenStorage,
{
    access_strategy: Arc<dyn AccessTokenStrategy>,
    refresh_strategy: Arc<dyn RefreshTokenStrategy>,
    storage: Arc<S>,
    access_token_lifespan: TimeDelta,
    refresh_token_lifespan: TimeDelta,
}

impl<S> StorageTokenMigrationHandler<S>
where
    S: AccessTokenStorage + RefreshTokenStorage,
{
    /// Creates a migration handler.
    #[must_use]
    pub fn new(
        access_strategy: Arc<dyn AccessTokenStrategy>,
        refresh_strategy: Arc<dyn RefreshTokenStrategy>,
        storage: Arc<S>,
        tokens: &TokenConfig,
    ) -> Self {
        Self {
            access_strategy,
            refresh_strategy,
            storage,
            access_token_lifespan: tokens.access_token_lifespan(),
            refresh_token_lifespan: tokens.refresh_token_lifespan(),
        }
    }

    /// Deletes the access session after a failed refresh write.
    async fn roll_back(&self, access_signature: &str, cause: StorageError) -> OAuth2Error {
        match self.storage.delete_access_token_session(access_signature).await {
            Ok(()) => OAuth2Error::Storage(cause),
            Err(cleanup) => {
                tracing::error!(
                    error = %cause,
                    cleanup_error = %cleanup,
                    "migrated access token could not be rolled back"
                );
                OAuth2Error::RollbackFailed {
                    source: cause,
                    cleanup,
                }
            }
        }
    }
}

#[async_trait]
impl<S> TokenMigrationHandler for StorageTokenMigrationHandler<S>
where
    S: AccessTokenStorage + RefreshTokenStorage + 'static,
{
    async fn migrate_token(
        &self,
        request: &mut AccessRequest,
        response: &AccessResponse,
    ) -> OAuth2Result<HandlerOutcome> {
        let refresh_token = match response.get_extra("refresh_token") {
            None => "",
            Some(value) => value.as_str().ok_or_else(|| {
                OAuth2Error::InvalidRequest("the refresh token is in a bad format".to_string())
            })?,
        };

        let access_signature = self
            .access_strategy
            .access_token_signature(&response.access_token);
        if access_signature.is_empty() {
            return Err(OAuth2Error::InvalidRequest(
                "the access token is in a bad format".to_string(),
            ));
        }

        // Checked before any write so a bad refresh token leaves nothing behind
        let refresh_signature = if refresh_token.is_empty() {
            None
        } else {
            let signature = self.refresh_strategy.refresh_token_signature(refresh_token);
            if signature.is_empty() {
                return Err(OAuth2Error::InvalidRequest(
                    "the refresh token is in a bad format".to_string(),
                ));
            }
            Some(signature)
        };

        let now = Utc::now();
        request
            .session
            .set_expires_at(TokenKind::AccessToken, now + self.access_token_lifespan);
        self.storage
            .create_access_token_session(&access_signature, request)
            .await?;

        let Some(refresh_signature) = refresh_signature else {
            return Ok(HandlerOutcome::Handled);
        };

        if self.refresh_token_lifespan > TimeDelta::zero() {
            request
                .session
                .set_expires_at(TokenKind::RefreshToken, now + self.refresh_token_lifespan);
        }

        if let Err(e) = self
            .storage
            .create_refresh_token_session(&refresh_signature, request)
            .await
        {
            return Err(self.roll_back(&access_signature, e).await);
        }

        Ok(HandlerOutcome::Handled)
    }
}
