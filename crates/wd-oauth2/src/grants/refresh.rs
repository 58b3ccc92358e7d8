//! `refresh_token` grant (RFC 6749 section 6).
//!
//! The validate phase checks the presented refresh token against its stored
//! session and adopts that session. The populate phase mints a new access
//! token, rotates the refresh token (unless refresh tokens are permanent)
//! and swaps the stored sessions in one storage call.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use wd_core::TokenConfig;
use wd_model::{AccessRequest, TokenKind};
use wd_storage::RefreshTokenGrantStorage;

use crate::error::{OAuth2Error, OAuth2Result};
use crate::handler::{HandlerOutcome, TokenEndpointHandler};
use crate::response::AccessResponse;
use crate::strategy::{AccessTokenStrategy, RefreshTokenStrategy};

use super::{OFFLINE_SCOPE, expires_in};

/// Grant type handled here.
pub const GRANT_TYPE: &str = "refresh_token";

/// Description shared by every rejection of the presented token itself.
///
/// Unknown, forged and foreign tokens must be indistinguishable to clients.
pub const INVALID_REFRESH_TOKEN: &str = "the refresh token is not valid for this client";

fn invalid_refresh_token() -> OAuth2Error {
    OAuth2Error::InvalidGrantRequest(INVALID_REFRESH_TOKEN.to_string())
}

/// Handler for the `refresh_token` grant.
pub struct RefreshTokenGrantHandler<S: RefreshTokenGrantStorage> {
    access_strategy: Arc<dyn AccessTokenStrategy>,
    refresh_strategy: Arc<dyn RefreshTokenStrategy>,
    storage: Arc<S>,
    access_token_lifespan: TimeDelta,
    refresh_token_lifespan: TimeDelta,
    permanent_refresh_tokens: bool,
}

impl<S: RefreshTokenGrantStorage> RefreshTokenGrantHandler<S> {
    /// Creates a refresh token grant handler.
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
            permanent_refresh_tokens: tokens.permanent_refresh_tokens(),
        }
    }
}

#[async_trait]
impl<S> TokenEndpointHandler for RefreshTokenGrantHandler<S>
where
    S: RefreshTokenGrantStorage + 'static,
{
    async fn handle_token_endpoint_request(
        &self,
        request: &mut AccessRequest,
    ) -> OAuth2Result<HandlerOutcome> {
        // grant_type REQUIRED. Value MUST be set to "refresh_token".
        if !request.grant_types.exact(GRANT_TYPE) {
            return Ok(HandlerOutcome::NotApplicable);
        }

        if !request.client.grant_types.has(&[GRANT_TYPE]) {
            return Err(OAuth2Error::InvalidGrant(
                "the client is not allowed to use grant type refresh_token".to_string(),
            ));
        }

        let refresh_token = request.form_value_or_empty(GRANT_TYPE).to_string();
        let signature = self.refresh_strategy.refresh_token_signature(&refresh_token);

        let original = match self.storage.get_refresh_token_session(&signature).await {
            Ok(original) => original,
            Err(e) if e.is_not_found() => {
                tracing::debug!(client_id = %request.client.id, "unknown refresh token");
                return Err(invalid_refresh_token());
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to load refresh token session");
                return Err(OAuth2Error::ServerError(e.to_string()));
            }
        };

        if self.refresh_token_lifespan > TimeDelta::zero()
            && original.requested_at + self.refresh_token_lifespan < Utc::now()
        {
            return Err(OAuth2Error::TokenExpired(
                "the refresh token has expired".to_string(),
            ));
        }

        if !original.granted_scopes.has(&[OFFLINE_SCOPE]) {
            return Err(OAuth2Error::ScopeNotGranted(
                "the refresh token was not granted the offline scope".to_string(),
            ));
        }

        // The authorization server MUST validate the refresh token
        self.refresh_strategy
            .validate_refresh_token(request, &refresh_token)
            .await
            .map_err(|e| {
                tracing::debug!(
                    client_id = %request.client.id,
                    error = %e,
                    "refresh token rejected"
                );
                invalid_refresh_token()
            })?;

        // ... and ensure that it was issued to the authenticated client
        if original.client.id != request.client.id {
            tracing::warn!(
                client_id = %request.client.id,
                issued_to = %original.client.id,
                "refresh token presented by another client"
            );
            return Err(invalid_refresh_token());
        }

        request.session = original.session.clone();
        request.requested_scopes = original.requested_scopes.clone();
        for scope in &original.granted_scopes {
            request.grant_scope(scope.as_str());
        }

        request
            .session
            .set_expires_at(TokenKind::AccessToken, Utc::now() + self.access_token_lifespan);

        Ok(HandlerOutcome::Handled)
    }

    async fn populate_token_endpoint_response(
        &self,
        request: &AccessRequest,
        response: &mut AccessResponse,
    ) -> OAuth2Result<HandlerOutcome> {
        if !request.grant_types.exact(GRANT_TYPE) {
            return Ok(HandlerOutcome::NotApplicable);
        }

        let access = self
            .access_strategy
            .generate_access_token(request)
            .await
            .map_err(|e| OAuth2Error::ServerError(e.to_string()))?;

        let presented = request.form_value_or_empty(GRANT_TYPE);
        let original_signature = self.refresh_strategy.refresh_token_signature(presented);

        let (refresh_token, refresh_signature) = if self.permanent_refresh_tokens {
            (presented.to_string(), original_signature.clone())
        } else {
            let refresh = self
                .refresh_strategy
                .generate_refresh_token(request)
                .await
                .map_err(|e| OAuth2Error::ServerError(e.to_string()))?;
            (refresh.token, refresh.signature)
        };

        self.storage
            .persist_refresh_token_grant_session(
                &original_signature,
                &access.signature,
                &refresh_signature,
                request,
            )
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    request_id = %request.id,
                    "failed to persist refresh token grant"
                );
                OAuth2Error::ServerError(e.to_string())
            })?;

        response.access_token = access.token;
        response.token_type = "bearer".to_string();
        response.expires_in = Some(expires_in(
            request,
            TokenKind::AccessToken,
            self.access_token_lifespan,
            Utc::now(),
        ));
        response.scopes = request.granted_scopes.clone();
        response.set_extra(GRANT_TYPE, refresh_token);

        Ok(HandlerOutcome::Handled)
    }
}
