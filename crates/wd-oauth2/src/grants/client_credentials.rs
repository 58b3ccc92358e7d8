//! `client_credentials` grant (RFC 6749 section 4.4).
//!
//! Only confidential clients may use this grant. No refresh token is issued.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use wd_core::TokenConfig;
use wd_model::{AccessRequest, TokenKind};
use wd_storage::AccessTokenStorage;

use crate::error::{OAuth2Error, OAuth2Result};
use crate::handler::{HandlerOutcome, TokenEndpointHandler};
use crate::response::AccessResponse;
use crate::strategy::AccessTokenStrategy;

use super::expires_in;

/// Grant type handled here.
pub const GRANT_TYPE: &str = "client_credentials";

/// Handler for the `client_credentials` grant.
pub struct ClientCredentialsGrantHandler<S: AccessTokenStorage> {
    access_strategy: Arc<dyn AccessTokenStrategy>,
    storage: Arc<S>,
    access_token_lifespan: TimeDelta,
}

impl<S: AccessTokenStorage> ClientCredentialsGrantHandler<S> {
    /// Creates a client credentials grant handler.
    #[must_use]
    pub fn new(
        access_strategy: Arc<dyn AccessTokenStrategy>,
        storage: Arc<S>,
        tokens: &TokenConfig,
    ) -> Self {
        Self {
            access_strategy,
            storage,
            access_token_lifespan: tokens.access_token_lifespan(),
        }
    }
}

#[async_trait]
impl<S> TokenEndpointHandler for ClientCredentialsGrantHandler<S>
where
    S: AccessTokenStorage + 'static,
{
    async fn handle_token_endpoint_request(
        &self,
        request: &mut AccessRequest,
    ) -> OAuth2Result<HandlerOutcome> {
        if !request.grant_types.exact(GRANT_TYPE) {
            return Ok(HandlerOutcome::NotApplicable);
        }

        if request.client.is_public() {
            return Err(OAuth2Error::InvalidGrant(
                "public clients may not use grant type client_credentials".to_string(),
            ));
        }

        if !request.client.grant_types.has(&[GRANT_TYPE]) {
            return Err(OAuth2Error::InvalidGrant(
                "the client is not allowed to use grant type client_credentials".to_string(),
            ));
        }

        if let Some(scope) = request
            .requested_scopes
            .iter()
            .find(|scope| !request.client.scopes.contains(scope))
        {
            return Err(OAuth2Error::InvalidScope(format!(
                "the client is not allowed to request scope '{scope}'"
            )));
        }

        let requested = request.requested_scopes.clone();
        for scope in &requested {
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

        self.storage
            .create_access_token_session(&access.signature, request)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    request_id = %request.id,
                    "failed to persist access token session"
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

        Ok(HandlerOutcome::Handled)
    }
}
