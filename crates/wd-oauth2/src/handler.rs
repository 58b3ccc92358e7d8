//! Grant handler contracts and dispatch.
//!
//! Every handler reports one of three outcomes:
//!
//! | Outcome | Meaning | Dispatcher reaction |
//! |---------|---------|---------------------|
//! | `Ok(Handled)` | the handler processed the request | counts as success, continues |
//! | `Ok(NotApplicable)` | the request is not for this handler | skipped |
//! | `Err(_)` | the request is for this handler and is invalid | aborts, returned unchanged |

use std::sync::Arc;

use async_trait::async_trait;
use wd_model::AccessRequest;

use crate::error::{OAuth2Error, OAuth2Result};
use crate::response::AccessResponse;

/// Non-fatal outcome of a handler invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerOutcome {
    /// The handler recognised and processed the request.
    Handled,
    /// The request is not for this handler.
    NotApplicable,
}

/// A grant type handler for the token endpoint.
///
/// The token endpoint runs every handler's validate phase, then every
/// handler's populate phase.
#[async_trait]
pub trait TokenEndpointHandler: Send + Sync {
    /// Validates the request and records the grant on it.
    ///
    /// On success the handler may replace the session and set requested and
    /// granted scopes.
    async fn handle_token_endpoint_request(
        &self,
        request: &mut AccessRequest,
    ) -> OAuth2Result<HandlerOutcome>;

    /// Issues tokens for an accepted request and fills the response.
    async fn populate_token_endpoint_response(
        &self,
        request: &AccessRequest,
        response: &mut AccessResponse,
    ) -> OAuth2Result<HandlerOutcome>;
}

/// Imports tokens issued by another OAuth 2.0 system.
#[async_trait]
pub trait TokenMigrationHandler: Send + Sync {
    /// Stores the tokens carried by `response` under `request`.
    async fn migrate_token(
        &self,
        request: &mut AccessRequest,
        response: &AccessResponse,
    ) -> OAuth2Result<HandlerOutcome>;
}

/// Ordered token endpoint handlers.
#[derive(Clone, Default)]
pub struct TokenEndpointHandlers {
    handlers: Vec<Arc<dyn TokenEndpointHandler>>,
}

impl TokenEndpointHandlers {
    /// Creates an empty handler list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a handler.
    pub fn push(&mut self, handler: Arc<dyn TokenEndpointHandler>) {
        self.handlers.push(handler);
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns `true` if no handler is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Runs the validate phase of every handler.
    ///
    /// # Errors
    ///
    /// Returns the first handler error unchanged, or
    /// [`OAuth2Error::InvalidRequest`] if no handler accepted the request.
    pub async fn handle_request(&self, request: &mut AccessRequest) -> OAuth2Result<()> {
        let mut handled = false;

        for handler in &self.handlers {
            match handler.handle_token_endpoint_request(request).await? {
                HandlerOutcome::Handled => handled = true,
                HandlerOutcome::NotApplicable => {}
            }
        }

        if handled {
            Ok(())
        } else {
            tracing::debug!(grant_types = %request.grant_types, "no handler accepted the grant");
            Err(OAuth2Error::InvalidRequest(format!(
                "unsupported grant type '{}'",
                request.grant_types
            )))
        }
    }

    /// Runs the populate phase of every handler.
    ///
    /// # Errors
    ///
    /// Returns the first handler error unchanged, or
    /// [`OAuth2Error::ServerError`] if no handler set an access token and
    /// token type.
    pub async fn populate_response(
        &self,
        request: &AccessRequest,
        response: &mut AccessResponse,
    ) -> OAuth2Result<()> {
        for handler in &self.handlers {
            handler
                .populate_token_endpoint_response(request, response)
                .await?;
        }

        if response.access_token.is_empty() || response.token_type.is_empty() {
            tracing::error!(request_id = %request.id, "no handler issued an access token");
            return Err(OAuth2Error::ServerError(
                "access token or token type not set".to_string(),
            ));
        }

        Ok(())
    }
}

/// Ordered token migration handlers.
#[derive(Clone, Default)]
pub struct TokenMigrationHandlers {
    handlers: Vec<Arc<dyn TokenMigrationHandler>>,
}

impl TokenMigrationHandlers {
    /// Creates an empty handler list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a handler.
    pub fn push(&mut self, handler: Arc<dyn TokenMigrationHandler>) {
        self.handlers.push(handler);
    }

    /// Runs every migration handler.
    ///
    /// # Errors
    ///
    /// Returns the first handler error unchanged, or
    /// [`OAuth2Error::InvalidRequest`] if no handler migrated the tokens.
    pub async fn migrate(
        &self,
        request: &mut AccessRequest,
        response: &AccessResponse,
    ) -> OAuth2Result<()> {
        let mut handled = false;

        for handler in &self.handlers {
            if handler.migrate_token(request, response).await? == HandlerOutcome::Handled {
                handled = true;
            }
        }

        if handled {
            Ok(())
        } else {
            Err(OAuth2Error::InvalidRequest("no handlers".to_string()))
        }
    }
}
