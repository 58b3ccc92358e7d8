//! OAuth 2.0 provider composition.
//!
//! [`OAuth2Provider`] owns the client authenticator and the ordered grant
//! and migration handlers. Handler sets are configured per instance through
//! [`ProviderBuilder`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use wd_oauth2::{HmacShaStrategy, ProviderBuilder};
//! use wd_storage::MemoryStore;
//!
//! let store = Arc::new(MemoryStore::new());
//! let strategy = Arc::new(HmacShaStrategy::new(&secret, &config.tokens)?);
//! let provider = ProviderBuilder::new(store.clone(), Arc::new(Argon2Hasher::default()))
//!     .config(config)
//!     .with_hmac_handlers(store, strategy)
//!     .build();
//! ```

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use wd_core::Config;
use wd_crypto::SecretHasher;
use wd_model::{AccessRequest, Arguments, Session};
use wd_storage::{AccessTokenStorage, ClientStore, RefreshTokenGrantStorage};

use crate::client_auth::{
    ClientAuthenticator, ClientCredentials, CredentialLocation, decode_credentials,
    extract_credentials,
};
use crate::error::{OAuth2Error, OAuth2Result};
use crate::grants::{ClientCredentialsGrantHandler, RefreshTokenGrantHandler};
use crate::handler::{
    TokenEndpointHandler, TokenEndpointHandlers, TokenMigrationHandler, TokenMigrationHandlers,
};
use crate::migration::StorageTokenMigrationHandler;
use crate::request::EndpointRequest;
use crate::response::AccessResponse;
use crate::strategy::HmacShaStrategy;

/// Session extra and response extra marking migrated tokens.
pub const MIGRATED_EXTRA: &str = "migrated";

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`OAuth2Provider`].
pub struct ProviderBuilder {
    clients: Arc<dyn ClientStore>,
    hasher: Arc<dyn SecretHasher>,
    config: Config,
    token_handlers: TokenEndpointHandlers,
    migration_handlers: TokenMigrationHandlers,
}

impl ProviderBuilder {
    /// Starts a builder with default configuration and no handlers.
    #[must_use]
    pub fn new(clients: Arc<dyn ClientStore>, hasher: Arc<dyn SecretHasher>) -> Self {
        Self {
            clients,
            hasher,
            config: Config::default(),
            token_handlers: TokenEndpointHandlers::new(),
            migration_handlers: TokenMigrationHandlers::new(),
        }
    }

    /// Sets the configuration.
    ///
    /// Handlers added afterwards by [`Self::with_hmac_handlers`] use its
    /// token lifespans.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Appends a token endpoint handler.
    #[must_use]
    pub fn token_handler(mut self, handler: Arc<dyn TokenEndpointHandler>) -> Self {
        self.token_handlers.push(handler);
        self
    }

    /// Appends a token migration handler.
    #[must_use]
    pub fn migration_handler(mut self, handler: Arc<dyn TokenMigrationHandler>) -> Self {
        self.migration_handlers.push(handler);
        self
    }

    /// Registers the HMAC-backed refresh token, client credentials and
    /// migration handlers on one storage backend.
    #[must_use]
    pub fn with_hmac_handlers<S>(self, storage: Arc<S>, strategy: Arc<HmacShaStrategy>) -> Self
    where
        S: AccessTokenStorage + RefreshTokenGrantStorage + 'static,
    {
        let tokens = self.config.tokens.clone();

        let refresh = RefreshTokenGrantHandler::new(
            strategy.clone(),
            strategy.clone(),
            Arc::clone(&storage),
            &tokens,
        );
        let client_credentials =
            ClientCredentialsGrantHandler::new(strategy.clone(), Arc::clone(&storage), &tokens);
        let migration =
            StorageTokenMigrationHandler::new(strategy.clone(), strategy, storage, &tokens);

        self.token_handler(Arc::new(refresh))
            .token_handler(Arc::new(client_credentials))
            .migration_handler(Arc::new(migration))
    }

    /// Builds the provider.
    #[must_use]
    pub fn build(self) -> OAuth2Provider {
        OAuth2Provider {
            authenticator: ClientAuthenticator::new(self.clients, self.hasher),
            config: self.config,
            token_handlers: self.token_handlers,
            migration_handlers: self.migration_handlers,
        }
    }
}

// ============================================================================
// Provider
// ============================================================================

/// Token endpoint and token migration entry points.
pub struct OAuth2Provider {
    authenticator: ClientAuthenticator,
    config: Config,
    token_handlers: TokenEndpointHandlers,
    migration_handlers: TokenMigrationHandlers,
}

impl OAuth2Provider {
    /// Returns the provider configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Parses, authenticates and validates a token endpoint request.
    ///
    /// The returned request has passed the validate phase of at least one
    /// grant handler and is ready for [`Self::new_access_response`].
    ///
    /// # Errors
    ///
    /// - [`OAuth2Error::InvalidRequest`] for a malformed request or when no
    ///   handler accepts the grant type
    /// - [`OAuth2Error::InvalidClient`] when client authentication fails
    /// - any error raised by the handler the grant belongs to
    pub async fn new_access_request(
        &self,
        request: &EndpointRequest,
        session: Session,
    ) -> OAuth2Result<AccessRequest> {
        request.require_post()?;
        let form = request.form()?;

        let mut access_request = AccessRequest::new();
        access_request.session = session;
        access_request.requested_scopes =
            Arguments::parse(form.get("scope").map_or("", String::as_str));
        access_request.grant_types =
            Arguments::parse(form.get("grant_type").map_or("", String::as_str));

        if access_request.grant_types.is_empty() {
            return Err(OAuth2Error::InvalidRequest("no grant type given".to_string()));
        }

        let credentials = extract_credentials(request, &form)?;
        access_request.form = form;
        access_request.client = self.authenticator.authenticate(&credentials).await?;

        self.token_handlers.handle_request(&mut access_request).await?;

        tracing::debug!(
            request_id = %access_request.id,
            client_id = %access_request.client.id,
            grant_types = %access_request.grant_types,
            "access request accepted"
        );

        Ok(access_request)
    }

    /// Issues tokens for an accepted access request.
    ///
    /// # Errors
    ///
    /// Returns the first handler error, or [`OAuth2Error::ServerError`] if
    /// no handler produced an access token.
    pub async fn new_access_response(
        &self,
        request: &AccessRequest,
    ) -> OAuth2Result<AccessResponse> {
        let mut response = AccessResponse::new();
        self.token_handlers
            .populate_response(request, &mut response)
            .await?;
        Ok(response)
    }

    /// Imports a token pair issued by another OAuth 2.0 system.
    ///
    /// The caller authenticates with HTTP Basic and must be a confidential
    /// client holding the migration scope. The `client` form field carries
    /// the base64 encoded `id:secret` of the client the tokens were issued
    /// to, which must already exist in this system.
    ///
    /// # Errors
    ///
    /// - [`OAuth2Error::InvalidRequest`] for a malformed request
    /// - [`OAuth2Error::InvalidTokenFormat`] when `token` is missing
    /// - [`OAuth2Error::InvalidClient`] when either client fails checks
    /// - any error raised by a migration handler
    pub async fn new_token_migration_request(&self, request: &EndpointRequest) -> OAuth2Result<()> {
        request.require_post()?;
        let form = request.form()?;

        let field = |key: &str| form.get(key).map_or("", String::as_str).to_string();

        let mut token = field("token");
        if token.is_empty() {
            return Err(OAuth2Error::InvalidTokenFormat(
                "the token to migrate is missing".to_string(),
            ));
        }
        let mut refresh_token = field("refresh_token");

        let basic = request.basic_auth().ok_or_else(|| {
            OAuth2Error::InvalidRequest("HTTP authorization header missing or invalid".to_string())
        })?;
        let credentials =
            decode_credentials(&basic.username, &basic.password, CredentialLocation::Header)?;

        let migrator = self.authenticator.lookup(&credentials.id).await?;
        if migrator.is_public() {
            tracing::warn!(client_id = %migrator.id, "public client attempted token migration");
            return Err(OAuth2Error::InvalidClient(
                "only internal clients may migrate".to_string(),
            ));
        }
        self.authenticator
            .verify_secret(&migrator, &credentials.secret)
            .await?;

        let required_scope = self.config.migration.required_scope.as_str();
        if !migrator.scopes.has(&[required_scope]) {
            tracing::warn!(
                client_id = %migrator.id,
                required_scope,
                "client lacks migration scope"
            );
            return Err(OAuth2Error::InvalidClient(format!(
                "the client is not allowed to migrate tokens without scope '{required_scope}'"
            )));
        }

        let original = original_client_credentials(&field("client"))?;
        let original_client = self.authenticator.lookup(&original.id).await?;
        if !original.secret.is_empty() && !original_client.is_public() {
            self.authenticator
                .verify_secret(&original_client, &original.secret)
                .await?;
        }

        let session = Session::new(original.id.as_str())
            .with_username(field("username"))
            .with_extra(MIGRATED_EXTRA, true);

        let mut access_request = AccessRequest::new();
        access_request.requested_scopes = original_client.scopes.clone();
        access_request.granted_scopes = Arguments::parse_space_delimited(&field("scope"));
        access_request.client = original_client;
        access_request.session = session;
        access_request.form = form;

        if !token.contains('.') {
            token.insert(0, '.');
        }
        if !refresh_token.is_empty() && !refresh_token.contains('.') {
            refresh_token.insert(0, '.');
        }

        let mut response = AccessResponse::new();
        response.access_token = token;
        if !refresh_token.is_empty() {
            response.set_extra("refresh_token", refresh_token);
        }
        response.set_extra(MIGRATED_EXTRA, true);

        self.migration_handlers
            .migrate(&mut access_request, &response)
            .await?;

        tracing::debug!(
            migrator = %migrator.id,
            client_id = %access_request.client.id,
            "tokens migrated"
        );

        Ok(())
    }
}

/// Decodes the `client` field of a migration request.
fn original_client_credentials(encoded: &str) -> OAuth2Result<ClientCredentials> {
    if encoded.is_empty() {
        return Err(OAuth2Error::InvalidClient(
            "the original client is missing".to_string(),
        ));
    }

    let decoded = STANDARD
        .decode(encoded)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .ok_or_else(|| {
            OAuth2Error::InvalidClient("the original client is not valid base64".to_string())
        })?;
    let (id, secret) = decoded.split_once(':').ok_or_else(|| {
        OAuth2Error::InvalidClient("the original client is not in the form id:secret".to_string())
    })?;

    Ok(decode_credentials(id, secret, CredentialLocation::Body)?)
}
