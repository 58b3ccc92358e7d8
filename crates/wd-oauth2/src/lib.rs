//! # wd-oauth2
//!
//! OAuth 2.0 token endpoint core for Warden.
//!
//! This crate implements:
//! - Client authentication (`client_secret_basic`, `client_secret_post`)
//! - A grant handler chain with `refresh_token` and `client_credentials`
//!   grants
//! - Import of tokens issued by another OAuth 2.0 system, with rollback
//! - Axum handlers for the token and migration endpoints
//!
//! ## Tokens
//!
//! Access and refresh tokens are opaque HMAC-SHA384 tokens of the form
//! `key.signature`. Only the signature is ever stored.
//!
//! ## Modules
//!
//! - [`client_auth`] - Credential extraction and client authentication
//! - [`endpoints`] - Axum HTTP handlers
//! - [`error`] - OAuth 2.0 error types following RFC 6749
//! - [`grants`] - Grant type handlers
//! - [`handler`] - Handler contracts and dispatch
//! - [`migration`] - Token migration handler
//! - [`provider`] - Provider composition and request orchestration
//! - [`request`] - Framework-neutral request view
//! - [`response`] - Token response type
//! - [`strategy`] - Token generation and validation strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client_auth;
pub mod endpoints;
pub mod error;
pub mod grants;
pub mod handler;
pub mod migration;
pub mod provider;
pub mod request;
pub mod response;
pub mod strategy;

pub use client_auth::{
    ClientAuthenticator, ClientCredentials, CredentialLocation, CredentialPart, CredentialsError,
    extract_credentials,
};
pub use endpoints::{OAuth2State, oauth2_router};
pub use error::{ErrorResponse, OAuth2Error, OAuth2Result};
pub use grants::{ClientCredentialsGrantHandler, OFFLINE_SCOPE, RefreshTokenGrantHandler};
pub use handler::{
    HandlerOutcome, TokenEndpointHandler, TokenEndpointHandlers, TokenMigrationHandler,
    TokenMigrationHandlers,
};
pub use migration::StorageTokenMigrationHandler;
pub use provider::{MIGRATED_EXTRA, OAuth2Provider, ProviderBuilder};
pub use request::{BasicCredentials, EndpointRequest, UnescapeError, form_unescape};
pub use response::AccessResponse;
pub use strategy::{AccessTokenStrategy, HmacShaStrategy, RefreshTokenStrategy, StrategyError};
