//! OAuth 2.0 token endpoint error types.
//!
//! Implements the error responses of RFC 6749 section 5.2. Several internal
//! kinds share one wire code: a refresh token that is unknown and one that
//! was issued to another client both surface as `invalid_request`, so a
//! caller cannot tell which tokens exist.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use wd_storage::StorageError;

/// Token endpoint errors.
#[derive(Debug, Error)]
pub enum OAuth2Error {
    /// The request is missing a parameter, is malformed, or no handler
    /// recognised it.
    #[error("invalid_request: {0}")]
    InvalidRequest(String),

    /// Client authentication failed.
    #[error("invalid_client: {0}")]
    InvalidClient(String),

    /// The client may not use this grant.
    #[error("invalid_grant: {0}")]
    InvalidGrant(String),

    /// The request is well-formed but invalid for its grant: the token is
    /// unknown or invalid, or was issued to another client.
    #[error("invalid_request: {0}")]
    InvalidGrantRequest(String),

    /// The presented token has expired.
    #[error("invalid_grant: token expired: {0}")]
    TokenExpired(String),

    /// A scope required by the grant was never granted.
    #[error("invalid_scope: {0}")]
    ScopeNotGranted(String),

    /// The client requested a scope it may not receive.
    #[error("invalid_scope: {0}")]
    InvalidScope(String),

    /// A token is missing or not in a recognised format.
    #[error("invalid_token: {0}")]
    InvalidTokenFormat(String),

    /// Server error.
    #[error("server_error: {0}")]
    ServerError(String),

    /// Storage failure propagated unchanged.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A write failed and undoing an earlier write failed as well.
    #[error("rollback failed: {cleanup}: {source}")]
    RollbackFailed {
        /// The failure that triggered the rollback.
        #[source]
        source: StorageError,
        /// The failure of the compensating delete.
        cleanup: StorageError,
    },
}

impl OAuth2Error {
    /// Returns the OAuth 2.0 error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) | Self::InvalidGrantRequest(_) => "invalid_request",
            Self::InvalidClient(_) => "invalid_client",
            Self::InvalidGrant(_) | Self::TokenExpired(_) => "invalid_grant",
            Self::ScopeNotGranted(_) | Self::InvalidScope(_) => "invalid_scope",
            Self::InvalidTokenFormat(_) => "invalid_token",
            Self::ServerError(_) | Self::Storage(_) | Self::RollbackFailed { .. } => {
                "server_error"
            }
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::InvalidRequest(_)
            | Self::InvalidGrant(_)
            | Self::InvalidGrantRequest(_)
            | Self::TokenExpired(_)
            | Self::ScopeNotGranted(_)
            | Self::InvalidScope(_)
            | Self::InvalidTokenFormat(_) => 400,
            Self::InvalidClient(_) => 401,
            Self::ServerError(_) | Self::Storage(_) | Self::RollbackFailed { .. } => 500,
        }
    }

    /// Returns whether this error should be logged at error level.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        self.http_status() >= 500
    }

    /// Creates an error response for the wire.
    ///
    /// Server errors carry a generic description so storage details are not
    /// exposed to clients.
    #[must_use]
    pub fn to_error_response(&self) -> ErrorResponse {
        let description = if self.is_server_error() {
            "the authorization server encountered an unexpected condition".to_string()
        } else {
            self.to_string()
        };

        ErrorResponse {
            error: self.error_code().to_string(),
            error_description: Some(description),
            error_uri: None,
        }
    }
}

/// OAuth 2.0 error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code.
    pub error: String,

    /// Human-readable error description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,

    /// URI with more information about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_uri: Option<String>,
}

/// Result type for OAuth 2.0 operations.
pub type OAuth2Result<T> = Result<T, OAuth2Error>;
