//! Token strategies.
//!
//! A strategy mints tokens, derives the storage signature of a presented
//! token, and checks a presented token's integrity and expiry. Handlers only
//! ever persist signatures.

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use thiserror::Error;
use wd_core::TokenConfig;
use wd_crypto::{CryptoError, HmacSha384, SignedToken, hmac};
use wd_model::{AccessRequest, TokenKind};

/// Errors raised by token strategies.
#[derive(Debug, Error)]
pub enum StrategyError {
    /// Token integrity check failed.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// The token has expired.
    #[error("token expired at {0}")]
    Expired(DateTime<Utc>),
}

/// Access token minting and validation.
#[async_trait]
pub trait AccessTokenStrategy: Send + Sync {
    /// Returns the storage signature of an access token.
    ///
    /// Returns the empty string when the token has no recognisable signature.
    fn access_token_signature(&self, token: &str) -> String;

    /// Generates an access token for a request.
    async fn generate_access_token(
        &self,
        request: &AccessRequest,
    ) -> Result<SignedToken, StrategyError>;

    /// Validates a presented access token.
    async fn validate_access_token(
        &self,
        request: &AccessRequest,
        token: &str,
    ) -> Result<(), StrategyError>;
}

/// Refresh token minting and validation.
#[async_trait]
pub trait RefreshTokenStrategy: Send + Sync {
    /// Returns the storage signature of a refresh token.
    ///
    /// Returns the empty string when the token has no recognisable signature.
    fn refresh_token_signature(&self, token: &str) -> String;

    /// Generates a refresh token for a request.
    async fn generate_refresh_token(
        &self,
        request: &AccessRequest,
    ) -> Result<SignedToken, StrategyError>;

    /// Validates a presented refresh token.
    async fn validate_refresh_token(
        &self,
        request: &AccessRequest,
        token: &str,
    ) -> Result<(), StrategyError>;
}

/// Opaque HMAC-SHA384 token strategy.
///
/// Access tokens expire at the session's access expiry, or `requested_at`
/// plus the access lifespan when the session carries none. Refresh tokens
/// expire only when the session carries a refresh expiry.
pub struct HmacShaStrategy {
    enigma: HmacSha384,
    access_token_lifespan: TimeDelta,
}

impl HmacShaStrategy {
    /// Creates a strategy from a signing secret.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::WeakSecret`] if the secret is too short.
    pub fn new(secret: &[u8], tokens: &TokenConfig) -> Result<Self, CryptoError> {
        Ok(Self {
            enigma: HmacSha384::new(secret)?,
            access_token_lifespan: tokens.access_token_lifespan(),
        })
    }

    fn validate(&self, token: &str, expires_at: DateTime<Utc>) -> Result<(), StrategyError> {
        if expires_at < Utc::now() {
            return Err(StrategyError::Expired(expires_at));
        }
        self.enigma.validate(token)?;
        Ok(())
    }
}

#[async_trait]
impl AccessTokenStrategy for HmacShaStrategy {
    fn access_token_signature(&self, token: &str) -> String {
        hmac::signature_of(token).to_string()
    }

    async fn generate_access_token(
        &self,
        _request: &AccessRequest,
    ) -> Result<SignedToken, StrategyError> {
        Ok(self.enigma.generate())
    }

    async fn validate_access_token(
        &self,
        request: &AccessRequest,
        token: &str,
    ) -> Result<(), StrategyError> {
        let expires_at = request
            .session
            .expires_at(TokenKind::AccessToken)
            .unwrap_or(request.requested_at + self.access_token_lifespan);
        self.validate(token, expires_at)
    }
}

#[async_trait]
impl RefreshTokenStrategy for HmacShaStrategy {
    fn refresh_token_signature(&self, token: &str) -> String {
        hmac::signature_of(token).to_string()
    }

    async fn generate_refresh_token(
        &self,
        _request: &AccessRequest,
    ) -> Result<SignedToken, StrategyError> {
        Ok(self.enigma.generate())
    }

    async fn validate_refresh_token(
        &self,
        request: &AccessRequest,
        token: &str,
    ) -> Result<(), StrategyError> {
        match request.session.expires_at(TokenKind::RefreshToken) {
            Some(expires_at) => self.validate(token, expires_at),
            None => Ok(self.enigma.validate(token)?),
        }
    }
}
