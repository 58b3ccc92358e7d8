//! Grant type handlers for the token endpoint.
//!
//! - `refresh_token`: Exchange a refresh token for new tokens
//! - `client_credentials`: Client authenticates directly for service-to-service
//!
//! Each handler implements [`TokenEndpointHandler`](crate::handler::TokenEndpointHandler)
//! and returns `NotApplicable` for any request whose grant types are not
//! exactly its own.

pub mod client_credentials;
pub mod refresh;

use chrono::{DateTime, TimeDelta, Utc};
use wd_model::{AccessRequest, TokenKind};

pub use client_credentials::ClientCredentialsGrantHandler;
pub use refresh::RefreshTokenGrantHandler;

/// Scope a grant must carry for a refresh token to be exchangeable.
pub const OFFLINE_SCOPE: &str = "offline";

/// Seconds until the token of `kind` expires.
///
/// Uses the session expiry when set, otherwise the configured lifespan.
#[must_use]
pub fn expires_in(
    request: &AccessRequest,
    kind: TokenKind,
    lifespan: TimeDelta,
    now: DateTime<Utc>,
) -> i64 {
    request
        .session
        .expires_at(kind)
        .map_or(lifespan, |expires_at| expires_at - now)
        .num_seconds()
}
