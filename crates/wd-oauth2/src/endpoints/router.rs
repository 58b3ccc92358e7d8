//! OAuth 2.0 router configuration.

use axum::{Router, routing::post};

use super::migration::migrate;
use super::state::OAuth2State;
use super::token::token;

/// Creates the OAuth 2.0 router.
///
/// # Endpoints
///
/// | Method | Path                     | Handler   | Description            |
/// |--------|--------------------------|-----------|------------------------|
/// | POST   | `/oauth2/token`          | `token`   | Token endpoint         |
/// | POST   | `/oauth2/token/migrate`  | `migrate` | Foreign token import   |
///
/// # Usage
///
/// ```rust,ignore
/// use wd_oauth2::endpoints::{oauth2_router, OAuth2State};
///
/// let app = Router::new()
///     .merge(oauth2_router())
///     .with_state(OAuth2State::new(provider));
/// ```
pub fn oauth2_router() -> Router<OAuth2State> {
    Router::new()
        .route("/oauth2/token", post(token))
        .route("/oauth2/token/migrate", post(migrate))
}
