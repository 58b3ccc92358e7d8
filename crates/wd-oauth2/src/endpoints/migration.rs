//! Token migration endpoint handler.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
};

use crate::request::EndpointRequest;

use super::{error_response, run_with_deadline};
use super::state::OAuth2State;

/// POST `/oauth2/token/migrate`
///
/// Imports an access token and optional refresh token issued elsewhere.
/// Form fields: `token`, `refresh_token`, `client`, `username`, `scope`.
///
/// # Responses
///
/// - 200 OK: Empty body
/// - 400 Bad Request: Malformed request or token
/// - 401 Unauthorized: Migrating or original client rejected
/// - 500 Internal Server Error: Storage failure or deadline exceeded
pub async fn migrate(
    State(state): State<OAuth2State>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request = EndpointRequest::new(method, headers, body);
    let provider = Arc::clone(&state.provider);
    let deadline = provider.config().server.request_timeout();
    let work = async move { provider.new_token_migration_request(&request).await };

    match run_with_deadline(deadline, work).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(ref err) => error_response(err),
    }
}
