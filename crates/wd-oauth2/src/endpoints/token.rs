//! Token endpoint handler.
//!
//! Implements POST `/oauth2/token` for every grant type registered on the
//! provider.

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
};
use wd_model::Session;

use crate::error::OAuth2Result;
use crate::provider::OAuth2Provider;
use crate::request::EndpointRequest;
use crate::response::AccessResponse;

use super::{error_response, run_with_deadline};
use super::state::OAuth2State;

/// POST `/oauth2/token`
///
/// Exchanges a grant for tokens.
///
/// # Responses
///
/// - 200 OK: Token response JSON
/// - 400 Bad Request: Invalid request or grant
/// - 401 Unauthorized: Client authentication failed
/// - 500 Internal Server Error: Server error or deadline exceeded
pub async fn token(
    State(state): State<OAuth2State>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request = EndpointRequest::new(method, headers, body);
    let provider = Arc::clone(&state.provider);
    let deadline = provider.config().server.request_timeout();
    let work = async move { handle_token_request(&provider, &request).await };

    match run_with_deadline(deadline, work).await {
        Ok(response) => token_response(&response),
        Err(ref err) => error_response(err),
    }
}

/// Runs the validate and populate phases.
async fn handle_token_request(
    provider: &OAuth2Provider,
    request: &EndpointRequest,
) -> OAuth2Result<AccessResponse> {
    let access_request = provider
        .new_access_request(request, Session::default())
        .await?;
    provider.new_access_response(&access_request).await
}

/// Writes a successful token response (RFC 6749 section 5.1).
fn token_response(response: &AccessResponse) -> Response {
    let mut http = (StatusCode::OK, Json(response)).into_response();
    let headers = http.headers_mut();
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    http
}
