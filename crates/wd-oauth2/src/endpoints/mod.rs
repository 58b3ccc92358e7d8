//! OAuth 2.0 endpoint handlers for Axum.
//!
//! - Token (`/oauth2/token`)
//! - Token migration (`/oauth2/token/migrate`)
//!
//! ## Router Setup
//!
//! Use [`oauth2_router`] to create a configured Axum router with all endpoints.

mod migration;
mod router;
mod state;
mod token;

use std::time::Duration;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::error::{OAuth2Error, OAuth2Result};

pub use migration::migrate;
pub use router::oauth2_router;
pub use state::OAuth2State;
pub use token::token;

/// Writes an RFC 6749 error object with the status of its kind.
pub(crate) fn error_response(err: &OAuth2Error) -> Response {
    if err.is_server_error() {
        tracing::error!(error = %err, "request failed with server error");
    } else {
        tracing::debug!(error = %err, code = err.error_code(), "request rejected");
    }

    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(err.to_error_response())).into_response()
}

/// Runs request work on its own task under a deadline.
///
/// The task is never aborted. Past the deadline the caller gets a server
/// error while the work still runs to completion, so storage writes and
/// their rollback are not split by a timeout or a dropped connection.
pub(crate) async fn run_with_deadline<T, F>(deadline: Duration, work: F) -> OAuth2Result<T>
where
    F: Future<Output = OAuth2Result<T>> + Send + 'static,
    T: Send + 'static,
{
    let task = tokio::spawn(work);
    match tokio::time::timeout(deadline, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => Err(OAuth2Error::ServerError(format!("request task failed: {e}"))),
        Err(_) => Err(OAuth2Error::ServerError(
            "request deadline exceeded".to_string(),
        )),
    }
}
