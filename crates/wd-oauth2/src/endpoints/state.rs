//! Shared state for OAuth 2.0 endpoints.

use std::sync::Arc;

use crate::provider::OAuth2Provider;

/// Shared state for OAuth 2.0 endpoints.
#[derive(Clone)]
pub struct OAuth2State {
    /// Provider handling token and migration requests.
    pub provider: Arc<OAuth2Provider>,
}

impl OAuth2State {
    /// Creates a new endpoint state.
    #[must_use]
    pub fn new(provider: OAuth2Provider) -> Self {
        Self {
            provider: Arc::new(provider),
        }
    }
}
