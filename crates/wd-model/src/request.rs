//! Access request model.
//!
//! An [`AccessRequest`] is built once per token endpoint call, mutated by
//! the grant handler that accepts it, and persisted under the signature of
//! every token it produces.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::arguments::Arguments;
use crate::client::Client;
use crate::session::Session;

/// A token endpoint request and the grant it results in.
///
/// Handlers are responsible for keeping `granted_scopes` a subset of what
/// the client may receive; the container does not enforce it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessRequest {
    /// Request identifier.
    pub id: Uuid,

    /// When the request was received.
    pub requested_at: DateTime<Utc>,

    /// Authenticated client.
    pub client: Client,

    /// Scopes requested by the client.
    #[serde(default)]
    pub requested_scopes: Arguments,

    /// Scopes granted by the accepting handler.
    #[serde(default)]
    pub granted_scopes: Arguments,

    /// Grant types named by the request.
    #[serde(default)]
    pub grant_types: Arguments,

    /// Form values of the request (first value per key).
    #[serde(default)]
    pub form: HashMap<String, String>,

    /// Session state.
    #[serde(default)]
    pub session: Session,
}

impl AccessRequest {
    /// Creates an empty request stamped with a fresh id and the current time.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: Uuid::now_v7(),
            requested_at: Utc::now(),
            client: Client::default(),
            requested_scopes: Arguments::new(),
            granted_scopes: Arguments::new(),
            grant_types: Arguments::new(),
            form: HashMap::new(),
            session: Session::default(),
        }
    }

    /// Returns a form value, if present.
    #[must_use]
    pub fn form_value(&self, key: &str) -> Option<&str> {
        self.form.get(key).map(String::as_str)
    }

    /// Returns a form value or the empty string.
    #[must_use]
    pub fn form_value_or_empty(&self, key: &str) -> &str {
        self.form_value(key).unwrap_or_default()
    }

    /// Grants a scope.
    pub fn grant_scope(&mut self, scope: impl Into<String>) {
        let scope = scope.into();
        if !self.granted_scopes.contains(&scope) {
            self.granted_scopes.push(scope);
        }
    }
}

impl Default for AccessRequest {
    fn default() -> Self {
        Self::new()
    }
}
