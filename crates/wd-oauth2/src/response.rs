//! Access response model.
//!
//! Serializes to the RFC 6749 section 5.1 token response. Extension
//! members such as `refresh_token` are flattened into the top-level object.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use wd_model::Arguments;
use wd_model::arguments::space_delimited;

/// Token endpoint success response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccessResponse {
    /// Issued access token.
    pub access_token: String,

    /// Token type, `bearer` for every grant handled here.
    pub token_type: String,

    /// Seconds until the access token expires.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,

    /// Granted scopes.
    #[serde(
        rename = "scope",
        with = "space_delimited",
        default,
        skip_serializing_if = "Arguments::is_empty"
    )]
    pub scopes: Arguments,

    /// Extension members.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AccessResponse {
    /// Creates an empty response.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an extension member.
    pub fn set_extra(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.extra.insert(key.into(), value.into());
    }

    /// Returns an extension member.
    #[must_use]
    pub fn get_extra(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// Returns the `refresh_token` member when it is a string.
    #[must_use]
    pub fn refresh_token(&self) -> Option<&str> {
        self.get_extra("refresh_token").and_then(Value::as_str)
    }
}
