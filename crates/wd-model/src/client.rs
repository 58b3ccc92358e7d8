//! Client domain model.
//!
//! Clients are the applications that call the token endpoint. They are
//! loaded once per request and never mutated while the request runs.

use serde::{Deserialize, Serialize};

use crate::arguments::Arguments;

/// An OAuth 2.0 client registration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    /// OAuth `client_id`.
    pub id: String,

    /// Hashed client secret (PHC string). Empty for public clients.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub hashed_secret: String,

    /// Public clients cannot keep a secret and are never secret-verified.
    #[serde(default)]
    pub public: bool,

    /// Grant types this client may use.
    #[serde(default)]
    pub grant_types: Arguments,

    /// Scopes this client may request.
    #[serde(default)]
    pub scopes: Arguments,
}

impl Client {
    /// Creates a confidential client with no secret, grants or scopes.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Sets the hashed secret.
    #[must_use]
    pub fn with_hashed_secret(mut self, hashed_secret: impl Into<String>) -> Self {
        self.hashed_secret = hashed_secret.into();
        self
    }

    /// Marks the client as public.
    #[must_use]
    pub const fn public(mut self) -> Self {
        self.public = true;
        self
    }

    /// Sets the permitted grant types.
    #[must_use]
    pub fn with_grant_types<'a>(mut self, grant_types: impl IntoIterator<Item = &'a str>) -> Self {
        self.grant_types = grant_types.into_iter().collect();
        self
    }

    /// Sets the permitted scopes.
    #[must_use]
    pub fn with_scopes<'a>(mut self, scopes: impl IntoIterator<Item = &'a str>) -> Self {
        self.scopes = scopes.into_iter().collect();
        self
    }

    /// Returns `true` if the client is public.
    #[must_use]
    pub const fn is_public(&self) -> bool {
        self.public
    }
}
