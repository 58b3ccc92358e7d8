//! Token session data.
//!
//! A session travels with an access request and is persisted alongside
//! every token issued for it.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Kinds of tokens a session can carry an expiry for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// OAuth 2.0 access token.
    AccessToken,
    /// OAuth 2.0 refresh token.
    RefreshToken,
    /// Authorization code.
    AuthorizeCode,
    /// `OpenID` Connect ID token.
    IdToken,
}

impl TokenKind {
    /// Returns the wire name of the token kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AccessToken => "access_token",
            Self::RefreshToken => "refresh_token",
            Self::AuthorizeCode => "authorize_code",
            Self::IdToken => "id_token",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-grant session state.
///
/// All fields are owned, so `clone()` is a deep copy: a cloned session
/// shares no mutable state with the original.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Subject the tokens are issued for.
    #[serde(default)]
    pub subject: String,

    /// Resource owner username, if any.
    #[serde(default)]
    pub username: String,

    /// Expiry per token kind.
    #[serde(default)]
    pub expires_at: HashMap<TokenKind, DateTime<Utc>>,

    /// Additional claims.
    #[serde(default)]
    pub extra: Map<String, Value>,
}

impl Session {
    /// Creates a session for a subject.
    #[must_use]
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            ..Self::default()
        }
    }

    /// Sets the username.
    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    /// Adds an extra claim.
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Returns the expiry for a token kind, if set.
    #[must_use]
    pub fn expires_at(&self, kind: TokenKind) -> Option<DateTime<Utc>> {
        self.expires_at.get(&kind).copied()
    }

    /// Sets the expiry for a token kind.
    pub fn set_expires_at(&mut self, kind: TokenKind, at: DateTime<Utc>) {
        self.expires_at.insert(kind, at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[test]
    fn clone_is_independent() {
        let mut original = Session::new("peter").with_extra("tags", serde_json::json!(["a"]));
        original.set_expires_at(TokenKind::AccessToken, Utc::now());

        let mut copy = original.clone();
        copy.set_expires_at(TokenKind::AccessToken, Utc::now() + TimeDelta::hours(1));
        copy.extra.insert("tags".to_string(), serde_json::json!(["b"]));
        copy.subject = "other".to_string();

        assert_eq!(original.subject, "peter");
        assert_eq!(original.extra["tags"], serde_json::json!(["a"]));
        assert_ne!(
            original.expires_at(TokenKind::AccessToken),
            copy.expires_at(TokenKind::AccessToken)
        );
    }

    #[test]
    fn expiry_map_survives_serialization() {
        let mut session = Session::new("peter");
        let at = Utc::now();
        session.set_expires_at(TokenKind::RefreshToken, at);

        let json = serde_json::to_string(&session).unwrap();
        assert!(json.contains("refresh_token"));

        let parsed: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.expires_at(TokenKind::RefreshToken), Some(at));
        assert_eq!(parsed.expires_at(TokenKind::AccessToken), None);
    }
}
