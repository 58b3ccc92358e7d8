//! Framework-neutral view of an incoming endpoint request.
//!
//! The provider works on [`EndpointRequest`] so it can be driven from Axum
//! handlers, tests, or another HTTP stack.

use std::collections::HashMap;
use std::string::FromUtf8Error;

use axum::body::Bytes;
use axum::http::{HeaderMap, Method, header};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;
use thiserror::Error;

use crate::error::{OAuth2Error, OAuth2Result};

/// An HTTP request as seen by the token and migration endpoints.
#[derive(Debug, Clone)]
pub struct EndpointRequest {
    /// HTTP method.
    pub method: Method,
    /// Request headers.
    pub headers: HeaderMap,
    /// Raw request body.
    pub body: Bytes,
}

/// Credentials carried by an `Authorization: Basic` header.
///
/// Parts are base64-decoded but still form-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    /// Encoded user id (client id).
    pub username: String,
    /// Encoded password (client secret).
    pub password: String,
}

impl EndpointRequest {
    /// Creates a request view.
    #[must_use]
    pub const fn new(method: Method, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            method,
            headers,
            body,
        }
    }

    /// Creates a POST request with a form-encoded body.
    #[must_use]
    pub fn form_post(pairs: &[(&str, &str)]) -> Self {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish();

        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/x-www-form-urlencoded"),
        );

        Self::new(Method::POST, headers, Bytes::from(body))
    }

    /// Adds an `Authorization: Basic` header built from raw parts.
    ///
    /// Each part is form-encoded before base64 encoding, as RFC 6749
    /// section 2.3.1 requires.
    #[must_use]
    pub fn with_basic_auth(mut self, username: &str, password: &str) -> Self {
        let encoded = STANDARD.encode(format!(
            "{}:{}",
            urlencoding::encode(username),
            urlencoding::encode(password)
        ));
        if let Ok(value) = header::HeaderValue::from_str(&format!("Basic {encoded}")) {
            self.headers.insert(header::AUTHORIZATION, value);
        }
        self
    }

    /// Fails unless the request is a POST.
    ///
    /// # Errors
    ///
    /// Returns [`OAuth2Error::InvalidRequest`] for any other method.
    pub fn require_post(&self) -> OAuth2Result<()> {
        if self.method == Method::POST {
            Ok(())
        } else {
            Err(OAuth2Error::InvalidRequest(format!(
                "HTTP method is {}, expected POST",
                self.method
            )))
        }
    }

    /// Returns `true` if the body is declared as JSON.
    fn is_json(&self) -> bool {
        self.headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.trim_start().starts_with("application/json"))
    }

    /// Parses the body into form values, keeping the first value per key.
    ///
    /// A `application/json` body is accepted as an object: string members
    /// are copied and arrays of strings are joined with spaces. Other
    /// members are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`OAuth2Error::InvalidRequest`] if a JSON body is not an
    /// object.
    pub fn form(&self) -> OAuth2Result<HashMap<String, String>> {
        if self.is_json() {
            return parse_json_form(&self.body);
        }

        let mut form = HashMap::new();
        for (key, value) in url::form_urlencoded::parse(&self.body) {
            form.entry(key.into_owned()).or_insert_with(|| value.into_owned());
        }
        Ok(form)
    }

    /// Returns the credentials of an `Authorization: Basic` header.
    ///
    /// `None` when the header is absent, uses another scheme, or is not
    /// valid base64 with a colon separator.
    #[must_use]
    pub fn basic_auth(&self) -> Option<BasicCredentials> {
        let value = self.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
        let (scheme, encoded) = value.trim().split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("basic") {
            return None;
        }

        let decoded = STANDARD.decode(encoded.trim()).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (username, password) = decoded.split_once(':')?;

        Some(BasicCredentials {
            username: username.to_string(),
            password: password.to_string(),
        })
    }
}

fn parse_json_form(body: &[u8]) -> OAuth2Result<HashMap<String, String>> {
    let object: serde_json::Map<String, Value> = serde_json::from_slice(body).map_err(|_| {
        OAuth2Error::InvalidRequest("request does not contain a valid body or form".to_string())
    })?;

    let mut form = HashMap::new();
    for (key, value) in object {
        match value {
            Value::String(s) => {
                form.insert(key, s);
            }
            Value::Array(items) => {
                let strings: Option<Vec<&str>> = items.iter().map(Value::as_str).collect();
                if let Some(strings) = strings {
                    form.insert(key, strings.join(" "));
                }
            }
            _ => {}
        }
    }
    Ok(form)
}

/// Reasons a form value cannot be unescaped.
#[derive(Debug, Error)]
pub enum UnescapeError {
    /// A `%` not followed by two hex digits.
    #[error("invalid percent escape at byte {0}")]
    InvalidEscape(usize),

    #[error("unescaped value is not UTF-8: {0}")]
    InvalidUtf8(#[from] FromUtf8Error),
}

/// Decodes an `application/x-www-form-urlencoded` value (`+` is a space).
///
/// # Errors
///
/// Fails on a malformed percent escape or non-UTF-8 output.
pub fn form_unescape(raw: &str) -> Result<String, UnescapeError> {
    let bytes = raw.as_bytes();
    let mut i = 0;
    while let Some(offset) = bytes[i..].iter().position(|&b| b == b'%') {
        let at = i + offset;
        let valid = bytes
            .get(at + 1..at + 3)
            .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
        if !valid {
            return Err(UnescapeError::InvalidEscape(at));
        }
        i = at + 3;
    }

    let spaced = raw.replace('+', " ");
    Ok(urlencoding::decode(&spaced)?.into_owned())
}
