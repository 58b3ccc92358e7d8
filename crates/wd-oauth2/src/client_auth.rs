//! Client authentication for the token endpoint.
//!
//! Implements the password-based methods of RFC 6749 section 2.3.1:
//! - `client_secret_basic` - HTTP Basic authentication
//! - `client_secret_post` - Credentials in request body
//!
//! Both parts of the credentials are form-encoded on the wire and are
//! decoded independently. Public clients are never secret-verified.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use wd_crypto::SecretHasher;
use wd_model::Client;
use wd_storage::ClientStore;

use crate::error::{OAuth2Error, OAuth2Result};
use crate::request::{EndpointRequest, form_unescape};

/// Description of every client authentication failure.
///
/// Unknown clients and wrong secrets must be indistinguishable to callers.
pub const CLIENT_AUTHENTICATION_FAILED: &str = "client authentication failed";

fn authentication_failed() -> OAuth2Error {
    OAuth2Error::InvalidClient(CLIENT_AUTHENTICATION_FAILED.to_string())
}

/// Decoded client credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    /// OAuth `client_id`.
    pub id: String,
    /// Client secret; empty when none was sent.
    pub secret: String,
}

/// Which credential part failed to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialPart {
    /// The client id.
    ClientId,
    /// The client secret.
    ClientSecret,
}

/// Where the credentials were read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialLocation {
    /// `Authorization: Basic` header.
    Header,
    /// Request body.
    Body,
}

impl fmt::Display for CredentialPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ClientId => "client id",
            Self::ClientSecret => "client secret",
        })
    }
}

impl fmt::Display for CredentialLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Header => "HTTP authorization header",
            Self::Body => "request body",
        })
    }
}

/// Credential extraction failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialsError {
    /// Neither a Basic header nor a `client_id` field was present.
    #[error(
        "client credentials missing or malformed in both the HTTP authorization header \
         and the request body"
    )]
    Missing,

    /// A part could not be decoded from `application/x-www-form-urlencoded`.
    #[error(
        "the {part} in the {location} could not be decoded from \
         \"application/x-www-form-urlencoded\""
    )]
    Malformed {
        /// The part that failed.
        part: CredentialPart,
        /// Where it was read from.
        location: CredentialLocation,
    },
}

impl From<CredentialsError> for OAuth2Error {
    fn from(err: CredentialsError) -> Self {
        Self::InvalidRequest(err.to_string())
    }
}

/// Decodes a pair of form-encoded credential parts.
///
/// # Errors
///
/// Returns [`CredentialsError::Malformed`] naming the part that failed.
pub fn decode_credentials(
    id: &str,
    secret: &str,
    location: CredentialLocation,
) -> Result<ClientCredentials, CredentialsError> {
    let id = form_unescape(id).map_err(|_| CredentialsError::Malformed {
        part: CredentialPart::ClientId,
        location,
    })?;
    let secret = form_unescape(secret).map_err(|_| CredentialsError::Malformed {
        part: CredentialPart::ClientSecret,
        location,
    })?;

    Ok(ClientCredentials { id, secret })
}

/// Extracts client credentials from the Basic header, else the form body.
///
/// A header that is not valid Basic authentication is ignored and the body
/// is used instead.
///
/// # Errors
///
/// Returns [`CredentialsError::Missing`] if no `client_id` can be found and
/// [`CredentialsError::Malformed`] if a part cannot be decoded.
pub fn extract_credentials(
    request: &EndpointRequest,
    form: &HashMap<String, String>,
) -> Result<ClientCredentials, CredentialsError> {
    if let Some(basic) = request.basic_auth() {
        return decode_credentials(&basic.username, &basic.password, CredentialLocation::Header);
    }

    let id = form.get("client_id").map_or("", String::as_str);
    if id.is_empty() {
        return Err(CredentialsError::Missing);
    }
    let secret = form.get("client_secret").map_or("", String::as_str);

    decode_credentials(id, secret, CredentialLocation::Body)
}

/// Storage-backed client authenticator.
#[derive(Clone)]
pub struct ClientAuthenticator {
    clients: Arc<dyn ClientStore>,
    hasher: Arc<dyn SecretHasher>,
}

impl ClientAuthenticator {
    /// Creates an authenticator.
    #[must_use]
    pub fn new(clients: Arc<dyn ClientStore>, hasher: Arc<dyn SecretHasher>) -> Self {
        Self { clients, hasher }
    }

    /// Loads a client and verifies its secret unless it is public.
    ///
    /// # Errors
    ///
    /// Returns [`OAuth2Error::InvalidClient`] if the client is unknown or
    /// the secret does not match.
    pub async fn authenticate(&self, credentials: &ClientCredentials) -> OAuth2Result<Client> {
        let client = self.lookup(&credentials.id).await?;

        if !client.is_public() {
            self.verify_secret(&client, &credentials.secret).await?;
        }

        Ok(client)
    }

    /// Loads a client by id.
    ///
    /// # Errors
    ///
    /// Returns [`OAuth2Error::InvalidClient`] for any lookup failure, so an
    /// unknown client and a storage outage look alike to the caller.
    pub async fn lookup(&self, client_id: &str) -> OAuth2Result<Client> {
        self.clients.get_client(client_id).await.map_err(|e| {
            if e.is_not_found() {
                tracing::warn!(client_id, "unknown client");
            } else {
                tracing::error!(client_id, error = %e, "client lookup failed");
            }
            authentication_failed()
        })
    }

    /// Compares a secret against the client's stored hash.
    ///
    /// Runs on the blocking thread pool.
    ///
    /// # Errors
    ///
    /// Returns [`OAuth2Error::InvalidClient`] on mismatch or an unparsable
    /// hash, and [`OAuth2Error::ServerError`] if the hashing task fails.
    pub async fn verify_secret(&self, client: &Client, secret: &str) -> OAuth2Result<()> {
        let hasher = Arc::clone(&self.hasher);
        let hashed = client.hashed_secret.clone();
        let candidate = secret.to_string();

        let result = tokio::task::spawn_blocking(move || {
            hasher.compare(&hashed, candidate.as_bytes())
        })
        .await
        .map_err(|e| OAuth2Error::ServerError(format!("secret comparison aborted: {e}")))?;

        result.map_err(|e| {
            tracing::warn!(client_id = %client.id, error = %e, "client authentication failed");
            authentication_failed()
        })
    }
}
