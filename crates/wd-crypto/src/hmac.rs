//! Opaque HMAC-signed tokens.
//!
//! A token has the form `base64url(key) "." base64url(HMAC-SHA384(secret, key))`
//! where `key` is random. The part after the dot is the token's *signature*:
//! storage is keyed by it, so the raw token never needs to be persisted.

use aws_lc_rs::hmac;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use crate::error::{CryptoError, CryptoResult};
use crate::random::random_bytes;

/// Minimum length of the signing secret, in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// Length of the random token key, in bytes.
pub const TOKEN_KEY_LEN: usize = 32;

/// A freshly generated token and its lookup signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedToken {
    /// Token handed to the client.
    pub token: String,
    /// Signature used as the storage key.
    pub signature: String,
}

/// HMAC-SHA384 token generator and validator.
pub struct HmacSha384 {
    key: hmac::Key,
}

impl HmacSha384 {
    /// Creates a generator from a signing secret.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::WeakSecret`] if the secret is shorter than
    /// [`MIN_SECRET_LEN`].
    pub fn new(secret: &[u8]) -> CryptoResult<Self> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(CryptoError::WeakSecret {
                min: MIN_SECRET_LEN,
                actual: secret.len(),
            });
        }

        Ok(Self {
            key: hmac::Key::new(hmac::HMAC_SHA384, secret),
        })
    }

    /// Generates a new token.
    #[must_use]
    pub fn generate(&self) -> SignedToken {
        let key = random_bytes(TOKEN_KEY_LEN);
        let tag = hmac::sign(&self.key, &key);

        let signature = URL_SAFE_NO_PAD.encode(tag.as_ref());
        let token = format!("{}.{signature}", URL_SAFE_NO_PAD.encode(&key));

        SignedToken { token, signature }
    }

    /// Validates a token against the signing secret.
    ///
    /// The comparison is constant-time.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::MalformedToken`] if the token is not in
    /// `key.signature` form or either part is not base64url, and
    /// [`CryptoError::SignatureMismatch`] if the signature is wrong.
    pub fn validate(&self, token: &str) -> CryptoResult<()> {
        let (key, signature) = split(token).ok_or(CryptoError::MalformedToken(
            "expected exactly two dot-separated parts",
        ))?;

        if key.is_empty() || signature.is_empty() {
            return Err(CryptoError::MalformedToken("empty token part"));
        }

        let key = URL_SAFE_NO_PAD
            .decode(key)
            .map_err(|_| CryptoError::MalformedToken("key is not base64url"))?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| CryptoError::MalformedToken("signature is not base64url"))?;

        hmac::verify(&self.key, &key, &signature).map_err(|_| CryptoError::SignatureMismatch)
    }
}

/// Returns the lookup signature of a token.
///
/// This is the part after the dot, or the empty string when the token does
/// not have exactly two parts. No secret is needed.
#[must_use]
pub fn signature_of(token: &str) -> &str {
    split(token).map_or("", |(_, signature)| signature)
}

fn split(token: &str) -> Option<(&str, &str)> {
    let (key, signature) = token.split_once('.')?;
    if signature.contains('.') {
        return None;
    }
    Some((key, signature))
}
