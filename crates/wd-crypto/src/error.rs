//! Crypto error types.

use thiserror::Error;

/// Errors raised by token signing and secret hashing.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// The signing secret is too short.
    #[error("signing secret must be at least {min} bytes, got {actual}")]
    WeakSecret {
        /// Minimum accepted length.
        min: usize,
        /// Length that was supplied.
        actual: usize,
    },

    /// A token is not in `key.signature` form.
    #[error("malformed token: {0}")]
    MalformedToken(&'static str),

    /// A token signature does not match its key.
    #[error("token signature is invalid")]
    SignatureMismatch,

    /// A secret did not match its hash.
    #[error("secret does not match")]
    SecretMismatch,

    /// Hashing failed or a stored hash could not be parsed.
    #[error("hashing failed: {0}")]
    Hash(String),
}

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;
