//! # wd-crypto
//!
//! Cryptographic primitives for Warden using aws-lc-rs and Argon2id.
//!
//! ## CNSA 2.0 Compliance
//!
//! - Opaque tokens are authenticated with HMAC-SHA384 (no SHA-256)
//! - Client secrets are hashed with Argon2id
//!
//! ## Modules
//!
//! - [`error`] - Crypto error type
//! - [`hmac`] - Opaque HMAC-signed tokens and their lookup signatures
//! - [`random`] - Secure randomness
//! - [`secret`] - Client secret hashing

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod hmac;
pub mod random;
pub mod secret;

pub use error::{CryptoError, CryptoResult};
pub use hmac::{HmacSha384, SignedToken};
pub use secret::{Argon2Hasher, SecretHasher};
