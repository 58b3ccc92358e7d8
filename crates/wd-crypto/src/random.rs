//! Cryptographically secure random generation.
//!
//! Backed by the thread-local generator from `rand`, which is seeded from
//! the operating system and suitable for token material.

use rand::Rng;

/// Generates `len` random bytes.
#[must_use]
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    rand::rng().fill(&mut bytes[..]);
    bytes
}
