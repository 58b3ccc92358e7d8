//! # wd-storage
//!
//! Storage contracts for the Warden token endpoint.
//!
//! Token sessions are always keyed by token *signature*, never by the raw
//! token. Lookups that find nothing fail with [`StorageError::NotFound`];
//! callers detect it with [`StorageError::is_not_found`].
//!
//! ## Modules
//!
//! - [`client`] - Client lookup
//! - [`error`] - Storage error type
//! - [`memory`] - In-memory reference store
//! - [`token`] - Access and refresh token session storage

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod error;
pub mod memory;
pub mod token;

pub use client::ClientStore;
pub use error::{StorageError, StorageResult};
pub use memory::MemoryStore;
pub use token::{AccessTokenStorage, RefreshTokenGrantStorage, RefreshTokenStorage};
