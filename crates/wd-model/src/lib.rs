//! # wd-model
//!
//! Domain model for the Warden token endpoint.
//!
//! ## Modules
//!
//! - [`arguments`] - Ordered scope and grant type lists
//! - [`client`] - OAuth 2.0 client registrations
//! - [`request`] - Access requests persisted as grant sessions
//! - [`session`] - Session state and per-token expiries

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod arguments;
pub mod client;
pub mod request;
pub mod session;

pub use arguments::Arguments;
pub use client::Client;
pub use request::AccessRequest;
pub use session::{Session, TokenKind};
