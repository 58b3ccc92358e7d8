//! # wd-core
//!
//! Core configuration and error handling for Warden.
//!
//! This crate provides the settings shared by every other Warden crate:
//! token lifespans, the token migration policy, request deadlines and
//! secret hashing costs.
//!
//! ## Modules
//!
//! - [`config`] - Typed configuration with defaults and environment loading
//! - [`error`] - Core error type

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;

pub use config::{
    Config, HasherConfig, MAX_LIFESPAN_SECS, MigrationConfig, ServerConfig, TokenConfig,
};
pub use error::{Error, Result};
