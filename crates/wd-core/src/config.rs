//! Configuration management for Warden.
//!
//! Configuration is built from defaults, optionally overridden by `WD_*`
//! environment variables (a `.env` file is honoured when present).
//!
//! | Variable | Field | Default |
//! |----------|-------|---------|
//! | `WD_ACCESS_TOKEN_LIFESPAN` | `tokens.access_token_lifespan` | `3600` |
//! | `WD_REFRESH_TOKEN_LIFESPAN` | `tokens.refresh_token_lifespan` | `2592000` |
//! | `WD_MIGRATION_SCOPE` | `migration.required_scope` | `hydra.token.migration` |
//! | `WD_REQUEST_TIMEOUT` | `server.request_timeout` | `30` |
//! | `WD_HASHER_MEMORY_COST` | `hasher.memory_cost` | `19456` |
//! | `WD_HASHER_TIME_COST` | `hasher.time_cost` | `2` |
//! | `WD_HASHER_PARALLELISM` | `hasher.parallelism` | `1` |

use std::str::FromStr;
use std::time::Duration;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Scope a client must hold to import tokens from another OAuth 2.0 system.
pub const DEFAULT_MIGRATION_SCOPE: &str = "hydra.token.migration";

/// Upper bound for token lifespans in seconds (100 years).
pub const MAX_LIFESPAN_SECS: i64 = 100 * 365 * 24 * 60 * 60;

/// Main configuration structure for Warden.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Token lifespans.
    pub tokens: TokenConfig,
    /// Token migration policy.
    pub migration: MigrationConfig,
    /// HTTP boundary settings.
    pub server: ServerConfig,
    /// Client secret hashing costs.
    pub hasher: HasherConfig,
}

/// Token lifespan configuration.
///
/// Lifespans are expressed in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Access token lifespan.
    pub access_token_lifespan: i64,
    /// Refresh token lifespan.
    ///
    /// A negative value makes refresh tokens permanent: the presented
    /// refresh token is re-issued instead of being rotated. Zero disables
    /// the expiry check.
    pub refresh_token_lifespan: i64,
}

/// Token migration configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationConfig {
    /// Scope the migrating client must hold.
    pub required_scope: String,
}

/// HTTP boundary configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Deadline for a single endpoint request, in seconds.
    pub request_timeout: u64,
}

/// Argon2id cost parameters for client secret hashing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HasherConfig {
    /// Memory cost in KiB.
    pub memory_cost: u32,
    /// Time cost (iterations).
    pub time_cost: u32,
    /// Parallelism factor.
    pub parallelism: u32,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            access_token_lifespan: 3600,     // 1 hour
            refresh_token_lifespan: 2_592_000, // 30 days
        }
    }
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            required_scope: DEFAULT_MIGRATION_SCOPE.to_string(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { request_timeout: 30 }
    }
}

impl Default for HasherConfig {
    fn default() -> Self {
        // OWASP recommended settings for Argon2id
        Self {
            memory_cost: 19 * 1024, // 19 MiB
            time_cost: 2,
            parallelism: 1,
        }
    }
}

impl TokenConfig {
    /// Returns the access token lifespan, clamped to [`MAX_LIFESPAN_SECS`].
    #[must_use]
    pub fn access_token_lifespan(&self) -> TimeDelta {
        lifespan(self.access_token_lifespan)
    }

    /// Returns the refresh token lifespan, clamped to [`MAX_LIFESPAN_SECS`].
    #[must_use]
    pub fn refresh_token_lifespan(&self) -> TimeDelta {
        lifespan(self.refresh_token_lifespan)
    }

    /// Returns `true` when refresh tokens are re-issued rather than rotated.
    #[must_use]
    pub const fn permanent_refresh_tokens(&self) -> bool {
        self.refresh_token_lifespan < 0
    }
}

fn lifespan(secs: i64) -> TimeDelta {
    TimeDelta::seconds(secs.clamp(-MAX_LIFESPAN_SECS, MAX_LIFESPAN_SECS))
}

impl ServerConfig {
    /// Returns the request deadline.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

impl Config {
    /// Loads configuration from the process environment.
    ///
    /// A `.env` file in the working directory is loaded first when present.
    /// Unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] if a variable cannot be parsed and
    /// [`Error::Config`] if the result fails [`Config::validate`].
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// See [`Config::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let config = Self {
            tokens: TokenConfig {
                access_token_lifespan: parse_or(
                    &lookup,
                    "WD_ACCESS_TOKEN_LIFESPAN",
                    defaults.tokens.access_token_lifespan,
                )?,
                refresh_token_lifespan: parse_or(
                    &lookup,
                    "WD_REFRESH_TOKEN_LIFESPAN",
                    defaults.tokens.refresh_token_lifespan,
                )?,
            },
            migration: MigrationConfig {
                required_scope: lookup("WD_MIGRATION_SCOPE")
                    .unwrap_or(defaults.migration.required_scope),
            },
            server: ServerConfig {
                request_timeout: parse_or(
                    &lookup,
                    "WD_REQUEST_TIMEOUT",
                    defaults.server.request_timeout,
                )?,
            },
            hasher: HasherConfig {
                memory_cost: parse_or(
                    &lookup,
                    "WD_HASHER_MEMORY_COST",
                    defaults.hasher.memory_cost,
                )?,
                time_cost: parse_or(&lookup, "WD_HASHER_TIME_COST", defaults.hasher.time_cost)?,
                parallelism: parse_or(
                    &lookup,
                    "WD_HASHER_PARALLELISM",
                    defaults.hasher.parallelism,
                )?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when a token lifespan is out of range,
    /// the request timeout is zero, or the migration scope is empty.
    pub fn validate(&self) -> Result<()> {
        if self.tokens.access_token_lifespan <= 0 {
            return Err(Error::Config(
                "access token lifespan must be positive".to_string(),
            ));
        }
        if self.tokens.access_token_lifespan > MAX_LIFESPAN_SECS {
            return Err(Error::Config(format!(
                "access token lifespan must not exceed {MAX_LIFESPAN_SECS} seconds"
            )));
        }
        if !(-MAX_LIFESPAN_SECS..=MAX_LIFESPAN_SECS).contains(&self.tokens.refresh_token_lifespan) {
            return Err(Error::Config(format!(
                "refresh token lifespan must be within {MAX_LIFESPAN_SECS} seconds of zero"
            )));
        }
        if self.migration.required_scope.trim().is_empty() {
            return Err(Error::Config(
                "migration scope must not be empty".to_string(),
            ));
        }
        if self.server.request_timeout == 0 {
            return Err(Error::Config(
                "request timeout must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| Error::invalid_value(key, e.to_string())),
        None => Ok(default),
    }
}
