//! Error handling for Warden core.
//!
//! Error messages name the offending setting but never echo secret values.

use thiserror::Error;

/// Result type alias using the core error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type.
#[derive(Debug, Error)]
pub enum Error {
    /// A configuration value could not be parsed.
    #[error("configuration error: {key} has an invalid value: {reason}")]
    InvalidValue {
        /// Name of the setting (environment variable or field).
        key: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// The configuration is syntactically valid but unusable.
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Creates an invalid value error.
    #[must_use]
    pub fn invalid_value(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_value_names_the_key() {
        let err = Error::invalid_value("WD_ACCESS_TOKEN_LIFESPAN", "not a number");
        let message = err.to_string();

        assert!(message.contains("WD_ACCESS_TOKEN_LIFESPAN"));
        assert!(message.contains("not a number"));
    }
}
