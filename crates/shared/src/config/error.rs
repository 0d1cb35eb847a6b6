//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A configuration variable has a value that cannot be parsed.
    #[error("Invalid value for {var}: {value}")]
    InvalidValue { var: String, value: String },

    /// Failed to load a .env file.
    #[error("Failed to load .env file from {path}: {source}")]
    EnvFileLoad {
        path: PathBuf,
        #[source]
        source: dotenv::Error,
    },
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_value_display_names_the_variable() {
        let err = ConfigError::InvalidValue {
            var: "MAREA_TEAM_JOB_QUOTA".to_string(),
            value: "lots".to_string(),
        };
        assert!(err.to_string().contains("MAREA_TEAM_JOB_QUOTA"));
        assert!(err.to_string().contains("lots"));
    }
}
