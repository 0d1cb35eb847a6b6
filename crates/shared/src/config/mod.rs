//! Platform configuration.
//!
//! Configuration is loaded once at startup from environment variables, with
//! an optional `.env` file taking precedence, and passed to services as an
//! immutable value.

mod error;

pub use error::{ConfigError, Result};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration for the lifecycle core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// Default quota ceilings for teams and users.
    pub quota: QuotaConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            quota: QuotaConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Default quota ceilings applied to entities that have no explicit limit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct QuotaConfig {
    /// Maximum number of live jobs a team may own.
    pub team_job_limit: u32,

    /// Maximum number of live jobs an individual user may own.
    pub user_job_limit: u32,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            team_job_limit: 50,
            user_job_limit: 20,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default tracing filter when RUST_LOG is not set, e.g. "info".
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Configuration loader.
///
/// Loads configuration from:
/// 1. a `.env` file (optional, loaded first so its values win),
/// 2. process environment variables,
/// 3. built-in defaults for anything left unset.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    env_file_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a loader. `env_file_path` is loaded before reading the
    /// environment when provided.
    pub fn new(env_file_path: Option<PathBuf>) -> Self {
        Self { env_file_path }
    }

    /// Load the platform configuration.
    pub fn load(&self) -> Result<PlatformConfig> {
        if let Some(path) = &self.env_file_path {
            dotenv::from_path(path).map_err(|e| ConfigError::EnvFileLoad {
                path: path.clone(),
                source: e,
            })?;
        }

        let defaults = PlatformConfig::default();
        Ok(PlatformConfig {
            quota: QuotaConfig {
                team_job_limit: parse_limit(
                    "MAREA_TEAM_JOB_QUOTA",
                    std::env::var("MAREA_TEAM_JOB_QUOTA").ok(),
                    defaults.quota.team_job_limit,
                )?,
                user_job_limit: parse_limit(
                    "MAREA_USER_JOB_QUOTA",
                    std::env::var("MAREA_USER_JOB_QUOTA").ok(),
                    defaults.quota.user_job_limit,
                )?,
            },
            logging: LoggingConfig {
                level: std::env::var("MAREA_LOG_LEVEL").unwrap_or(defaults.logging.level),
            },
        })
    }
}

fn parse_limit(var: &str, raw: Option<String>, default: u32) -> Result<u32> {
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::InvalidValue {
            var: var.to_string(),
            value,
        }),
    }
}
