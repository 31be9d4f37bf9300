//! Environment-driven runtime settings.
//!
//! # Responsibility
//! - Resolve database location and logging settings for binaries.
//!
//! # Invariants
//! - Unset `TODO_DB_PATH` leaves `db_path` empty; binaries decide whether
//!   that is an error.
//! - A truthy `TODO_DEBUG` forces `debug` level regardless of `TODO_LOG_LEVEL`.

use crate::logging::{default_log_level, normalize_level};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "TODO_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "TODO_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "TODO_LOG_DIR";
pub const DEBUG_ENV: &str = "TODO_DEBUG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidLogLevel(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLogLevel(message) => write!(f, "{LOG_LEVEL_ENV}: {message}"),
        }
    }
}

impl Error for ConfigError {}

/// Resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoConfig {
    /// SQLite file, when configured.
    pub db_path: Option<PathBuf>,
    pub log_level: &'static str,
    /// Logging stays disabled when unset.
    pub log_dir: Option<String>,
}

impl TodoConfig {
    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`, which returns the raw value of a key.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let log_level = if non_empty(DEBUG_ENV).is_some_and(|value| is_truthy(&value)) {
            "debug"
        } else {
            match non_empty(LOG_LEVEL_ENV) {
                Some(value) => normalize_level(&value).map_err(ConfigError::InvalidLogLevel)?,
                None => default_log_level(),
            }
        };

        Ok(Self {
            db_path: non_empty(DB_PATH_ENV).map(PathBuf::from),
            log_level,
            log_dir: non_empty(LOG_DIR_ENV),
        })
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "on" | "yes"
    )
}
