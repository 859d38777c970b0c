//! Process configuration resolved from environment variables.
//!
//! # Invariants
//! - Blank values count as unset.
//! - `log_dir`, when present, is absolute.

use crate::logging::{default_log_level, normalize_level, normalize_log_dir, LoggingError};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const DB_PATH_VAR: &str = "CHECKLIST_DB_PATH";
pub const LOG_LEVEL_VAR: &str = "CHECKLIST_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "CHECKLIST_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "checklist.sqlite3";

/// Errors from configuration resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue {
        var: &'static str,
        reason: LoggingError,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { var, reason } => write!(f, "{var}: {reason}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidValue { reason, .. } => Some(reason),
        }
    }
}

/// Resolved core settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_level: &'static str,
    /// File logging is disabled when `None`.
    pub log_dir: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level(),
            log_dir: None,
        }
    }
}

impl CoreConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration through `lookup`, falling back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let mut config = Self::default();

        if let Some(path) = read(DB_PATH_VAR) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(level) = read(LOG_LEVEL_VAR) {
            config.log_level = normalize_level(&level).map_err(|reason| {
                ConfigError::InvalidValue {
                    var: LOG_LEVEL_VAR,
                    reason,
                }
            })?;
        }
        if let Some(dir) = read(LOG_DIR_VAR) {
            let dir = normalize_log_dir(&dir).map_err(|reason| ConfigError::InvalidValue {
                var: LOG_DIR_VAR,
                reason,
            })?;
            config.log_dir = Some(dir);
        }

        Ok(config)
    }
}
