//! Environment-driven core configuration.
//!
//! # Responsibility
//! - Resolve the data file path and logging settings for one process.
//!
//! # Invariants
//! - Blank variables are treated as unset.
//! - Logging stays disabled unless a log directory is configured.

use crate::logging::default_log_level;
use std::path::PathBuf;

/// Path of the persisted appointment file.
pub const ENV_DATA_FILE: &str = "DAYBOOK_DATA_FILE";
/// Log level (`trace|debug|info|warn|error`).
pub const ENV_LOG_LEVEL: &str = "DAYBOOK_LOG_LEVEL";
/// Absolute directory for rolling log files.
pub const ENV_LOG_DIR: &str = "DAYBOOK_LOG_DIR";

pub const DEFAULT_DATA_FILE: &str = "appointments.csv";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub data_file: PathBuf,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl CoreConfig {
    /// Reads configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let defaults = Self::default();
        Self {
            data_file: non_blank(ENV_DATA_FILE)
                .map(PathBuf::from)
                .unwrap_or(defaults.data_file),
            log_level: non_blank(ENV_LOG_LEVEL).unwrap_or(defaults.log_level),
            log_dir: non_blank(ENV_LOG_DIR).map(PathBuf::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CoreConfig, DEFAULT_DATA_FILE, ENV_DATA_FILE, ENV_LOG_DIR, ENV_LOG_LEVEL};
    use std::collections::HashMap;
    use std::path::PathBuf;

    #[test]
    fn empty_lookup_falls_back_to_defaults() {
        let config = CoreConfig::from_lookup(|_| None);
        assert_eq!(config.data_file, PathBuf::from(DEFAULT_DATA_FILE));
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn lookup_values_override_defaults_and_blank_is_unset() {
        let values = HashMap::from([
            (ENV_DATA_FILE, "/tmp/daybook.csv"),
            (ENV_LOG_LEVEL, "warn"),
            (ENV_LOG_DIR, "   "),
        ]);
        let config = CoreConfig::from_lookup(|key| values.get(key).map(|v| v.to_string()));
        assert_eq!(config.data_file, PathBuf::from("/tmp/daybook.csv"));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, None);
    }
}
