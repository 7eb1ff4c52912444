//! Runtime configuration for opening the store and starting logs.
//!
//! # Invariants
//! - Defaults are usable without any environment set.
//! - Values read from the environment are validated before use.

use crate::logging::{default_log_level, normalize_level};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::ffi::OsString;
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "POSTBOARD_DB";
pub const ENV_LOG_LEVEL: &str = "POSTBOARD_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "POSTBOARD_LOG_DIR";
pub const DEFAULT_DB_FILE_NAME: &str = "postboard.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    EmptyValue(&'static str),
    /// Value is set but is not valid UTF-8 where text is required.
    NotUnicode(&'static str),
    InvalidLogLevel(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyValue(key) => write!(f, "configuration value `{key}` cannot be empty"),
            Self::NotUnicode(key) => {
                write!(f, "configuration value `{key}` is not valid UTF-8")
            }
            Self::InvalidLogLevel(message) => write!(f, "{message}"),
        }
    }
}

impl Error for ConfigError {}

/// Effective settings for one process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// SQLite database file.
    pub db_path: PathBuf,
    /// One of `trace|debug|info|warn|error`.
    pub log_level: &'static str,
    /// Rolling log directory. `None` leaves logging off.
    pub log_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level(),
            log_dir: None,
        }
    }
}

impl AppConfig {
    /// Reads overrides from the process environment.
    ///
    /// Values are read as `OsString`, so non-UTF-8 paths are kept intact.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var_os(key))
    }

    /// Reads overrides through `lookup`, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_DB_PATH) {
            config.db_path = non_blank_path(ENV_DB_PATH, value)?;
        }
        if let Some(value) = lookup(ENV_LOG_LEVEL) {
            let level = value
                .to_str()
                .ok_or(ConfigError::NotUnicode(ENV_LOG_LEVEL))?;
            config.log_level = normalize_level(level).map_err(ConfigError::InvalidLogLevel)?;
        }
        if let Some(value) = lookup(ENV_LOG_DIR) {
            config.log_dir = Some(non_blank_path(ENV_LOG_DIR, value)?);
        }

        Ok(config)
    }
}

/// Rejects empty or whitespace-only values; anything else is kept verbatim.
fn non_blank_path(key: &'static str, value: OsString) -> Result<PathBuf, ConfigError> {
    let blank = value.is_empty() || value.to_str().is_some_and(|text| text.trim().is_empty());
    if blank {
        return Err(ConfigError::EmptyValue(key));
    }
    Ok(PathBuf::from(value))
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, ConfigError, ENV_DB_PATH, ENV_LOG_DIR, ENV_LOG_LEVEL};
    use std::collections::HashMap;
    use std::ffi::OsString;
    use std::path::PathBuf;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<OsString> {
        let map: HashMap<String, OsString> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), OsString::from(*v)))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn overrides_are_applied() {
        let config = AppConfig::from_lookup(lookup_from(&[
            (ENV_DB_PATH, "/tmp/posts.db"),
            (ENV_LOG_LEVEL, " WARNING "),
            (ENV_LOG_DIR, "/tmp/postboard-logs"),
        ]))
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/tmp/posts.db"));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, Some(PathBuf::from("/tmp/postboard-logs")));
    }

    #[test]
    fn rejects_bad_values() {
        let err = AppConfig::from_lookup(lookup_from(&[(ENV_LOG_LEVEL, "loud")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLogLevel(_)));

        let err = AppConfig::from_lookup(lookup_from(&[(ENV_DB_PATH, "  ")])).unwrap_err();
        assert_eq!(err, ConfigError::EmptyValue(ENV_DB_PATH));
    }

    #[test]
    fn path_values_keep_surrounding_spaces() {
        let config = AppConfig::from_lookup(lookup_from(&[(ENV_DB_PATH, " posts.db ")])).unwrap();
        assert_eq!(config.db_path, PathBuf::from(" posts.db "));
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_paths_pass_through_unchanged() {
        use std::os::unix::ffi::OsStringExt;

        let raw = OsString::from_vec(b"/tmp/posts-\xff.db".to_vec());
        let expected = raw.clone();
        let config = AppConfig::from_lookup(move |key| {
            (key == ENV_DB_PATH).then(|| raw.clone())
        })
        .unwrap();
        assert_eq!(config.db_path.as_os_str(), expected.as_os_str());
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_log_level_is_reported() {
        use std::os::unix::ffi::OsStringExt;

        let err = AppConfig::from_lookup(|key| {
            (key == ENV_LOG_LEVEL).then(|| OsString::from_vec(vec![0x69, 0xff]))
        })
        .unwrap_err();
        assert_eq!(err, ConfigError::NotUnicode(ENV_LOG_LEVEL));
    }
}
