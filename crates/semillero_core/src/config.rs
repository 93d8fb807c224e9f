//! Runtime configuration.
//!
//! # Responsibility
//! - Load database, media and logging locations from an optional TOML file.
//! - Apply `SEMILLERO_*` environment overrides on top of the file.
//!
//! # Invariants
//! - Every key is optional; missing keys fall back to defaults.
//! - Unknown keys in the file are rejected.

use crate::logging::{default_log_level, init_logging, LoggingError};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const ENV_DATABASE_PATH: &str = "SEMILLERO_DATABASE_PATH";
pub const ENV_MEDIA_ROOT: &str = "SEMILLERO_MEDIA_ROOT";
pub const ENV_LOG_LEVEL: &str = "SEMILLERO_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "SEMILLERO_LOG_DIR";

const DEFAULT_DATABASE_PATH: &str = "semillero.sqlite3";
const DEFAULT_MEDIA_ROOT: &str = "media";
const DEFAULT_LOG_DIR: &str = "logs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_path: PathBuf,
    /// Root directory of uploaded documents.
    pub media_root: PathBuf,
    pub log_level: String,
    pub log_dir: PathBuf,
}

/// On-disk shape; every key optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    database_path: Option<PathBuf>,
    media_root: Option<PathBuf>,
    log_level: Option<String>,
    log_dir: Option<PathBuf>,
}

#[derive(Debug)]
pub enum ConfigError {
    Read { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: toml::de::Error },
    /// An override or key is present but empty.
    EmptyValue(&'static str),
    Logging(LoggingError),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read config file `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "invalid config file `{}`: {source}", path.display())
            }
            Self::EmptyValue(key) => write!(f, "config value `{key}` must not be empty"),
            Self::Logging(err) => write!(f, "logging setup failed: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Logging(err) => Some(err),
            Self::EmptyValue(_) => None,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            media_root: PathBuf::from(DEFAULT_MEDIA_ROOT),
            log_level: default_log_level().as_str().to_string(),
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
        }
    }
}

impl AppConfig {
    /// Loads `path` (when given) and then applies process environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.with_overrides(|key| std::env::var(key).ok())
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        let file: ConfigFile = toml::from_str(content)?;
        let defaults = Self::default();
        Ok(Self {
            database_path: file.database_path.unwrap_or(defaults.database_path),
            media_root: file.media_root.unwrap_or(defaults.media_root),
            log_level: file.log_level.unwrap_or(defaults.log_level),
            log_dir: file.log_dir.unwrap_or(defaults.log_dir),
        })
    }

    /// Applies `SEMILLERO_*` overrides read through `lookup`.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(value) = non_empty(&lookup, ENV_DATABASE_PATH)? {
            self.database_path = PathBuf::from(value);
        }
        if let Some(value) = non_empty(&lookup, ENV_MEDIA_ROOT)? {
            self.media_root = PathBuf::from(value);
        }
        if let Some(value) = non_empty(&lookup, ENV_LOG_LEVEL)? {
            self.log_level = value;
        }
        if let Some(value) = non_empty(&lookup, ENV_LOG_DIR)? {
            self.log_dir = PathBuf::from(value);
        }
        Ok(self)
    }

    /// Starts file logging; a relative `log_dir` is resolved against `base`.
    pub fn init_logging(&self, base: &Path) -> Result<(), ConfigError> {
        let dir = if self.log_dir.is_absolute() {
            self.log_dir.clone()
        } else {
            base.join(&self.log_dir)
        };
        init_logging(&self.log_level, &dir).map_err(ConfigError::Logging)
    }
}

fn non_empty(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<String>, ConfigError> {
    match lookup(key) {
        Some(value) if value.trim().is_empty() => Err(ConfigError::EmptyValue(key)),
        Some(value) => Ok(Some(value.trim().to_string())),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, ConfigError, ENV_LOG_LEVEL, ENV_MEDIA_ROOT};
    use std::collections::HashMap;
    use std::io::Write;
    use std::path::PathBuf;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let config = AppConfig::from_toml_str("media_root = \"/srv/media\"").expect("parse");
        assert_eq!(config.media_root, PathBuf::from("/srv/media"));
        assert_eq!(config.database_path, AppConfig::default().database_path);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(AppConfig::from_toml_str("databse_path = \"x\"").is_err());
    }

    #[test]
    fn environment_overrides_file_values() {
        let env = HashMap::from([
            (ENV_MEDIA_ROOT, "/data/uploads".to_string()),
            (ENV_LOG_LEVEL, "warn".to_string()),
        ]);
        let config = AppConfig::from_toml_str("media_root = \"media\"\nlog_level = \"info\"")
            .expect("parse")
            .with_overrides(|key| env.get(key).cloned())
            .expect("overrides");
        assert_eq!(config.media_root, PathBuf::from("/data/uploads"));
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn empty_override_is_an_error() {
        let result = AppConfig::default().with_overrides(|key| {
            (key == ENV_MEDIA_ROOT).then(|| "  ".to_string())
        });
        assert!(matches!(result, Err(ConfigError::EmptyValue(ENV_MEDIA_ROOT))));
    }

    #[test]
    fn reads_config_from_disk() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "database_path = \"/var/lib/semillero.db\"").expect("write config");
        let config = AppConfig::from_file(file.path()).expect("load config");
        assert_eq!(config.database_path, PathBuf::from("/var/lib/semillero.db"));
    }
}
