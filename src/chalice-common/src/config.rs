//! TOML configuration.
//!
//! Resolution order, lowest priority first:
//! 1. Built-in defaults
//! 2. `$CHALICE_HOME/config.toml` (or an explicit path)
//! 3. Environment overrides (`CHALICE_EXEC_TIMEOUT`, `CHALICE_LOG_LEVEL`)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::dirs::AppDirs;
use crate::timeout::{DEFAULT_EXEC_TIMEOUT_SECS, MAX_EXEC_TIMEOUT_SECS, MIN_EXEC_TIMEOUT_SECS};

/// Environment variable overriding `exec.default_timeout_secs`.
pub const EXEC_TIMEOUT_ENV_VAR: &str = "CHALICE_EXEC_TIMEOUT";

/// Environment variable overriding `logging.level`.
pub const LOG_LEVEL_ENV_VAR: &str = "CHALICE_LOG_LEVEL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value for {field}: {message}")]
    Invalid { field: String, message: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChaliceConfig {
    #[serde(default)]
    pub exec: ExecSection,
    #[serde(default)]
    pub policy: PolicySection,
    #[serde(default)]
    pub tools: ToolsSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

/// `[exec]` guest execution settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecSection {
    /// Timeout used when a caller does not pass one (default: 30)
    #[serde(default = "default_exec_timeout")]
    pub default_timeout_secs: u64,

    /// Directory for temporary script files (default: system temp dir)
    #[serde(default)]
    pub scratch_dir: Option<PathBuf>,

    /// Withhold credential-looking variables from guests (default: true)
    #[serde(default = "default_true")]
    pub scrub_environment: bool,

    /// Interpreter override for python guests
    #[serde(default)]
    pub python: Option<PathBuf>,

    /// Interpreter override for javascript guests
    #[serde(default)]
    pub node: Option<PathBuf>,

    /// Shell override for shell guests
    #[serde(default)]
    pub shell: Option<PathBuf>,
}

impl Default for ExecSection {
    fn default() -> Self {
        Self {
            default_timeout_secs: default_exec_timeout(),
            scratch_dir: None,
            scrub_environment: true,
            python: None,
            node: None,
            shell: None,
        }
    }
}

/// `[policy]` additions to the built-in command lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicySection {
    /// Extra command basenames to deny
    #[serde(default)]
    pub deny: Vec<String>,

    /// Extra command basenames to allow
    #[serde(default)]
    pub allow: Vec<String>,

    /// Extra substrings that block a shell command outright
    #[serde(default)]
    pub dangerous_patterns: Vec<String>,
}

/// `[tools]` dispatch settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolsSection {
    /// Check argument JSON types against the schema, not only presence
    #[serde(default)]
    pub strict_parameter_types: bool,
}

/// `[logging]` settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSection {
    /// Default filter directive (default: "warn")
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_exec_timeout() -> u64 {
    DEFAULT_EXEC_TIMEOUT_SECS
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl ChaliceConfig {
    /// Load from an explicit path, or from the home directory when `None`.
    ///
    /// A missing default file yields defaults; a missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match AppDirs::new().map(|dirs| dirs.config_file()) {
                Some(default_path) if default_path.exists() => Self::from_file(&default_path)?,
                _ => {
                    debug!("No config file found, using defaults");
                    Self::default()
                }
            },
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a config file without applying environment overrides.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "Loaded config file");
        Self::from_toml_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_str(contents: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(value) = std::env::var(EXEC_TIMEOUT_ENV_VAR) {
            self.exec.default_timeout_secs =
                value.trim().parse().map_err(|_| ConfigError::Invalid {
                    field: EXEC_TIMEOUT_ENV_VAR.to_string(),
                    message: format!("expected a number of seconds, got '{value}'"),
                })?;
        }
        if let Ok(level) = std::env::var(LOG_LEVEL_ENV_VAR)
            && !level.trim().is_empty()
        {
            self.logging.level = level.trim().to_string();
        }
        Ok(())
    }

    /// Reject values outside the supported ranges.
    pub fn validate(&self) -> Result<()> {
        let timeout = self.exec.default_timeout_secs;
        if !(MIN_EXEC_TIMEOUT_SECS..=MAX_EXEC_TIMEOUT_SECS).contains(&timeout) {
            return Err(ConfigError::Invalid {
                field: "exec.default_timeout_secs".to_string(),
                message: format!(
                    "{timeout} is outside {MIN_EXEC_TIMEOUT_SECS}..={MAX_EXEC_TIMEOUT_SECS}"
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serial_test::serial;

    #[test]
    fn test_defaults() {
        let config = ChaliceConfig::default();
        assert_eq!(config.exec.default_timeout_secs, 30);
        assert!(config.exec.scrub_environment);
        assert!(!config.tools.strict_parameter_types);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config = ChaliceConfig::from_toml_str(
            r#"
            [exec]
            default_timeout_secs = 60

            [policy]
            deny = ["terraform"]
            "#,
        )
        .unwrap();

        assert_eq!(config.exec.default_timeout_secs, 60);
        assert!(config.exec.scrub_environment);
        assert_eq!(config.policy.deny, vec!["terraform".to_string()]);
        assert!(config.policy.allow.is_empty());
        assert_eq!(config.logging, LoggingSection::default());
    }

    #[test]
    #[serial]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[tools]\nstrict_parameter_types = true\n").unwrap();

        let config = ChaliceConfig::load(Some(&path)).unwrap();
        assert!(config.tools.strict_parameter_types);
    }

    #[test]
    #[serial]
    fn test_load_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = ChaliceConfig::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    #[serial]
    fn test_load_from_home_without_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        // SAFETY: serialized with the other env-mutating tests
        unsafe {
            std::env::set_var(crate::dirs::HOME_ENV_VAR, dir.path());
        }
        let config = ChaliceConfig::load(None);
        unsafe {
            std::env::remove_var(crate::dirs::HOME_ENV_VAR);
        }
        assert_eq!(config.unwrap(), ChaliceConfig::default());
    }

    #[test]
    #[serial]
    fn test_env_override_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "").unwrap();

        // SAFETY: serialized with the other env-mutating tests
        unsafe {
            std::env::set_var(EXEC_TIMEOUT_ENV_VAR, "90");
        }
        let config = ChaliceConfig::load(Some(&path));
        unsafe {
            std::env::remove_var(EXEC_TIMEOUT_ENV_VAR);
        }
        assert_eq!(config.unwrap().exec.default_timeout_secs, 90);
    }

    #[test]
    fn test_validate_rejects_out_of_range_timeout() {
        let mut config = ChaliceConfig::default();
        config.exec.default_timeout_secs = 0;
        assert!(config.validate().is_err());
        config.exec.default_timeout_secs = 301;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_toml() {
        assert!(ChaliceConfig::from_toml_str("[exec\n").is_err());
    }
}
