use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Config directory not found")]
    DirectoryNotFound,

    #[error("Invalid config value: {0}")]
    InvalidValue(String),
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub delegate: DelegateConfig,
    pub behavior: BehaviorConfig,
    pub audit: AuditConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct DelegateConfig {
    /// Path to the real, unintercepted binary
    pub path: PathBuf,
    /// Conventional name of the tool the shim impersonates
    pub name: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct BehaviorConfig {
    pub slow_threshold_ms: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct AuditConfig {
    pub enabled: bool,
    /// Empty means `history.log` next to the config file
    pub path: PathBuf,
}

impl Default for DelegateConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("/usr/bin/git.real"),
            name: "git".to_string(),
        }
    }
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            slow_threshold_ms: 10_000,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        let home = std::env::var("HOME").map_err(|_| ConfigError::DirectoryNotFound)?;
        Ok(PathBuf::from(home).join(".config").join("gitshim"))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from the default location, falling back to
    /// defaults when no file exists
    pub fn load_or_default() -> Result<Self, ConfigError> {
        match Self::config_path() {
            Ok(path) if path.exists() => Self::load_from(&path),
            Ok(_) | Err(ConfigError::DirectoryNotFound) => Ok(Self::default_config()),
            Err(e) => Err(e),
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration text
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Create default configuration
    pub fn default_config() -> Self {
        Config {
            delegate: DelegateConfig::default(),
            behavior: BehaviorConfig::default(),
            audit: AuditConfig::default(),
        }
    }

    /// Validate configuration values
    fn validate(&self) -> Result<(), ConfigError> {
        if self.delegate.path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue(
                "delegate.path must not be empty".to_string(),
            ));
        }

        let name = &self.delegate.name;
        if name.is_empty() {
            return Err(ConfigError::InvalidValue(
                "delegate.name must not be empty".to_string(),
            ));
        }
        if name.chars().any(|c| c.is_whitespace() || c == '/' || c == '\\') {
            return Err(ConfigError::InvalidValue(format!(
                "delegate.name must be a bare command name, got '{}'",
                name
            )));
        }

        if self.behavior.slow_threshold_ms == 0 {
            return Err(ConfigError::InvalidValue(
                "slow_threshold_ms must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Threshold at or above which a slow-run note is printed
    pub fn slow_threshold(&self) -> Duration {
        Duration::from_millis(self.behavior.slow_threshold_ms)
    }

    /// Resolve the audit log path, if auditing is enabled
    pub fn audit_log_path(&self) -> Result<Option<PathBuf>, ConfigError> {
        if !self.audit.enabled {
            return Ok(None);
        }
        if !self.audit.path.as_os_str().is_empty() {
            return Ok(Some(self.audit.path.clone()));
        }
        Ok(Some(Self::config_dir()?.join("history.log")))
    }
}
