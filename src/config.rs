//! Configuration management for sql-reward.
//!
//! Handles loading configuration from TOML files. Command-line flags are
//! applied on top by the binary.

use crate::db::DatabaseLocator;
use crate::error::{RewardError, Result};
use crate::reward::EmptyRowsPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Where databases live and how they are opened.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Reward computation settings.
    #[serde(default)]
    pub scoring: ScoringConfig,
}

/// Database location and connection settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatabaseConfig {
    /// Directory holding one subdirectory per database.
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,

    /// Database file extension, without the dot.
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Open databases with `mode=ro` so mutating queries fail instead of committing.
    #[serde(default)]
    pub read_only: bool,

    /// How long SQLite waits on a locked database before giving up.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

fn default_base_dir() -> PathBuf {
    PathBuf::from("spider").join("database")
}

fn default_extension() -> String {
    "sqlite".to_string()
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            extension: default_extension(),
            read_only: false,
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

impl DatabaseConfig {
    /// Builds the locator for this configuration.
    pub fn locator(&self) -> DatabaseLocator {
        DatabaseLocator::new(&self.base_dir, &self.extension)
    }
}

/// Reward computation settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoringConfig {
    /// Vocabulary cap for the TF-IDF fallback.
    #[serde(default = "default_max_features")]
    pub max_features: usize,

    /// How empty result sets feed the row comparison.
    #[serde(default)]
    pub empty_rows: EmptyRowsPolicy,
}

fn default_max_features() -> usize {
    1000
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            max_features: default_max_features(),
            empty_rows: EmptyRowsPolicy::default(),
        }
    }
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sql-reward")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file.
    ///
    /// A missing file yields the defaults.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| RewardError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| {
            RewardError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values that parse but make no sense.
    pub fn validate(&self) -> Result<()> {
        if self.scoring.max_features == 0 {
            return Err(RewardError::config("scoring.max_features must be positive"));
        }
        if self.database.extension.is_empty() {
            return Err(RewardError::config("database.extension must not be empty"));
        }
        Ok(())
    }
}
