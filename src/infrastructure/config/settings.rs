//! Application configuration loading and validation.
//!
//! Every field has a default, so the config file is optional. Lookup order:
//! an explicit `--config` path (must exist), then `~/.nomadlogs/config.toml`
//! when present, then built-in defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use super::logging::LoggingConfig;
use super::nomad::NomadConfig;
use super::watch::WatchConfig;
use crate::error::{ConfigError, Result};

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub nomad: NomadConfig,
    #[serde(default)]
    pub watch: WatchConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Returns the nomadlogs home directory (`~/.nomadlogs/`).
pub fn home_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".nomadlogs")
}

/// Returns the default config file path (`~/.nomadlogs/config.toml`).
pub fn default_config_path() -> PathBuf {
    home_dir().join("config.toml")
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or validation fails.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is malformed, or fails
    /// validation.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Load `explicit` if given, else the default path if it exists, else defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a file that is used fails to load.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let path = default_config_path();
        if path.is_file() {
            debug!(path = %path.display(), "Loading config");
            return Self::load(path);
        }
        Ok(Self::default())
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        self.nomad.validate()?;
        self.watch.validate()?;
        Ok(())
    }
}
