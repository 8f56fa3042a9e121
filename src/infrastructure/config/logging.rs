//! Logging configuration and initialization.
//!
//! Diagnostics always go to stderr; stdout is reserved for program output.

use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_level() -> String {
    "info".into()
}

fn default_format() -> String {
    "pretty".into()
}

impl LoggingConfig {
    /// Replace the level according to `-q` / `-v` flags.
    ///
    /// Quiet wins over verbose. Zero verbosity keeps the configured level.
    pub fn apply_verbosity(&mut self, quiet: bool, verbose: u8) {
        if quiet {
            self.level = "error".into();
            return;
        }
        match verbose {
            0 => {}
            1 => self.level = "debug".into(),
            _ => self.level = "trace".into(),
        }
    }

    /// Initialize the tracing subscriber with this logging configuration.
    ///
    /// `RUST_LOG` takes precedence over the configured level.
    pub fn init(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        match self.format.as_str() {
            "json" => {
                fmt()
                    .json()
                    .with_env_filter(filter)
                    .with_writer(std::io::stderr)
                    .init();
            }
            _ => {
                fmt()
                    .with_env_filter(filter)
                    .with_writer(std::io::stderr)
                    .init();
            }
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: default_format(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_raises_level() {
        let mut config = LoggingConfig::default();
        config.apply_verbosity(false, 0);
        assert_eq!(config.level, "info");
        config.apply_verbosity(false, 1);
        assert_eq!(config.level, "debug");
        config.apply_verbosity(false, 3);
        assert_eq!(config.level, "trace");
    }

    #[test]
    fn quiet_wins() {
        let mut config = LoggingConfig::default();
        config.apply_verbosity(true, 2);
        assert_eq!(config.level, "error");
    }
}
