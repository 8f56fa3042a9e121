//! Nomad connection configuration.

use serde::Deserialize;
use url::Url;

use crate::error::{ConfigError, Result};

/// Nomad's documented default agent address.
pub const DEFAULT_ADDRESS: &str = "http://127.0.0.1:4646";

/// Environment variable consulted when `--addr` is not given.
pub const ADDRESS_ENV: &str = "NOMAD_ADDR";

/// Environment variable holding an ACL token.
pub const TOKEN_ENV: &str = "NOMAD_TOKEN";

/// HTTP client settings for the Nomad API.
#[derive(Debug, Clone, Deserialize)]
pub struct NomadConfig {
    /// Agent address. Overridden by `NOMAD_ADDR` and `--addr`.
    #[serde(default)]
    pub address: Option<String>,
    /// ACL token sent as `X-Nomad-Token`. `NOMAD_TOKEN` wins when set.
    #[serde(default)]
    pub token: Option<String>,
    /// Per-request timeout for list/detail calls (milliseconds).
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// TCP connect timeout for every request (milliseconds).
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Attempts for list/detail calls on connect or timeout errors.
    #[serde(default = "default_retry_max_attempts")]
    pub retry_max_attempts: u32,
    /// Fixed pause between those attempts (milliseconds).
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

const fn default_timeout_ms() -> u64 {
    10_000
}

const fn default_connect_timeout_ms() -> u64 {
    5_000
}

const fn default_retry_max_attempts() -> u32 {
    3
}

const fn default_retry_backoff_ms() -> u64 {
    250
}

impl Default for NomadConfig {
    fn default() -> Self {
        Self {
            address: None,
            token: None,
            timeout_ms: default_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            retry_max_attempts: default_retry_max_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

impl NomadConfig {
    /// Resolve the agent address: `--addr`, then `NOMAD_ADDR`, then the
    /// config file, then [`DEFAULT_ADDRESS`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when the winner is not an http(s) URL.
    pub fn resolve_address(&self, flag: Option<&str>) -> Result<Url> {
        let env = std::env::var(ADDRESS_ENV).ok();
        self.resolve_address_with(flag, env.as_deref())
    }

    /// [`resolve_address`](Self::resolve_address) with the environment value injected.
    pub fn resolve_address_with(&self, flag: Option<&str>, env: Option<&str>) -> Result<Url> {
        let non_empty = |s: &&str| !s.trim().is_empty();
        let raw = flag
            .filter(non_empty)
            .or(env.filter(non_empty))
            .or(self.address.as_deref().filter(non_empty))
            .unwrap_or(DEFAULT_ADDRESS);

        let url = Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidValue {
            field: "address",
            reason: format!("{raw:?} is not a URL: {e}"),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue {
                field: "address",
                reason: format!("unsupported scheme {:?}", url.scheme()),
            }
            .into());
        }
        Ok(url)
    }

    /// ACL token from `NOMAD_TOKEN` or the config file.
    #[must_use]
    pub fn resolve_token(&self) -> Option<String> {
        std::env::var(TOKEN_ENV)
            .ok()
            .filter(|t| !t.is_empty())
            .or_else(|| self.token.clone())
    }

    pub(super) fn validate(&self) -> Result<()> {
        if self.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "timeout_ms",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.connect_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "connect_timeout_ms",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_beats_env_and_file() {
        let config = NomadConfig {
            address: Some("http://file:4646".into()),
            ..Default::default()
        };
        let url = config
            .resolve_address_with(Some("http://flag:4646"), Some("http://env:4646"))
            .unwrap();
        assert_eq!(url.host_str(), Some("flag"));
    }

    #[test]
    fn env_beats_file() {
        let config = NomadConfig {
            address: Some("http://file:4646".into()),
            ..Default::default()
        };
        let url = config
            .resolve_address_with(None, Some("http://env:4646"))
            .unwrap();
        assert_eq!(url.host_str(), Some("env"));
    }

    #[test]
    fn empty_values_fall_through_to_default() {
        let url = NomadConfig::default()
            .resolve_address_with(Some(""), Some("  "))
            .unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:4646/");
    }

    #[test]
    fn rejects_non_http_addresses() {
        let config = NomadConfig::default();
        assert!(config.resolve_address_with(Some("ftp://x"), None).is_err());
        assert!(config.resolve_address_with(Some("not a url"), None).is_err());
    }

    #[test]
    fn zero_timeout_is_invalid() {
        let config = NomadConfig {
            timeout_ms: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
