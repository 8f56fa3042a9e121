//! Watcher discovery and buffering configuration.

use std::time::Duration;

use serde::Deserialize;

use crate::error::{ConfigError, Result};

/// Bytes assumed per log line when sizing a backlog request.
pub const BACKLOG_BYTES_PER_LINE: u64 = 120;

/// Settings shared by every watcher of a `tail` run.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchConfig {
    /// Interval between allocation discovery polls (milliseconds).
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Upper bound for the delay after repeated list failures (milliseconds).
    ///
    /// Equal to `poll_interval_ms` keeps a fixed retry interval.
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
    /// Capacity of each watcher's output buffer, in lines.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
    /// Lines of existing output to replay per stream when an allocation is
    /// first seen. `None` starts at the current end of the file.
    #[serde(default)]
    pub backlog_lines: Option<usize>,
}

const fn default_poll_interval_ms() -> u64 {
    5_000
}

const fn default_max_backoff_ms() -> u64 {
    default_poll_interval_ms()
}

const fn default_channel_capacity() -> usize {
    1_000
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            channel_capacity: default_channel_capacity(),
            backlog_lines: None,
        }
    }
}

impl WatchConfig {
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    #[must_use]
    pub const fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }

    /// Delay before the next poll after `failures` consecutive list failures.
    ///
    /// Doubles per failure starting from the poll interval, capped at
    /// `max_backoff`.
    #[must_use]
    pub fn delay_after(&self, failures: u32) -> Duration {
        let base = self.poll_interval();
        if failures == 0 {
            return base;
        }
        let factor = 1u32.checked_shl(failures.min(16)).unwrap_or(u32::MAX);
        base.saturating_mul(factor).min(self.max_backoff().max(base))
    }

    /// Byte offset from the end of the file for the configured backlog.
    #[must_use]
    pub fn backlog_offset(&self) -> u64 {
        self.backlog_lines
            .map_or(0, |n| (n as u64).saturating_mul(BACKLOG_BYTES_PER_LINE))
    }

    pub(super) fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "poll_interval_ms",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.max_backoff_ms < self.poll_interval_ms {
            return Err(ConfigError::InvalidValue {
                field: "max_backoff_ms",
                reason: "must be at least poll_interval_ms".to_string(),
            }
            .into());
        }
        if self.channel_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "channel_capacity",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        Ok(())
    }
}
