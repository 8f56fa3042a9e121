//! Canonical test configurations.
//!
//! Single source of truth for config structs used across tests.

use crate::infrastructure::config::watch::WatchConfig;

/// Watch config that polls every `poll_ms` milliseconds with a small buffer.
pub fn watch(poll_ms: u64) -> WatchConfig {
    WatchConfig {
        poll_interval_ms: poll_ms,
        max_backoff_ms: poll_ms,
        channel_capacity: 64,
        backlog_lines: None,
    }
}

/// Fast polling suitable for most watcher tests.
pub fn fast_watch() -> WatchConfig {
    watch(20)
}
