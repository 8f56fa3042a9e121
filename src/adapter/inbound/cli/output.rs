//! CLI output helpers.
//!
//! Program output goes to stdout; errors go to stderr. JSON mode switches
//! messages to one JSON object per line so scripts can parse them.

use std::fmt::Display;
use std::sync::{OnceLock, RwLock};

use owo_colors::{OwoColorize, Stream};
use serde_json::json;

use crate::domain::TaskStateKind;

/// Runtime output configuration shared by CLI handlers.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    /// Emit machine-readable JSON output instead of human-readable text.
    pub json: bool,
    /// Suppress non-essential output.
    pub quiet: bool,
}

impl OutputConfig {
    #[must_use]
    pub const fn new(json: bool, quiet: bool) -> Self {
        Self { json, quiet }
    }
}

static OUTPUT_CONFIG: OnceLock<RwLock<OutputConfig>> = OnceLock::new();

fn config_cell() -> &'static RwLock<OutputConfig> {
    OUTPUT_CONFIG.get_or_init(|| RwLock::new(OutputConfig::default()))
}

fn read_config() -> OutputConfig {
    match config_cell().read() {
        Ok(config) => *config,
        Err(poisoned) => *poisoned.into_inner(),
    }
}

fn write_config(config: OutputConfig) {
    match config_cell().write() {
        Ok(mut current) => *current = config,
        Err(poisoned) => *poisoned.into_inner() = config,
    }
}

/// Apply output settings from global CLI flags.
pub fn configure(config: OutputConfig) {
    write_config(config);
}

/// Return whether machine-readable JSON output is enabled.
#[must_use]
pub fn is_json() -> bool {
    read_config().json
}

/// Print an informational message.
pub fn message(text: &str) {
    let config = read_config();

    if config.json {
        println!("{}", json!({ "type": "message", "payload": { "message": text } }));
        return;
    }
    if config.quiet {
        return;
    }

    println!("{text}");
}

/// Print an error line to stderr.
pub fn error(message: &str) {
    if is_json() {
        eprintln!(
            "{}",
            json!({
                "type": "error",
                "payload": { "message": message },
            })
        );
        return;
    }

    eprintln!(
        "{} {}",
        "error:".if_supports_color(Stream::Stderr, |t| t.red()),
        message
    );
}

/// Print pre-rendered multi-line content as is.
pub fn lines(content: &str) {
    for line in content.lines() {
        println!("{line}");
    }
}

/// Print a JSON value on one line.
pub fn json_output(value: serde_json::Value) {
    println!("{value}");
}

/// Color a task state: running green, dead red, anything else plain.
#[must_use]
pub fn task_state(state: &TaskStateKind) -> String {
    match state {
        TaskStateKind::Running => positive(state),
        TaskStateKind::Dead => negative(state),
        other => other.to_string(),
    }
}

/// Format a positive value in green.
pub fn positive(value: impl Display) -> String {
    value
        .if_supports_color(Stream::Stdout, |t| t.green())
        .to_string()
}

/// Format a negative value in red.
pub fn negative(value: impl Display) -> String {
    value
        .if_supports_color(Stream::Stdout, |t| t.red())
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configure_round_trips() {
        configure(OutputConfig::new(true, false));
        assert!(is_json());
        configure(OutputConfig::default());
        assert!(!is_json());
    }

    #[test]
    fn unknown_states_are_plain() {
        let state = TaskStateKind::from("pending");
        assert_eq!(task_state(&state), "pending");
    }
}
