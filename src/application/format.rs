//! Line Formatter: renders a [`LogLine`] for a human reader.
//!
//! Task output that is a JSON object with a string `message` is treated as a
//! structured record and rendered as
//!
//! ```text
//! web(5b1f2a7c): [2023-01-01T00:00:00Z] [info] hello
//! ```
//!
//! Everything else passes through verbatim behind the same prefix. Rendering
//! never fails.

use chrono::{DateTime, Utc};
use owo_colors::{OwoColorize, Stream, Style};
use serde::Deserialize;

use crate::domain::LogLine;

const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// How a line is rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RenderMode {
    /// Prefixed, with structured records expanded.
    #[default]
    Formatted,
    /// The raw text alone.
    Raw,
}

/// Whether the prefix is colored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColorMode {
    /// Color when stdout supports it.
    #[default]
    Auto,
    Always,
    Never,
}

/// Structured log record emitted by the task. Unknown fields are ignored.
#[derive(Debug, Deserialize)]
struct Record {
    #[serde(default)]
    level: Option<String>,
    #[serde(default)]
    time: Option<DateTime<Utc>>,
    message: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LineFormatter {
    mode: RenderMode,
    colors: ColorMode,
}

impl LineFormatter {
    #[must_use]
    pub const fn new(mode: RenderMode, colors: ColorMode) -> Self {
        Self { mode, colors }
    }

    #[must_use]
    pub const fn mode(&self) -> RenderMode {
        self.mode
    }

    /// Render `line` without a trailing newline.
    #[must_use]
    pub fn render(&self, line: &LogLine) -> String {
        if self.mode == RenderMode::Raw {
            return line.text().to_string();
        }

        let allocation = line.allocation();
        let body = if line.is_notice() {
            line.text().to_string()
        } else {
            render_body(line.text())
        };

        format!(
            "{}({}): {}",
            self.paint(&allocation.job_name, Style::new().cyan()),
            self.paint(allocation.id.short(), Style::new().green()),
            body
        )
    }

    fn paint(&self, text: &str, style: Style) -> String {
        match self.colors {
            ColorMode::Never => text.to_string(),
            ColorMode::Always => text.style(style).to_string(),
            ColorMode::Auto => text
                .if_supports_color(Stream::Stdout, |t| t.style(style))
                .to_string(),
        }
    }
}

/// Expand a structured record, or return the text unchanged.
fn render_body(text: &str) -> String {
    let Ok(record) = serde_json::from_str::<Record>(text) else {
        return text.to_string();
    };

    let mut out = String::with_capacity(text.len());
    if let Some(time) = record.time {
        out.push_str(&format!("[{}] ", time.format(TIME_FORMAT)));
    }
    if let Some(level) = record.level {
        out.push_str(&format!("[{level}] "));
    }
    out.push_str(&record.message);
    out
}
