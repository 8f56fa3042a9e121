//! A single line of allocation output.

use std::fmt;
use std::sync::Arc;

use super::allocation::Allocation;
use super::target::Target;

/// Which of a task's two log files a chunk came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

impl StreamKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a line originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineSource {
    /// Output written by the task.
    Stream(StreamKind),
    /// Informational notice emitted by the watcher itself (stream closed, failed).
    Notice,
}

/// One line of log output, tagged with the target and allocation it came from.
///
/// Target and allocation are shared between all lines of one stream consumer.
#[derive(Debug, Clone)]
pub struct LogLine {
    target: Arc<Target>,
    allocation: Arc<Allocation>,
    source: LineSource,
    text: String,
}

impl LogLine {
    pub fn new(
        target: Arc<Target>,
        allocation: Arc<Allocation>,
        source: LineSource,
        text: impl Into<String>,
    ) -> Self {
        Self {
            target,
            allocation,
            source,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn target(&self) -> &Target {
        &self.target
    }

    #[must_use]
    pub fn allocation(&self) -> &Allocation {
        &self.allocation
    }

    #[must_use]
    pub const fn source(&self) -> LineSource {
        self.source
    }

    #[must_use]
    pub fn is_notice(&self) -> bool {
        self.source == LineSource::Notice
    }

    /// The raw text as received, without a trailing newline.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}
