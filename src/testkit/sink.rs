//! In-memory [`LineSink`] for tail tests.

use std::io;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::application::tail::LineSink;

/// Records every written line; optionally starts failing after `n` lines.
#[derive(Debug, Default)]
pub struct RecordingSink {
    lines: Arc<Mutex<Vec<String>>>,
    fail_after: Option<(usize, io::ErrorKind)>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `n` lines, then fail every write with `kind`.
    pub fn fail_after(mut self, n: usize, kind: io::ErrorKind) -> Self {
        self.fail_after = Some((n, kind));
        self
    }

    /// Shared view of the recorded lines.
    pub fn lines(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.lines)
    }
}

impl LineSink for RecordingSink {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        let mut lines = self.lines.lock();
        if let Some((n, kind)) = self.fail_after {
            if lines.len() >= n {
                return Err(io::Error::new(kind, "scripted sink failure"));
            }
        }
        lines.push(line.to_string());
        Ok(())
    }
}
