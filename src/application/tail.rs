//! Tail orchestration: one watcher per target, merged into one output sink.
//!
//! Each target's [`OutputSequence`] is drained by its own task, which renders
//! lines and forwards them to the single writer loop in [`run`]. Lines from
//! different targets interleave in arrival order.

use std::io::{self, Write};
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

use super::format::LineFormatter;
use super::watch::{cancelled, OutputSequence, Watcher, WatcherHandle};
use crate::domain::Target;
use crate::error::Result;
use crate::infrastructure::config::watch::WatchConfig;
use crate::port::Orchestrator;

/// Destination for rendered lines.
pub trait LineSink {
    /// Write one line, appending the newline.
    fn write_line(&mut self, line: &str) -> io::Result<()>;
}

/// Writes lines to standard output, flushing after each one.
#[derive(Debug)]
pub struct StdoutSink {
    stdout: io::Stdout,
}

impl StdoutSink {
    #[must_use]
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
        }
    }
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LineSink for StdoutSink {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        let mut out = self.stdout.lock();
        writeln!(out, "{line}")?;
        out.flush()
    }
}

/// Tail every target until `shutdown` fires or the sink stops accepting lines.
///
/// On shutdown all watchers are stopped and the lines they had already
/// buffered are still written. A closed pipe ends the run quietly.
///
/// # Errors
///
/// Returns [`Error::Io`](crate::error::Error::Io) when the sink fails for any
/// reason other than a broken pipe.
pub async fn run(
    targets: Vec<Target>,
    orchestrator: Arc<dyn Orchestrator>,
    config: &WatchConfig,
    formatter: LineFormatter,
    sink: &mut dyn LineSink,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let (tx, mut rx) = mpsc::channel::<String>(config.channel_capacity.max(1));
    let mut handles: Vec<WatcherHandle> = Vec::with_capacity(targets.len());

    for target in targets {
        debug!(selector = %target, "Starting watcher");
        let (handle, sequence) = Watcher::start(target, Arc::clone(&orchestrator), config.clone());
        tokio::spawn(drain(sequence, formatter, tx.clone()));
        handles.push(handle);
    }
    drop(tx);

    let mut failure = None;
    loop {
        let rendered = tokio::select! {
            biased;
            () = cancelled(&mut shutdown) => {
                debug!("Shutdown requested");
                break;
            }
            rendered = rx.recv() => rendered,
        };
        let Some(rendered) = rendered else {
            break;
        };
        if let Err(e) = sink.write_line(&rendered) {
            failure = Some(e);
            break;
        }
    }

    futures_util::future::join_all(handles.into_iter().map(WatcherHandle::stop)).await;

    if failure.is_none() {
        // Watchers are stopped; flush what they had already produced.
        while let Some(rendered) = rx.recv().await {
            if let Err(e) = sink.write_line(&rendered) {
                failure = Some(e);
                break;
            }
        }
    } else {
        rx.close();
    }

    match failure {
        Some(e) if e.kind() == io::ErrorKind::BrokenPipe => {
            debug!("Output closed");
            Ok(())
        }
        Some(e) => {
            warn!(error = %e, "Failed to write output");
            Err(e.into())
        }
        None => Ok(()),
    }
}

async fn drain(mut sequence: OutputSequence, formatter: LineFormatter, tx: mpsc::Sender<String>) {
    while let Some(line) = sequence.next().await {
        if tx.send(formatter.render(&line)).await.is_err() {
            break;
        }
    }
}
