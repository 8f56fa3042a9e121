//! Per-allocation stream consumer.
//!
//! Follows stdout and stderr of one task in one allocation until either
//! stream ends, then reports how it ended and releases the allocation's
//! watched-set membership. Lines of one stream keep their order; stdout and
//! stderr interleave in arrival order.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

use super::{cancelled, Claim, WatchContext};
use crate::domain::{Allocation, LineSource, LogLine, StreamKind, Target};
use crate::error::StreamError;
use crate::port::{LogStream, LogStreamRequest, Orchestrator};

/// Why a consumer stopped.
#[derive(Debug)]
enum Ending {
    Closed(StreamKind),
    Failed(StreamKind, StreamError),
    Cancelled,
    ReaderGone,
}

pub(super) struct StreamConsumer {
    target: Arc<Target>,
    allocation: Arc<Allocation>,
    orchestrator: Arc<dyn Orchestrator>,
    lines: mpsc::Sender<LogLine>,
    shutdown: watch::Receiver<bool>,
    backlog: Option<usize>,
    backlog_offset: u64,
    claim: Claim,
}

impl StreamConsumer {
    pub(super) fn new(ctx: &WatchContext, allocation: Allocation, claim: Claim) -> Self {
        Self {
            target: Arc::clone(&ctx.target),
            allocation: Arc::new(allocation),
            orchestrator: Arc::clone(&ctx.orchestrator),
            lines: ctx.lines.clone(),
            shutdown: ctx.shutdown.clone(),
            backlog: ctx.config.backlog_lines,
            backlog_offset: ctx.config.backlog_offset(),
            claim,
        }
    }

    /// Stream until the first stream ends, then report and release the claim.
    pub(super) async fn run(self) {
        let mut shutdown = self.shutdown.clone();
        let ending = self.consume(&mut shutdown).await;
        self.report(ending, &mut shutdown).await;
        debug!(allocation = %self.claim.id(), "Stream consumer finished");
    }

    async fn consume(&self, shutdown: &mut watch::Receiver<bool>) -> Ending {
        let opened = tokio::select! {
            biased;
            () = cancelled(shutdown) => return Ending::Cancelled,
            opened = async {
                tokio::join!(self.open(StreamKind::Stdout), self.open(StreamKind::Stderr))
            } => opened,
        };

        let mut stdout = match opened.0 {
            Ok(stream) => stream,
            Err(e) => return Ending::Failed(StreamKind::Stdout, e),
        };
        let mut stderr = match opened.1 {
            Ok(stream) => stream,
            Err(e) => return Ending::Failed(StreamKind::Stderr, e),
        };

        // The backlog applies to the first chunk of each stream only.
        let mut stdout_backlog = self.backlog;
        let mut stderr_backlog = self.backlog;

        // The stream that did not deliver last is polled first.
        let mut stderr_first = false;

        loop {
            let ready = if stderr_first {
                next_of((StreamKind::Stderr, &mut stderr), (StreamKind::Stdout, &mut stdout))
            } else {
                next_of((StreamKind::Stdout, &mut stdout), (StreamKind::Stderr, &mut stderr))
            };
            let (kind, chunk) = tokio::select! {
                biased;
                () = cancelled(shutdown) => return Ending::Cancelled,
                ready = ready => ready,
            };
            stderr_first = kind == StreamKind::Stdout;

            let bytes = match chunk {
                Some(Ok(bytes)) => bytes,
                Some(Err(e)) => return Ending::Failed(kind, e),
                None => return Ending::Closed(kind),
            };

            let keep = match kind {
                StreamKind::Stdout => stdout_backlog.take(),
                StreamKind::Stderr => stderr_backlog.take(),
            };
            for text in split_lines(&bytes, keep) {
                if let Err(ending) = self.push(shutdown, LineSource::Stream(kind), text).await {
                    return ending;
                }
            }
        }
    }

    async fn open(
        &self,
        kind: StreamKind,
    ) -> std::result::Result<Box<dyn LogStream>, StreamError> {
        let request = LogStreamRequest::tail(
            self.allocation.id.clone(),
            self.target.task(),
            kind,
        )
        .with_offset(self.backlog_offset);
        self.orchestrator.open_logs(request).await
    }

    async fn push(
        &self,
        shutdown: &mut watch::Receiver<bool>,
        source: LineSource,
        text: String,
    ) -> std::result::Result<(), Ending> {
        let line = LogLine::new(
            Arc::clone(&self.target),
            Arc::clone(&self.allocation),
            source,
            text,
        );
        tokio::select! {
            biased;
            () = cancelled(shutdown) => Err(Ending::Cancelled),
            sent = self.lines.send(line) => sent.map_err(|_| Ending::ReaderGone),
        }
    }

    async fn report(&self, ending: Ending, shutdown: &mut watch::Receiver<bool>) {
        let allocation = self.claim.id();
        let notice = match ending {
            Ending::Closed(kind) => {
                debug!(selector = %self.target, allocation = %allocation, stream = %kind, "Log stream closed");
                format!("{kind} stream closed")
            }
            Ending::Failed(kind, e) if e.is_task_gone() => {
                debug!(
                    selector = %self.target,
                    allocation = %allocation,
                    stream = %kind,
                    error = %e,
                    "Task gone, dropping allocation"
                );
                return;
            }
            Ending::Failed(kind, e) => {
                warn!(
                    selector = %self.target,
                    job = %self.allocation.job_id,
                    allocation = %allocation,
                    stream = %kind,
                    error = %e,
                    "Log stream failed"
                );
                format!("{kind} stream failed: {e}")
            }
            Ending::Cancelled => {
                debug!(selector = %self.target, allocation = %allocation, "Stream consumer cancelled");
                return;
            }
            Ending::ReaderGone => {
                debug!(selector = %self.target, allocation = %allocation, "Output reader dropped");
                return;
            }
        };
        // Best effort: the watcher may be stopping.
        let _ = self.push(shutdown, LineSource::Notice, notice).await;
    }
}

type Chunk = Option<std::result::Result<Vec<u8>, StreamError>>;

/// Wait for whichever stream yields first, checking `first` before `second`
/// when both are ready.
async fn next_of(
    first: (StreamKind, &mut Box<dyn LogStream>),
    second: (StreamKind, &mut Box<dyn LogStream>),
) -> (StreamKind, Chunk) {
    let (first_kind, first) = first;
    let (second_kind, second) = second;
    tokio::select! {
        biased;
        chunk = first.next_chunk() => (first_kind, chunk),
        chunk = second.next_chunk() => (second_kind, chunk),
    }
}

/// Split a chunk into non-empty lines, keeping only the last `keep` when set.
///
/// Chunks are split independently; a line spanning two chunks comes out as
/// two fragments. Invalid UTF-8 is replaced.
fn split_lines(bytes: &[u8], keep: Option<usize>) -> Vec<String> {
    let text = String::from_utf8_lossy(bytes);
    let lines: Vec<&str> = text.split('\n').filter(|l| !l.is_empty()).collect();
    let skip = keep.map_or(0, |n| lines.len().saturating_sub(n));
    lines.into_iter().skip(skip).map(str::to_owned).collect()
}
