//! Discovery task: poll allocations and spawn stream consumers.

use tokio::task::{JoinError, JoinSet};
use tracing::{debug, warn};

use super::consume::StreamConsumer;
use super::{cancelled, WatchContext, WatchedSet};
use crate::error::Result;

enum Wake {
    Poll,
    Shutdown,
    Reaped(std::result::Result<(), JoinError>),
}

/// Background task owning a watcher's consumers.
///
/// Polls immediately on start, then once per poll interval. A failed list
/// call is logged and retried on the next tick; consecutive failures stretch
/// the delay up to `max_backoff`.
pub(super) struct Discovery {
    ctx: WatchContext,
    consumers: JoinSet<()>,
    failures: u32,
}

impl Discovery {
    pub(super) fn new(ctx: WatchContext) -> Self {
        Self {
            ctx,
            consumers: JoinSet::new(),
            failures: 0,
        }
    }

    pub(super) async fn run(mut self) {
        let mut shutdown = self.ctx.shutdown.clone();
        debug!(
            selector = %self.ctx.target,
            orchestrator = self.ctx.orchestrator.name(),
            "Discovery started"
        );

        'poll: loop {
            let outcome = tokio::select! {
                biased;
                () = cancelled(&mut shutdown) => break 'poll,
                outcome = self.poll_once() => outcome,
            };

            match outcome {
                Ok(started) => {
                    self.failures = 0;
                    if started > 0 {
                        debug!(selector = %self.ctx.target, started, "Discovery cycle started consumers");
                    }
                }
                Err(e) => {
                    self.failures = self.failures.saturating_add(1);
                    warn!(
                        selector = %self.ctx.target,
                        failures = self.failures,
                        error = %e,
                        "Failed to list allocations"
                    );
                }
            }

            let sleep = tokio::time::sleep(self.ctx.config.delay_after(self.failures));
            tokio::pin!(sleep);

            loop {
                let wake = tokio::select! {
                    biased;
                    () = cancelled(&mut shutdown) => Wake::Shutdown,
                    () = &mut sleep => Wake::Poll,
                    Some(joined) = self.consumers.join_next() => Wake::Reaped(joined),
                };
                match wake {
                    Wake::Poll => break,
                    Wake::Shutdown => break 'poll,
                    Wake::Reaped(joined) => self.reap(joined),
                }
            }
        }

        self.finish().await;
    }

    /// Run one discovery cycle, returning how many consumers were started.
    ///
    /// Allocations are skipped, in order, when already watched, when the
    /// target does not select them, or when the detail lookup fails. A failed
    /// detail lookup leaves the allocation unclaimed, so the next cycle
    /// retries it.
    pub(super) async fn poll_once(&mut self) -> Result<usize> {
        let allocations = self.ctx.orchestrator.list_allocations().await?;
        let mut started = 0;

        for stub in allocations {
            if self.ctx.watched.contains(&stub.id) || !self.ctx.target.selects(&stub) {
                continue;
            }

            let allocation = match self.ctx.orchestrator.allocation(&stub.id).await {
                Ok(allocation) => allocation,
                Err(e) => {
                    warn!(
                        selector = %self.ctx.target,
                        allocation = %stub.id,
                        error = %e,
                        "Failed to fetch allocation detail"
                    );
                    continue;
                }
            };

            let Some(claim) = WatchedSet::claim(&self.ctx.watched, stub.id.clone()) else {
                continue;
            };

            debug!(
                selector = %self.ctx.target,
                allocation = %stub.id,
                job = %allocation.job_name,
                "Streaming allocation"
            );
            let consumer = StreamConsumer::new(&self.ctx, allocation, claim);
            self.consumers.spawn(consumer.run());
            started += 1;
        }

        Ok(started)
    }

    fn reap(&self, joined: std::result::Result<(), JoinError>) {
        if let Err(e) = joined {
            if e.is_panic() {
                warn!(selector = %self.ctx.target, error = %e, "Stream consumer panicked");
            }
        }
    }

    async fn finish(mut self) {
        while let Some(joined) = self.consumers.join_next().await {
            self.reap(joined);
        }
        debug!(selector = %self.ctx.target, "Discovery stopped");
    }
}
