//! Allocation watcher: discovery, per-allocation log streaming, and fan-in.
//!
//! # Architecture
//!
//! One watcher serves one [`Target`]. A background discovery task lists
//! allocations on a fixed interval and, for every newly seen allocation the
//! target selects, claims its ID in the [`WatchedSet`] and spawns a stream
//! consumer. Each consumer follows the allocation's stdout and stderr and
//! pushes lines into a shared bounded `mpsc` channel, read as the
//! [`OutputSequence`].
//!
//! ```text
//!   discovery ──spawn──▶ consumer(alloc A) ──┐
//!       │                consumer(alloc B) ──┼──▶ mpsc ──▶ OutputSequence
//!       └──poll──▶ Orchestrator ◀──logs──────┘
//! ```
//!
//! A full channel blocks the consumers (backpressure), never discovery.
//!
//! Shutdown is a `watch` signal observed at every wait. The discovery task
//! waits for all consumers before returning; once every sender is gone the
//! sequence yields `None`.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::domain::{LogLine, Target};
use crate::infrastructure::config::watch::WatchConfig;
use crate::port::Orchestrator;

mod consume;
mod discover;
mod watched;

use discover::Discovery;

pub use watched::{Claim, WatchedSet};

/// Merged lines from every allocation a watcher streams.
///
/// Effectively infinite; yields `None` only after the watcher stopped and all
/// of its consumers exited.
#[derive(Debug)]
pub struct OutputSequence {
    rx: mpsc::Receiver<LogLine>,
}

impl OutputSequence {
    /// Wait for the next line.
    pub async fn next(&mut self) -> Option<LogLine> {
        self.rx.recv().await
    }
}

/// State shared by the discovery task and every consumer it spawns.
pub(super) struct WatchContext {
    pub(super) target: Arc<Target>,
    pub(super) orchestrator: Arc<dyn Orchestrator>,
    pub(super) watched: Arc<WatchedSet>,
    pub(super) config: WatchConfig,
    pub(super) lines: mpsc::Sender<LogLine>,
    pub(super) shutdown: watch::Receiver<bool>,
}

impl WatchContext {
    fn new(
        target: Target,
        orchestrator: Arc<dyn Orchestrator>,
        config: WatchConfig,
    ) -> (Self, OutputSequence, watch::Sender<bool>) {
        let (lines, rx) = mpsc::channel(config.channel_capacity.max(1));
        let (shutdown_tx, shutdown) = watch::channel(false);
        let ctx = Self {
            target: Arc::new(target),
            orchestrator,
            watched: Arc::new(WatchedSet::new()),
            config,
            lines,
            shutdown,
        };
        (ctx, OutputSequence { rx }, shutdown_tx)
    }
}

/// Entry point for starting watchers.
pub struct Watcher;

impl Watcher {
    /// Start watching `target` in the background.
    ///
    /// Returns immediately. Must be called from within a tokio runtime.
    pub fn start(
        target: Target,
        orchestrator: Arc<dyn Orchestrator>,
        config: WatchConfig,
    ) -> (WatcherHandle, OutputSequence) {
        let (ctx, sequence, shutdown_tx) = WatchContext::new(target, orchestrator, config);
        let target = Arc::clone(&ctx.target);
        let watched = Arc::clone(&ctx.watched);
        let discovery = tokio::spawn(Discovery::new(ctx).run());

        let handle = WatcherHandle {
            target,
            watched,
            shutdown_tx,
            discovery: Some(discovery),
        };
        (handle, sequence)
    }
}

/// Control handle for a running watcher.
///
/// Dropping the handle signals shutdown without waiting for it.
pub struct WatcherHandle {
    target: Arc<Target>,
    watched: Arc<WatchedSet>,
    shutdown_tx: watch::Sender<bool>,
    discovery: Option<JoinHandle<()>>,
}

impl WatcherHandle {
    #[must_use]
    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Allocations currently being streamed.
    #[must_use]
    pub fn watched(&self) -> &WatchedSet {
        &self.watched
    }

    /// Stop discovery and every consumer, and wait until they have exited.
    ///
    /// The output sequence closes once this returns and its buffer is drained.
    pub async fn stop(mut self) {
        self.shutdown_tx.send_replace(true);
        if let Some(discovery) = self.discovery.take() {
            if let Err(e) = discovery.await {
                warn!(selector = %self.target, error = %e, "Discovery task ended abnormally");
            }
        }
        debug!(selector = %self.target, "Watcher stopped");
    }
}

impl Drop for WatcherHandle {
    fn drop(&mut self) {
        self.shutdown_tx.send_replace(true);
    }
}

/// Resolves once shutdown is signalled or the signal's sender is gone.
pub(super) async fn cancelled(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}
