//! Scripted [`Orchestrator`] for testing watchers without a Nomad agent.
//!
//! - Allocations are served from an in-memory list that tests replace at will.
//! - List and detail calls can be scripted to fail a number of times.
//! - Log streams are channel-backed: [`FakeOrchestrator::log_handle`] returns
//!   a [`LogHandle`] that feeds the stream opened next for that allocation
//!   and stream kind. Streams without a handle stay silent forever.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::domain::{Allocation, AllocationId, StreamKind};
use crate::error::{Error, Result, StreamError};
use crate::port::{LogStream, LogStreamRequest, Orchestrator};

type Chunk = std::result::Result<Vec<u8>, StreamError>;

#[derive(Default)]
struct FakeState {
    allocations: Vec<Allocation>,
    details: HashMap<AllocationId, Allocation>,
    list_failures: u32,
    detail_failures: HashMap<AllocationId, u32>,
    streams: HashMap<(AllocationId, StreamKind), mpsc::UnboundedReceiver<Chunk>>,
    open_errors: HashMap<(AllocationId, StreamKind), StreamError>,
    opened: Vec<LogStreamRequest>,
}

/// In-memory orchestrator. Share it as `Arc<FakeOrchestrator>`.
#[derive(Default)]
pub struct FakeOrchestrator {
    state: Mutex<FakeState>,
    list_calls: AtomicU32,
    detail_calls: AtomicU32,
}

impl FakeOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_allocations(allocations: Vec<Allocation>) -> Arc<Self> {
        let fake = Self::new();
        fake.set_allocations(allocations);
        Arc::new(fake)
    }

    /// Replace the list served by `list_allocations`.
    pub fn set_allocations(&self, allocations: Vec<Allocation>) {
        self.state.lock().allocations = allocations;
    }

    /// Serve `detail` from the detail lookup instead of the listed entry.
    pub fn set_detail(&self, detail: Allocation) {
        self.state.lock().details.insert(detail.id.clone(), detail);
    }

    /// Fail the next `n` list calls.
    pub fn fail_next_lists(&self, n: u32) {
        self.state.lock().list_failures = n;
    }

    /// Fail the next `n` detail lookups for `id`.
    pub fn fail_next_details(&self, id: &AllocationId, n: u32) {
        self.state.lock().detail_failures.insert(id.clone(), n);
    }

    /// Fail the next open of `kind` for `id` with `error`.
    pub fn fail_open(&self, id: &AllocationId, kind: StreamKind, error: StreamError) {
        self.state
            .lock()
            .open_errors
            .insert((id.clone(), kind), error);
    }

    /// Control handle for the next stream of `kind` opened for `id`.
    pub fn log_handle(&self, id: &AllocationId, kind: StreamKind) -> LogHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        self.state.lock().streams.insert((id.clone(), kind), rx);
        LogHandle { tx }
    }

    /// Every log request made so far, in order.
    pub fn opened(&self) -> Vec<LogStreamRequest> {
        self.state.lock().opened.clone()
    }

    /// How many log streams were requested for `id`.
    pub fn open_count(&self, id: &AllocationId) -> usize {
        self.state
            .lock()
            .opened
            .iter()
            .filter(|r| &r.allocation_id == id)
            .count()
    }

    pub fn list_calls(&self) -> u32 {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn detail_calls(&self) -> u32 {
        self.detail_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Orchestrator for FakeOrchestrator {
    async fn list_allocations(&self) -> Result<Vec<Allocation>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock();
        if state.list_failures > 0 {
            state.list_failures -= 1;
            return Err(Error::Connection("scripted list failure".into()));
        }
        Ok(state.allocations.clone())
    }

    async fn allocation(&self, id: &AllocationId) -> Result<Allocation> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock();
        if let Some(remaining) = state.detail_failures.get_mut(id) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(Error::Api {
                    status: 500,
                    message: "scripted detail failure".into(),
                });
            }
        }
        if let Some(detail) = state.details.get(id) {
            return Ok(detail.clone());
        }
        state
            .allocations
            .iter()
            .find(|a| &a.id == id)
            .cloned()
            .ok_or_else(|| Error::Api {
                status: 404,
                message: "alloc not found".into(),
            })
    }

    async fn open_logs(
        &self,
        request: LogStreamRequest,
    ) -> std::result::Result<Box<dyn LogStream>, StreamError> {
        let key = (request.allocation_id.clone(), request.stream);
        let mut state = self.state.lock();
        state.opened.push(request);
        if let Some(error) = state.open_errors.remove(&key) {
            return Err(error);
        }
        Ok(Box::new(FakeLogStream {
            rx: state.streams.remove(&key),
        }))
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

/// Channel-backed stream. Without a receiver it never yields.
struct FakeLogStream {
    rx: Option<mpsc::UnboundedReceiver<Chunk>>,
}

#[async_trait]
impl LogStream for FakeLogStream {
    async fn next_chunk(&mut self) -> Option<Chunk> {
        match &mut self.rx {
            Some(rx) => rx.recv().await,
            None => std::future::pending().await,
        }
    }
}

/// Feeds one fake log stream.
///
/// Dropping the handle (or calling [`LogHandle::close`]) ends the stream
/// cleanly once buffered chunks are read.
pub struct LogHandle {
    tx: mpsc::UnboundedSender<Chunk>,
}

impl LogHandle {
    /// Deliver `text` as one chunk.
    pub fn send(&self, text: &str) {
        let _ = self.tx.send(Ok(text.as_bytes().to_vec()));
    }

    /// End the stream with `error`.
    pub fn fail(&self, error: StreamError) {
        let _ = self.tx.send(Err(error));
    }

    pub fn close(self) {}
}
