//! Orchestrator port: allocation discovery and log streaming.
//!
//! This is the only boundary the watcher talks through. The HTTP adapter in
//! `adapter::outbound::nomad` implements it against a real Nomad agent; the
//! `testkit` module provides a scripted fake.

use async_trait::async_trait;

use crate::domain::{Allocation, AllocationId, StreamKind};
use crate::error::{Result, StreamError};

/// Parameters for opening one allocation log stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogStreamRequest {
    pub allocation_id: AllocationId,
    pub task: String,
    pub stream: StreamKind,
    pub follow: bool,
    /// Bytes back from the end of the file to start reading at.
    pub offset: u64,
}

impl LogStreamRequest {
    /// Follow `stream` of `task` from the current end of the file.
    pub fn tail(allocation_id: AllocationId, task: impl Into<String>, stream: StreamKind) -> Self {
        Self {
            allocation_id,
            task: task.into(),
            stream,
            follow: true,
            offset: 0,
        }
    }

    /// Start `offset` bytes back from the end instead.
    #[must_use]
    pub const fn with_offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }
}

/// An open, unbounded log stream for one allocation task file.
#[async_trait]
pub trait LogStream: Send {
    /// Wait for the next chunk of bytes.
    ///
    /// Returns `None` when the stream closed cleanly and `Some(Err(_))` on a
    /// terminal failure. No chunks follow either.
    async fn next_chunk(&mut self) -> Option<std::result::Result<Vec<u8>, StreamError>>;
}

/// Facade over the orchestrator's HTTP API.
///
/// Implementations must be safe for concurrent use; one handle is shared by
/// the discovery loop and every stream consumer of a watcher.
#[async_trait]
pub trait Orchestrator: Send + Sync {
    /// List every allocation the cluster currently knows about.
    async fn list_allocations(&self) -> Result<Vec<Allocation>>;

    /// Fetch the full detail of one allocation.
    async fn allocation(&self, id: &AllocationId) -> Result<Allocation>;

    /// Open a log stream. Failing to open is a terminal stream error.
    async fn open_logs(
        &self,
        request: LogStreamRequest,
    ) -> std::result::Result<Box<dyn LogStream>, StreamError>;

    /// Orchestrator name for logging.
    fn name(&self) -> &'static str;
}
