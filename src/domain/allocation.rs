//! Allocation snapshots as reported by the orchestrator.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use super::id::AllocationId;

/// Client-side status of an allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientStatus {
    Pending,
    Running,
    Complete,
    Failed,
    Lost,
    /// Any status this crate does not model explicitly.
    Other(String),
}

impl ClientStatus {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Complete => "complete",
            Self::Failed => "failed",
            Self::Lost => "lost",
            Self::Other(status) => status,
        }
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }
}

impl From<&str> for ClientStatus {
    fn from(s: &str) -> Self {
        match s {
            "pending" => Self::Pending,
            "running" => Self::Running,
            "complete" => Self::Complete,
            "failed" => Self::Failed,
            "lost" => Self::Lost,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ClientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of one task inside an allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStateKind {
    Pending,
    Running,
    Dead,
    Other(String),
}

impl TaskStateKind {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Dead => "dead",
            Self::Other(state) => state,
        }
    }
}

impl From<&str> for TaskStateKind {
    fn from(s: &str) -> Self {
        match s {
            "pending" => Self::Pending,
            "running" => Self::Running,
            "dead" => Self::Dead,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for TaskStateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TaskStateKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// State of a single task within an allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskState {
    pub state: TaskStateKind,
    /// `None` when the task has never been restarted.
    pub last_restart: Option<DateTime<Utc>>,
}

/// Read-only snapshot of an allocation.
///
/// List results carry the job ID in place of the job name; the detail lookup
/// fills in the real job name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    pub id: AllocationId,
    pub job_id: String,
    pub job_name: String,
    pub task_group: String,
    pub client_status: ClientStatus,
    pub task_states: BTreeMap<String, TaskState>,
}

impl Allocation {
    /// Whether the allocation has a task state entry named `task`.
    #[must_use]
    pub fn has_task(&self, task: &str) -> bool {
        self.task_states.contains_key(task)
    }
}
