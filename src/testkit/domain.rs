//! Builders for domain primitives used across tests.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::domain::{Allocation, AllocationId, ClientStatus, TaskState, TaskStateKind, Target};

/// A random allocation ID in Nomad's UUID format.
pub fn allocation_id() -> AllocationId {
    AllocationId::new(uuid::Uuid::new_v4().to_string())
}

/// Parse a `job:task` or `task` target, panicking on malformed input.
pub fn target(selector: &str) -> Target {
    selector.parse().unwrap()
}

/// Fluent builder for [`Allocation`].
///
/// Defaults to a running allocation with a random ID and no tasks.
#[derive(Debug, Clone)]
pub struct AllocationBuilder {
    allocation: Allocation,
}

impl AllocationBuilder {
    pub fn new(job_id: &str) -> Self {
        Self {
            allocation: Allocation {
                id: allocation_id(),
                job_id: job_id.to_string(),
                job_name: job_id.to_string(),
                task_group: job_id.to_string(),
                client_status: ClientStatus::Running,
                task_states: BTreeMap::new(),
            },
        }
    }

    pub fn id(mut self, id: &str) -> Self {
        self.allocation.id = AllocationId::new(id);
        self
    }

    pub fn job_name(mut self, name: &str) -> Self {
        self.allocation.job_name = name.to_string();
        self
    }

    pub fn task_group(mut self, group: &str) -> Self {
        self.allocation.task_group = group.to_string();
        self
    }

    pub fn status(mut self, status: &str) -> Self {
        self.allocation.client_status = ClientStatus::from(status);
        self
    }

    /// Add a task in state `running` that never restarted.
    pub fn task(self, name: &str) -> Self {
        self.task_state(name, "running", None)
    }

    pub fn task_state(
        mut self,
        name: &str,
        state: &str,
        last_restart: Option<DateTime<Utc>>,
    ) -> Self {
        self.allocation.task_states.insert(
            name.to_string(),
            TaskState {
                state: TaskStateKind::from(state),
                last_restart,
            },
        );
        self
    }

    pub fn build(self) -> Allocation {
        self.allocation
    }
}

/// A running allocation of `job_id` with a single running `task`.
pub fn running(job_id: &str, task: &str) -> Allocation {
    AllocationBuilder::new(job_id).task(task).build()
}
