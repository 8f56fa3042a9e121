//! Nomad HTTP API payloads.
//!
//! Only the fields this crate reads are modeled; everything else is ignored.
//!
//! Example list entry:
//! ```json
//! {"ID":"5b1f2a7c-...","JobID":"web","TaskGroup":"web","ClientStatus":"running",
//!  "TaskStates":{"app":{"State":"running","LastRestart":"0001-01-01T00:00:00Z"}}}
//! ```

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Datelike, Utc};
use serde::Deserialize;

use crate::domain::{Allocation, AllocationId, ClientStatus, TaskState, TaskStateKind};

/// Entry of `GET /v1/allocations`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AllocationStub {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "JobID")]
    pub job_id: String,
    #[serde(default)]
    pub task_group: String,
    pub client_status: String,
    #[serde(default)]
    pub task_states: Option<HashMap<String, TaskStateDto>>,
}

/// Body of `GET /v1/allocation/:id`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AllocationDetail {
    #[serde(flatten)]
    pub stub: AllocationStub,
    #[serde(default)]
    pub job: Option<JobDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct JobDto {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaskStateDto {
    pub state: String,
    #[serde(default)]
    pub last_restart: Option<DateTime<Utc>>,
}

impl TaskStateDto {
    fn to_task_state(&self) -> TaskState {
        TaskState {
            state: TaskStateKind::from(self.state.as_str()),
            // Nomad reports "never" as Go's zero time, year 1.
            last_restart: self.last_restart.filter(|t| t.year() > 1),
        }
    }
}

impl AllocationStub {
    /// Convert into a domain allocation. The job name falls back to the job ID.
    #[must_use]
    pub fn into_allocation(self) -> Allocation {
        self.into_allocation_named(None)
    }

    fn into_allocation_named(self, job_name: Option<String>) -> Allocation {
        let task_states: BTreeMap<String, TaskState> = self
            .task_states
            .unwrap_or_default()
            .into_iter()
            .map(|(name, state)| (name, state.to_task_state()))
            .collect();

        Allocation {
            id: AllocationId::new(self.id),
            job_name: job_name.unwrap_or_else(|| self.job_id.clone()),
            job_id: self.job_id,
            task_group: self.task_group,
            client_status: ClientStatus::from(self.client_status.as_str()),
            task_states,
        }
    }
}

impl AllocationDetail {
    #[must_use]
    pub fn into_allocation(self) -> Allocation {
        let job_name = self
            .job
            .and_then(|job| job.name.filter(|n| !n.is_empty()).or(Some(job.id)));
        self.stub.into_allocation_named(job_name)
    }
}
