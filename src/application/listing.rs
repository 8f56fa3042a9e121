//! The `ls` report: one row per task of every known allocation.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{Allocation, TaskStateKind};
use crate::error::Result;
use crate::port::Orchestrator;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllocationRow {
    /// Abbreviated allocation ID.
    pub allocation: String,
    pub job_id: String,
    pub task: String,
    pub state: TaskStateKind,
    /// `None` when the task never restarted.
    pub last_restart: Option<DateTime<Utc>>,
}

impl AllocationRow {
    fn sort_key(&self) -> String {
        format!("{}{}", self.job_id, self.task)
    }
}

/// Flatten allocations into rows sorted by job ID followed by task name.
///
/// The sort key is the plain concatenation of both and the sort is stable,
/// so equal keys keep list order.
#[must_use]
pub fn rows(allocations: &[Allocation]) -> Vec<AllocationRow> {
    let mut rows: Vec<AllocationRow> = allocations
        .iter()
        .flat_map(|allocation| {
            allocation
                .task_states
                .iter()
                .map(move |(task, state)| AllocationRow {
                    allocation: allocation.id.short().to_string(),
                    job_id: allocation.job_id.clone(),
                    task: task.clone(),
                    state: state.state.clone(),
                    last_restart: state.last_restart,
                })
        })
        .collect();
    rows.sort_by_key(AllocationRow::sort_key);
    rows
}

/// Fetch every allocation and build the report.
///
/// # Errors
///
/// Propagates the orchestrator's list failure.
pub async fn list(orchestrator: &dyn Orchestrator) -> Result<Vec<AllocationRow>> {
    let allocations = orchestrator.list_allocations().await?;
    Ok(rows(&allocations))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::testkit::domain::AllocationBuilder;
    use crate::testkit::orchestrator::FakeOrchestrator;

    #[test]
    fn one_row_per_task_sorted_by_job_and_task() {
        let allocations = vec![
            AllocationBuilder::new("web")
                .id("bbbbbbbb-1")
                .task("app")
                .task_state("proxy", "dead", None)
                .build(),
            AllocationBuilder::new("api").id("aaaaaaaa-1").task("app").build(),
            AllocationBuilder::new("web").id("cccccccc-1").task("app").build(),
        ];

        let rows = rows(&allocations);
        let keys: Vec<(&str, &str, &str)> = rows
            .iter()
            .map(|r| (r.job_id.as_str(), r.task.as_str(), r.allocation.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("api", "app", "aaaaaaaa"),
                ("web", "app", "bbbbbbbb"),
                ("web", "app", "cccccccc"),
                ("web", "proxy", "bbbbbbbb"),
            ]
        );
        assert_eq!(rows[3].state, TaskStateKind::Dead);
    }

    #[test]
    fn sort_key_is_plain_concatenation() {
        // "abc" < "abd", although job "a" < job "ab".
        let allocations = vec![
            AllocationBuilder::new("ab").task("c").build(),
            AllocationBuilder::new("a").task("bd").build(),
        ];
        let rows = rows(&allocations);
        assert_eq!(rows[0].job_id, "ab");
        assert_eq!(rows[1].job_id, "a");
    }

    #[test]
    fn last_restart_is_carried() {
        let restarted = Utc.with_ymd_and_hms(2024, 3, 1, 10, 20, 30).unwrap();
        let allocations = vec![AllocationBuilder::new("web")
            .task_state("app", "running", Some(restarted))
            .build()];
        assert_eq!(rows(&allocations)[0].last_restart, Some(restarted));
    }

    #[tokio::test]
    async fn list_reads_from_the_orchestrator() {
        let fake = FakeOrchestrator::with_allocations(vec![
            AllocationBuilder::new("web").task("app").build(),
            AllocationBuilder::new("batch").task("worker").status("complete").build(),
        ]);
        let rows = list(fake.as_ref()).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].job_id, "batch");
    }

    #[tokio::test]
    async fn list_propagates_failures() {
        let fake = FakeOrchestrator::with_allocations(Vec::new());
        fake.fail_next_lists(1);
        assert!(list(fake.as_ref()).await.is_err());
    }
}
