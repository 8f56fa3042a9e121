//! Target selection: which allocations a watcher tails.
//!
//! Grammar for a command-line target:
//!
//! - `task` selects task `task` in any job
//! - `job:task` selects task `task` only in allocations of job `job`
//!
//! Anything with more than one colon is an input error.

use std::fmt;
use std::str::FromStr;

use super::allocation::Allocation;
use crate::error::TargetError;

/// A `(job filter, task name)` pair. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target {
    job: Option<String>,
    task: String,
}

impl Target {
    /// Build a target directly. An empty job filter means "any job".
    pub fn new(job: Option<&str>, task: impl Into<String>) -> Self {
        Self {
            job: job.filter(|j| !j.is_empty()).map(ToOwned::to_owned),
            task: task.into(),
        }
    }

    /// The job filter, `None` when any job matches.
    #[must_use]
    pub fn job_filter(&self) -> Option<&str> {
        self.job.as_deref()
    }

    #[must_use]
    pub fn task(&self) -> &str {
        &self.task
    }

    /// Whether `allocation` should be streamed for this target.
    ///
    /// True iff the allocation has a state entry for the task, the job filter
    /// is empty or equals the job ID, and the client status is `running`.
    #[must_use]
    pub fn selects(&self, allocation: &Allocation) -> bool {
        if !allocation.has_task(&self.task) {
            return false;
        }
        if let Some(job) = &self.job {
            if job != &allocation.job_id {
                return false;
            }
        }
        allocation.client_status.is_running()
    }
}

impl FromStr for Target {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        let (job, task) = match parts.as_slice() {
            [task] => (None, *task),
            [job, task] => (Some(*job), *task),
            _ => return Err(TargetError::TooManyColons(s.to_string())),
        };
        if task.is_empty() {
            return Err(TargetError::EmptyTask(s.to_string()));
        }
        Ok(Self::new(job, task))
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.job {
            Some(job) => write!(f, "{job}:{}", self.task),
            None => f.write_str(&self.task),
        }
    }
}

/// Parse every positional argument into a [`Target`].
///
/// # Errors
///
/// [`TargetError::NoTargets`] for an empty list, otherwise the first
/// malformed target.
pub fn parse_targets<S: AsRef<str>>(args: &[S]) -> Result<Vec<Target>, TargetError> {
    if args.is_empty() {
        return Err(TargetError::NoTargets);
    }
    args.iter().map(|s| s.as_ref().parse()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AllocationId, ClientStatus, TaskState, TaskStateKind};
    use std::collections::BTreeMap;

    fn allocation(job: &str, task: &str, status: &str) -> Allocation {
        let mut task_states = BTreeMap::new();
        task_states.insert(
            task.to_string(),
            TaskState {
                state: TaskStateKind::Running,
                last_restart: None,
            },
        );
        Allocation {
            id: AllocationId::new("0123456789"),
            job_id: job.to_string(),
            job_name: job.to_string(),
            task_group: "group".to_string(),
            client_status: ClientStatus::from(status),
            task_states,
        }
    }

    #[test]
    fn bare_task_matches_any_job() {
        let target: Target = "a".parse().unwrap();
        assert_eq!(target.job_filter(), None);
        assert_eq!(target.task(), "a");
    }

    #[test]
    fn job_and_task() {
        let target: Target = "a:b".parse().unwrap();
        assert_eq!(target.job_filter(), Some("a"));
        assert_eq!(target.task(), "b");
        assert_eq!(target.to_string(), "a:b");
    }

    #[test]
    fn two_or_more_colons_is_an_error() {
        for input in ["a:b:c", "a::", "::", "web:app:x:y"] {
            assert_eq!(
                input.parse::<Target>(),
                Err(TargetError::TooManyColons(input.to_string())),
                "{input}"
            );
        }
    }

    #[test]
    fn empty_job_means_any_job() {
        let target: Target = ":app".parse().unwrap();
        assert_eq!(target.job_filter(), None);
        assert_eq!(target.task(), "app");
    }

    #[test]
    fn empty_task_is_rejected() {
        assert!(matches!(
            "web:".parse::<Target>(),
            Err(TargetError::EmptyTask(_))
        ));
        assert!(matches!("".parse::<Target>(), Err(TargetError::EmptyTask(_))));
    }

    #[test]
    fn parse_targets_rejects_empty_list() {
        let none: [&str; 0] = [];
        assert_eq!(parse_targets(&none), Err(TargetError::NoTargets));
    }

    #[test]
    fn parse_targets_stops_at_first_bad_target() {
        let result = parse_targets(&["web:app", "a:b:c", "db"]);
        assert_eq!(result, Err(TargetError::TooManyColons("a:b:c".into())));

        let ok = parse_targets(&["web:app", "db"]).unwrap();
        assert_eq!(ok, vec![Target::new(Some("web"), "app"), Target::new(None, "db")]);
    }

    #[test]
    fn selects_requires_task_job_and_running() {
        let any_job = Target::new(None, "app");
        let web_only = Target::new(Some("web"), "app");

        assert!(any_job.selects(&allocation("web", "app", "running")));
        assert!(any_job.selects(&allocation("api", "app", "running")));
        assert!(web_only.selects(&allocation("web", "app", "running")));

        assert!(!web_only.selects(&allocation("api", "app", "running")));
        assert!(!any_job.selects(&allocation("web", "worker", "running")));
        assert!(!any_job.selects(&allocation("web", "app", "pending")));
        assert!(!any_job.selects(&allocation("web", "app", "complete")));
    }
}
