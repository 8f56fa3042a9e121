//! Orchestrator-agnostic domain types.

mod allocation;
mod id;
mod log_line;
mod target;

pub use allocation::{Allocation, ClientStatus, TaskState, TaskStateKind};
pub use id::AllocationId;
pub use log_line::{LineSource, LogLine, StreamKind};
pub use target::{parse_targets, Target};
