//! Application services (use cases).
//!
//! These services drive the orchestrator port and turn its data into output:
//!
//! - [`watch`] - discover allocations of a target and merge their log streams
//! - [`format`] - render log lines for humans
//! - [`listing`] - the `ls` report
//! - [`tail`] - run one watcher per target into a single sink

pub mod format;
pub mod listing;
pub mod tail;
pub mod watch;
