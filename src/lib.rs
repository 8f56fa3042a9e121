//! nomadlogs - tail and list task logs of Nomad allocations.
//!
//! Given one or more `job:task` targets, the crate discovers every running
//! allocation of each target, follows the stdout and stderr of its task, and
//! merges all of them into one output stream. New allocations are picked up
//! as they appear; finished ones drop out on their own.
//!
//! # Architecture
//!
//! Hexagonal layers:
//!
//! - [`domain`] - allocations, targets, log lines
//! - [`port`] - the [`Orchestrator`](port::Orchestrator) trait the
//!   application talks through
//! - [`application`] - watcher, formatter, listing, tail orchestration
//! - [`adapter`] - the Nomad HTTP client and the command-line surface
//! - [`infrastructure`] - configuration and logging setup
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use nomadlogs::adapter::outbound::nomad::NomadClient;
//! use nomadlogs::application::watch::Watcher;
//! use nomadlogs::infrastructure::config::{nomad::NomadConfig, watch::WatchConfig};
//!
//! # async fn demo() -> nomadlogs::error::Result<()> {
//! let address = NomadConfig::default().resolve_address(None)?;
//! let client = NomadClient::new(address, &NomadConfig::default())?;
//! let (handle, mut lines) = Watcher::start("web:app".parse()?, Arc::new(client), WatchConfig::default());
//! while let Some(line) = lines.next().await {
//!     println!("{}", line.text());
//! }
//! handle.stop().await;
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
