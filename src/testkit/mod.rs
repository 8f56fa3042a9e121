//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`orchestrator`]: [`FakeOrchestrator`](orchestrator::FakeOrchestrator),
//!   a scripted [`Orchestrator`](crate::port::Orchestrator) with
//!   channel-backed log streams.
//! - [`domain`]: Builders for allocations and targets.
//! - [`config`]: Canonical test configurations.
//! - [`logs`]: [`LogCapture`](logs::LogCapture) for asserting on
//!   `tracing` output.
//! - [`sink`]: A [`LineSink`](crate::application::tail::LineSink) that
//!   records output in memory.

pub mod config;
pub mod domain;
pub mod logs;
pub mod orchestrator;
pub mod sink;
