//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! # Available Ports
//!
//! - [`Orchestrator`], [`LogStream`] - cluster orchestrator integration

pub mod outbound;

pub use outbound::orchestrator::{LogStream, LogStreamRequest, Orchestrator};
