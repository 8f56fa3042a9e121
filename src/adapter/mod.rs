//! Adapters connecting ports to the outside world.
//!
//! - [`inbound`] - the command-line surface driving the application
//! - [`outbound`] - orchestrator clients implementing [`crate::port`] traits

pub mod inbound;
pub mod outbound;
