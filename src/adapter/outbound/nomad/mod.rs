//! Nomad orchestrator integration.

pub mod client;
pub mod dto;
pub mod frame;

pub use client::NomadClient;
