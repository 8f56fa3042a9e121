//! Infrastructure configuration modules.

pub mod logging;
pub mod nomad;
pub mod settings;
pub mod watch;
