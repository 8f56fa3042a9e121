//! `nomadlogs download` placeholder.

use super::output;

/// Print the placeholder message. Always succeeds.
pub fn execute() {
    output::message("not implemented yet");
}
