//! Domain identifier types with proper encapsulation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Length of the abbreviated allocation ID shown to humans.
pub const SHORT_ID_LEN: usize = 8;

/// Allocation identifier - newtype for type safety.
///
/// Opaque to this crate; Nomad hands out UUIDs, unique per scheduling event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AllocationId(String);

impl AllocationId {
    /// Create a new `AllocationId` from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the allocation ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First [`SHORT_ID_LEN`] characters, or the whole ID when shorter.
    #[must_use]
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(SHORT_ID_LEN) {
            Some((end, _)) => &self.0[..end],
            None => &self.0,
        }
    }
}

impl fmt::Display for AllocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for AllocationId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for AllocationId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
