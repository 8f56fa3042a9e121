//! The set of allocation IDs a watcher is currently streaming.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::domain::AllocationId;

/// Allocation IDs with an active stream consumer.
///
/// Every operation takes the one internal lock, so add/remove/contains are
/// linearizable. Cardinality is tens to low hundreds; a single mutex is enough.
#[derive(Debug, Default)]
pub struct WatchedSet {
    ids: Mutex<HashSet<AllocationId>>,
}

impl WatchedSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `id`, returning false if it was already present.
    pub fn try_add(&self, id: AllocationId) -> bool {
        self.ids.lock().insert(id)
    }

    /// Remove `id`, returning false if it was not present.
    pub fn remove(&self, id: &AllocationId) -> bool {
        self.ids.lock().remove(id)
    }

    #[must_use]
    pub fn contains(&self, id: &AllocationId) -> bool {
        self.ids.lock().contains(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.lock().is_empty()
    }

    /// Sorted snapshot of the current members.
    #[must_use]
    pub fn ids(&self) -> Vec<AllocationId> {
        let mut ids: Vec<AllocationId> = self.ids.lock().iter().cloned().collect();
        ids.sort();
        ids
    }

    /// Add `id` and tie its membership to the returned guard.
    ///
    /// Returns `None` if `id` is already a member. Dropping the [`Claim`]
    /// removes the ID again, exactly once, including on panic unwind.
    #[must_use]
    pub fn claim(set: &Arc<Self>, id: AllocationId) -> Option<Claim> {
        if !set.try_add(id.clone()) {
            return None;
        }
        Some(Claim {
            set: Arc::clone(set),
            id,
        })
    }
}

/// Membership of one allocation ID in a [`WatchedSet`].
#[derive(Debug)]
pub struct Claim {
    set: Arc<WatchedSet>,
    id: AllocationId,
}

impl Claim {
    #[must_use]
    pub fn id(&self) -> &AllocationId {
        &self.id
    }
}

impl Drop for Claim {
    fn drop(&mut self) {
        self.set.remove(&self.id);
    }
}
