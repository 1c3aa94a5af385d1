//! Player slot allocation.
//!
//! The allocator owns the registry mapping live connections to their
//! player numbers. Assignment always picks the lowest unused positive
//! integer, so slots are recycled as soon as their holder disconnects:
//! players 1 and 2 connected, player 1 leaves, the next arrival becomes
//! player 1 again.

use std::collections::{HashMap, HashSet};
use std::fmt;

use parking_lot::Mutex;
use tracing::debug;

use crate::ids::ConnectionId;

/// A player number: a positive integer unique among currently-connected
/// players. Not monotonic — numbers are reused after release.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slot(u32);

impl Slot {
    /// The raw player number.
    #[must_use]
    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Registry of live connections and their player slots.
///
/// All state lives behind a single mutex held only for the short
/// assign/release critical sections, never across I/O. The lock makes
/// assignment atomic: two concurrent [`assign`](Self::assign) calls can
/// never observe the same occupied set and hand out the same slot.
pub struct SlotAllocator {
    registry: Mutex<HashMap<ConnectionId, Slot>>,
}

impl SlotAllocator {
    /// Create an empty allocator.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: Mutex::new(HashMap::new()),
        }
    }

    /// Lowest-free probe + insert. Caller holds the registry lock.
    fn insert_lowest(registry: &mut HashMap<ConnectionId, Slot>, id: ConnectionId) -> Slot {
        let occupied: HashSet<u32> = registry.values().map(|s| s.0).collect();
        let mut n = 1;
        while occupied.contains(&n) {
            n += 1;
        }
        let slot = Slot(n);
        let _ = registry.insert(id, slot);
        slot
    }

    /// Assign the lowest unused slot to `id` and record the entry.
    ///
    /// Always succeeds; the probe terminates at occupancy + 1 in the
    /// worst case. O(n) in the current player count, which is fine at
    /// lobby scale.
    pub fn assign(&self, id: ConnectionId) -> Slot {
        let mut registry = self.registry.lock();
        let slot = Self::insert_lowest(&mut registry, id);
        debug!(connection_id = %id, slot = slot.get(), "slot assigned");
        slot
    }

    /// Assign a slot only if occupancy is below `max_players`.
    ///
    /// The capacity check and the insert run under the same lock, so
    /// concurrent callers can never push occupancy past `max_players` —
    /// exactly `max_players - occupancy` of them win, the rest get
    /// `None`.
    pub fn try_assign(&self, id: ConnectionId, max_players: usize) -> Option<Slot> {
        let mut registry = self.registry.lock();
        if registry.len() >= max_players {
            debug!(connection_id = %id, max_players, "lobby full, assignment refused");
            return None;
        }
        let slot = Self::insert_lowest(&mut registry, id);
        debug!(connection_id = %id, slot = slot.get(), "slot assigned");
        Some(slot)
    }

    /// Remove the entry for `id`, freeing its slot for reuse.
    ///
    /// Idempotent: releasing an unknown or already-released ID is a
    /// no-op, so duplicate cleanup paths are harmless. Returns the slot
    /// that was freed, if any.
    pub fn release(&self, id: ConnectionId) -> Option<Slot> {
        let released = self.registry.lock().remove(&id);
        if let Some(slot) = released {
            debug!(connection_id = %id, slot = slot.get(), "slot released");
        }
        released
    }

    /// Slot currently held by `id`, if connected.
    pub fn slot_for(&self, id: ConnectionId) -> Option<Slot> {
        self.registry.lock().get(&id).copied()
    }

    /// Number of currently-connected players.
    pub fn player_count(&self) -> usize {
        self.registry.lock().len()
    }
}

impl Default for SlotAllocator {
    fn default() -> Self {
        Self::new()
    }
}
