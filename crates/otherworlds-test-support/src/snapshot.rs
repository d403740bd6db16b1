//! Test snapshot source — a mutable stand-in for host game state.

use std::cell::Cell;

use otherworlds_core::snapshot::{ActivityMode, DomainSnapshot, SnapshotSource};

/// A snapshot source whose values tests can change between calls.
#[derive(Debug, Default)]
pub struct FixedSnapshot {
    current: Cell<DomainSnapshot>,
}

impl FixedSnapshot {
    /// Creates a source returning `party_member_count` members in `mode`.
    #[must_use]
    pub fn new(party_member_count: u32, activity_mode: ActivityMode) -> Self {
        Self {
            current: Cell::new(DomainSnapshot {
                party_member_count,
                activity_mode,
            }),
        }
    }

    /// Replaces the snapshot returned from now on.
    pub fn set(&self, snapshot: DomainSnapshot) {
        self.current.set(snapshot);
    }
}

impl SnapshotSource for FixedSnapshot {
    fn snapshot(&self) -> DomainSnapshot {
        self.current.get()
    }
}
