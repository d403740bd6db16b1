//! The party model guards read from.

use std::cell::{Cell, RefCell};

use otherworlds_core::snapshot::{ActivityMode, DomainSnapshot, SnapshotSource};
use tracing::info;

/// Party roster and current activity.
#[derive(Debug, Default)]
pub struct PartyState {
    members: RefCell<Vec<String>>,
    mode: Cell<ActivityMode>,
}

impl PartyState {
    /// An empty party in town.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a member and returns the new party size.
    pub fn recruit(&self, name: impl Into<String>) -> usize {
        let name = name.into();
        let mut members = self.members.borrow_mut();
        members.push(name.clone());
        info!(member = %name, size = members.len(), "adventurer recruited");
        members.len()
    }

    /// Names of the current members, in recruitment order.
    #[must_use]
    pub fn members(&self) -> Vec<String> {
        self.members.borrow().clone()
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.borrow().len()
    }

    /// Whether the party has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.borrow().is_empty()
    }

    /// The current activity.
    #[must_use]
    pub fn mode(&self) -> ActivityMode {
        self.mode.get()
    }

    /// Switches the current activity.
    pub fn set_mode(&self, mode: ActivityMode) {
        if self.mode.replace(mode) != mode {
            info!(?mode, "party activity changed");
        }
    }
}

impl SnapshotSource for PartyState {
    fn snapshot(&self) -> DomainSnapshot {
        DomainSnapshot {
            party_member_count: u32::try_from(self.len()).unwrap_or(u32::MAX),
            activity_mode: self.mode(),
        }
    }
}
