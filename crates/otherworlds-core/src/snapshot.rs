//! Read-only domain snapshot consulted by navigation guards.

use serde::{Deserialize, Serialize};

/// What the party is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityMode {
    /// In town, no expedition underway.
    #[default]
    Safe,
    /// Out on an expedition.
    Expedition,
    /// Locked in an encounter.
    Encounter,
}

/// The slice of game state that guards are allowed to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DomainSnapshot {
    /// Number of characters currently in the party.
    pub party_member_count: u32,
    /// Current activity of the party.
    pub activity_mode: ActivityMode,
}

/// Host-supplied accessor producing the current snapshot.
pub trait SnapshotSource {
    /// Returns the snapshot as of now.
    fn snapshot(&self) -> DomainSnapshot;
}

impl<F> SnapshotSource for F
where
    F: Fn() -> DomainSnapshot,
{
    fn snapshot(&self) -> DomainSnapshot {
        self()
    }
}
