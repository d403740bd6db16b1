//! Bounded navigation history.

use std::collections::VecDeque;

use otherworlds_core::scene_id::SceneId;

/// Maximum number of entries kept in the history.
pub const HISTORY_CAPACITY: usize = 100;

/// Chronological record of committed transition targets.
///
/// Holds at most [`HISTORY_CAPACITY`] entries; pushing past the cap evicts
/// the oldest entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationHistory {
    entries: VecDeque<SceneId>,
}

impl NavigationHistory {
    /// Creates an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(HISTORY_CAPACITY),
        }
    }

    /// Appends `scene`, evicting the oldest entry if the cap is exceeded.
    pub fn push(&mut self, scene: SceneId) {
        self.entries.push_back(scene);
        while self.entries.len() > HISTORY_CAPACITY {
            self.entries.pop_front();
        }
    }

    /// Removes and returns the most recent entry.
    pub fn pop(&mut self) -> Option<SceneId> {
        self.entries.pop_back()
    }

    /// The most recent entry.
    #[must_use]
    pub fn top(&self) -> Option<SceneId> {
        self.entries.back().copied()
    }

    /// The entry before the most recent one.
    #[must_use]
    pub fn previous(&self) -> Option<SceneId> {
        self.entries.iter().rev().nth(1).copied()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the history is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Copies the entries out, oldest first.
    #[must_use]
    pub fn to_vec(&self) -> Vec<SceneId> {
        self.entries.iter().copied().collect()
    }
}
