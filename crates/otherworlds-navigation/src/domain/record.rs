//! The record produced once per transition.

use chrono::{DateTime, Utc};
use otherworlds_core::scene_id::SceneId;
use serde::Serialize;
use uuid::Uuid;

use super::options::TransitionPayload;

/// Describes one transition. Every exit and enter handler of that
/// transition receives the same record by reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransitionRecord {
    /// Correlation ID for tracing this transition through the logs.
    pub transition_id: Uuid,
    /// The scene being left.
    pub from_scene: SceneId,
    /// The scene being entered.
    pub to_scene: SceneId,
    /// Caller-supplied data.
    pub payload: TransitionPayload,
    /// When the transition started.
    pub timestamp: DateTime<Utc>,
}

impl TransitionRecord {
    /// Creates a record with a fresh transition ID.
    #[must_use]
    pub fn new(
        from_scene: SceneId,
        to_scene: SceneId,
        payload: TransitionPayload,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            transition_id: Uuid::new_v4(),
            from_scene,
            to_scene,
            payload,
            timestamp,
        }
    }
}
