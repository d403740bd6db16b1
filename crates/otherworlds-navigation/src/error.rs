//! Navigation error types.

use otherworlds_core::scene_id::SceneId;
use thiserror::Error;

use crate::application::handlers::{HandlerError, HandlerPhase};

/// Errors returned by the transition coordinator.
///
/// `TransitionBlocked`, `NoHistory` and `TransitionInProgress` are expected
/// control flow and leave the coordinator untouched. `HandlerFault` is
/// returned after the transition flag has been reset, but the current scene
/// and history may already reflect the transition if an enter handler failed.
#[derive(Debug, Error)]
pub enum NavigationError {
    /// The transition policy or a guard denied the transition.
    #[error("transition to {target} blocked: {reason}")]
    TransitionBlocked {
        /// The scene that was requested.
        target: SceneId,
        /// Where the caller should go instead, if the denial suggests one.
        redirect_to: Option<SceneId>,
        /// Human-readable explanation.
        reason: String,
    },

    /// `go_back` needs at least two history entries.
    #[error("no history to go back to (history length {len})")]
    NoHistory {
        /// The history length at the time of the call.
        len: usize,
    },

    /// Another transition has not finished yet.
    #[error("transition to {target} rejected: another transition is in progress")]
    TransitionInProgress {
        /// The scene that was requested.
        target: SceneId,
    },

    /// An exit or enter handler failed.
    #[error("{phase} handler for {scene} failed: {source}")]
    HandlerFault {
        /// The scene whose handler failed.
        scene: SceneId,
        /// Whether the failing handler was an exit or enter handler.
        phase: HandlerPhase,
        /// The handler's error.
        #[source]
        source: HandlerError,
    },
}

impl NavigationError {
    /// The redirect suggested by a blocked transition, if any.
    #[must_use]
    pub fn redirect(&self) -> Option<SceneId> {
        match self {
            NavigationError::TransitionBlocked { redirect_to, .. } => *redirect_to,
            _ => None,
        }
    }
}
