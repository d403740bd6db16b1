//! Scene and lifecycle error types.

use otherworlds_core::scene_id::SceneId;
use otherworlds_navigation::NavigationError;
use thiserror::Error;

use crate::binder::ScenePhase;

/// Errors a scene may report from `init`.
#[derive(Debug, Error)]
pub enum SceneError {
    /// A resource tied to the surface could not be loaded.
    #[error("failed to load resource {resource}: {reason}")]
    ResourceLoad {
        /// The resource that failed.
        resource: String,
        /// Why it failed.
        reason: String,
    },

    /// Any other scene-specific failure.
    #[error("{0}")]
    Other(String),
}

/// Returned by the binder's exit handlers while a bind is queued or running.
/// The coordinator reports it as an exit-phase `HandlerFault`, so the
/// transition never commits.
#[derive(Debug, Error)]
#[error("scene {target} is still being bound")]
pub struct BindInProgress {
    /// The scene the binder is working towards.
    pub target: SceneId,
}

/// Errors raised while binding or driving scene instances.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The new instance's `init` failed; nothing is bound.
    #[error("scene {scene} failed to initialise: {source}")]
    Init {
        /// The scene being bound.
        scene: SceneId,
        /// The scene's error.
        #[source]
        source: SceneError,
    },

    /// A contract method was called in a phase that does not permit it.
    #[error("scene {scene}: {operation} called while {phase:?}")]
    ContractViolation {
        /// The scene the call was made on.
        scene: SceneId,
        /// The method that was called.
        operation: &'static str,
        /// The phase the instance was in.
        phase: ScenePhase,
    },

    /// The factory built a different scene than the one requested.
    #[error("factory built {produced} when {requested} was requested")]
    FactoryMismatch {
        /// The scene that was requested.
        requested: SceneId,
        /// The scene the factory produced.
        produced: SceneId,
    },

    /// The coordinator refused a lifecycle-driven navigation step.
    #[error(transparent)]
    Navigation(#[from] NavigationError),
}
