//! Otherworlds client — application error types.

use otherworlds_navigation::NavigationError;
use otherworlds_scene::LifecycleError;
use thiserror::Error;

/// Startup and runtime errors for the client.
#[derive(Debug, Error)]
pub enum AppError {
    /// A configuration variable is invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// The coordinator rejected or failed a transition.
    #[error("navigation error: {0}")]
    Navigation(#[from] NavigationError),

    /// A scene could not be bound or driven.
    #[error("scene lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),
}

impl AppError {
    /// Whether the loop can carry on after this error. Denied, exhausted and
    /// overlapping navigation requests are recoverable; everything else is
    /// fatal.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AppError::Navigation(
                NavigationError::TransitionBlocked { .. }
                    | NavigationError::NoHistory { .. }
                    | NavigationError::TransitionInProgress { .. }
            ) | AppError::Lifecycle(LifecycleError::Navigation(
                NavigationError::TransitionInProgress { .. }
            ))
        )
    }
}
