//! Transition policies.

use otherworlds_core::scene_id::SceneId;

/// Why a transition was refused and where to go instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Denial {
    /// Alternative target suggested to the caller.
    pub redirect_to: Option<SceneId>,
    /// Human-readable explanation.
    pub reason: String,
}

/// Outcome of evaluating a policy or guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The transition may proceed.
    Allow,
    /// The transition must not proceed.
    Deny(Denial),
}

impl Verdict {
    /// Shorthand for a denial.
    #[must_use]
    pub fn deny(redirect_to: Option<SceneId>, reason: impl Into<String>) -> Self {
        Verdict::Deny(Denial {
            redirect_to,
            reason: reason.into(),
        })
    }

    /// Whether this verdict allows the transition.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Verdict::Allow)
    }

    /// Short-circuit AND: returns `self` if it denies, otherwise evaluates
    /// `next`.
    #[must_use]
    pub fn and_then(self, next: impl FnOnce() -> Verdict) -> Verdict {
        match self {
            Verdict::Allow => next(),
            deny @ Verdict::Deny(_) => deny,
        }
    }
}

/// Decides whether the coordinator may move from `current` to `target`.
pub trait TransitionPolicy {
    /// Evaluates the transition.
    fn can_transition_to(&self, target: SceneId, current: SceneId) -> Verdict;
}

/// The coordinator's default policy: the initial scene can only be
/// re-entered from itself. Everything else is allowed.
#[derive(Debug, Clone, Copy)]
pub struct InitialScenePolicy {
    initial: SceneId,
}

impl InitialScenePolicy {
    /// Creates the policy for the given initial scene.
    #[must_use]
    pub fn new(initial: SceneId) -> Self {
        Self { initial }
    }
}

impl Default for InitialScenePolicy {
    fn default() -> Self {
        Self::new(SceneId::INITIAL)
    }
}

impl TransitionPolicy for InitialScenePolicy {
    fn can_transition_to(&self, target: SceneId, current: SceneId) -> Verdict {
        if target == self.initial && current != self.initial {
            return Verdict::deny(
                None,
                format!("{} can only be re-entered from itself", self.initial),
            );
        }
        Verdict::Allow
    }
}
