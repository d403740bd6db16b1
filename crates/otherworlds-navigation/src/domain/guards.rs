//! Guards: predicates over the domain snapshot that may deny or redirect a
//! transition before it reaches the coordinator.

use otherworlds_core::scene_id::SceneId;
use otherworlds_core::snapshot::{ActivityMode, DomainSnapshot, SnapshotSource};
use tracing::debug;

use super::policy::{Denial, TransitionPolicy, Verdict};

/// A stateless check of one transition target against the snapshot.
pub trait Guard {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Evaluates entry into `target`.
    fn check(&self, target: SceneId, snapshot: &DomainSnapshot) -> Verdict;
}

/// Denies party-dependent scenes while the party is empty.
#[derive(Debug, Clone, Copy)]
pub struct ExistenceGuard {
    redirect_to: SceneId,
}

impl ExistenceGuard {
    /// Redirects to `redirect_to` on denial.
    #[must_use]
    pub fn new(redirect_to: SceneId) -> Self {
        Self { redirect_to }
    }
}

impl Default for ExistenceGuard {
    fn default() -> Self {
        Self::new(SceneId::Hub)
    }
}

impl Guard for ExistenceGuard {
    fn name(&self) -> &'static str {
        "existence"
    }

    fn check(&self, target: SceneId, snapshot: &DomainSnapshot) -> Verdict {
        if target.requires_party() && snapshot.party_member_count == 0 {
            return Verdict::deny(
                Some(self.redirect_to),
                format!("{target} requires at least one party member"),
            );
        }
        Verdict::Allow
    }
}

/// Denies town services unless the party is safely in town.
#[derive(Debug, Clone, Copy)]
pub struct ExclusivityGuard {
    redirect_to: SceneId,
}

impl ExclusivityGuard {
    /// Redirects to `redirect_to` on denial.
    #[must_use]
    pub fn new(redirect_to: SceneId) -> Self {
        Self { redirect_to }
    }
}

impl Default for ExclusivityGuard {
    fn default() -> Self {
        Self::new(SceneId::ExpeditionStaging)
    }
}

impl Guard for ExclusivityGuard {
    fn name(&self) -> &'static str {
        "exclusivity"
    }

    fn check(&self, target: SceneId, snapshot: &DomainSnapshot) -> Verdict {
        if target.is_town_service() && snapshot.activity_mode != ActivityMode::Safe {
            return Verdict::deny(
                Some(self.redirect_to),
                format!(
                    "{target} is unavailable while the party is in {:?} mode",
                    snapshot.activity_mode
                ),
            );
        }
        Verdict::Allow
    }
}

/// Guards evaluated in a fixed order; the first denial wins.
#[derive(Default)]
pub struct GuardChain {
    guards: Vec<Box<dyn Guard>>,
}

impl std::fmt::Debug for GuardChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.guards.iter().map(|g| g.name()))
            .finish()
    }
}

impl GuardChain {
    /// An empty chain, which allows everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Existence, then exclusivity, with their default redirects.
    #[must_use]
    pub fn standard() -> Self {
        Self::new()
            .with(ExistenceGuard::default())
            .with(ExclusivityGuard::default())
    }

    /// Appends a guard to the end of the chain.
    #[must_use]
    pub fn with(mut self, guard: impl Guard + 'static) -> Self {
        self.guards.push(Box::new(guard));
        self
    }

    /// Evaluates every guard in order, stopping at the first denial.
    #[must_use]
    pub fn check(&self, target: SceneId, snapshot: &DomainSnapshot) -> Verdict {
        for guard in &self.guards {
            if let Verdict::Deny(denial) = guard.check(target, snapshot) {
                debug!(guard = guard.name(), %target, reason = %denial.reason, "guard denied transition");
                return Verdict::Deny(denial);
            }
        }
        Verdict::Allow
    }

    /// Returns `target` if every guard allows it, otherwise the denial.
    ///
    /// # Errors
    ///
    /// Returns the first guard's `Denial`.
    pub fn resolve(&self, target: SceneId, snapshot: &DomainSnapshot) -> Result<SceneId, Denial> {
        match self.check(target, snapshot) {
            Verdict::Allow => Ok(target),
            Verdict::Deny(denial) => Err(denial),
        }
    }
}

/// Layers a guard chain on top of another policy, so the coordinator itself
/// enforces the guards. The inner policy runs first.
pub struct GuardedPolicy<P, S> {
    inner: P,
    guards: GuardChain,
    snapshots: S,
}

impl<P, S> GuardedPolicy<P, S> {
    /// Combines `inner` with `guards`, reading snapshots from `snapshots`.
    #[must_use]
    pub fn new(inner: P, guards: GuardChain, snapshots: S) -> Self {
        Self {
            inner,
            guards,
            snapshots,
        }
    }
}

impl<P, S> TransitionPolicy for GuardedPolicy<P, S>
where
    P: TransitionPolicy,
    S: SnapshotSource,
{
    fn can_transition_to(&self, target: SceneId, current: SceneId) -> Verdict {
        self.inner
            .can_transition_to(target, current)
            .and_then(|| self.guards.check(target, &self.snapshots.snapshot()))
    }
}
