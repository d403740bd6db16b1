//! The transition coordinator.
//!
//! Owns the current scene id, the navigation history and the enter/exit
//! handler registries, and runs the single transition algorithm:
//! policy check, exit handlers, optional suspension, commit, history,
//! enter handlers. The coordinator is single-threaded (`!Send`); hosts share
//! it through `Rc`.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use otherworlds_core::clock::{Clock, Timer};
use otherworlds_core::scene_id::SceneId;
use tracing::{debug, info, instrument};

use crate::application::handlers::{
    HandlerError, HandlerPhase, HandlerRegistry, SubscriptionToken, TransitionHandler,
};
use crate::domain::history::NavigationHistory;
use crate::domain::options::TransitionOptions;
use crate::domain::policy::{InitialScenePolicy, TransitionPolicy, Verdict};
use crate::domain::record::TransitionRecord;
use crate::error::NavigationError;

#[derive(Debug)]
struct CoordinatorState {
    current: SceneId,
    history: NavigationHistory,
    transition_active: bool,
}

/// Raises the transition flag for as long as it lives. Dropping it (on
/// success, on error, or when the transition future itself is dropped)
/// lowers the flag again.
struct ActiveTransition<'a> {
    state: &'a RefCell<CoordinatorState>,
}

impl<'a> ActiveTransition<'a> {
    fn engage(state: &'a RefCell<CoordinatorState>) -> Self {
        state.borrow_mut().transition_active = true;
        Self { state }
    }
}

impl Drop for ActiveTransition<'_> {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.try_borrow_mut() {
            state.transition_active = false;
        }
    }
}

/// Holds the history entry `go_back` popped. Dropping it pushes the entry
/// back unless the transition committed, so a failed or abandoned
/// `go_back` leaves the history as it was.
struct PoppedEntry<'a> {
    state: &'a RefCell<CoordinatorState>,
    entry: Option<SceneId>,
}

impl<'a> PoppedEntry<'a> {
    fn hold(state: &'a RefCell<CoordinatorState>, entry: SceneId) -> Self {
        Self {
            state,
            entry: Some(entry),
        }
    }

    fn commit(mut self) {
        self.entry = None;
    }
}

impl Drop for PoppedEntry<'_> {
    fn drop(&mut self) {
        let Some(entry) = self.entry.take() else {
            return;
        };
        if let Ok(mut state) = self.state.try_borrow_mut() {
            state.history.push(entry);
            debug!(%entry, "history entry restored");
        }
    }
}

/// Decides which scene is current and sequences every transition.
pub struct TransitionCoordinator {
    initial: SceneId,
    state: RefCell<CoordinatorState>,
    handlers: RefCell<HandlerRegistry>,
    policy: Box<dyn TransitionPolicy>,
    clock: Arc<dyn Clock>,
    timer: Arc<dyn Timer>,
}

impl std::fmt::Debug for TransitionCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransitionCoordinator")
            .field("initial", &self.initial)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl TransitionCoordinator {
    /// Creates a coordinator starting in `initial`, guarded only by the
    /// initial-scene rule.
    #[must_use]
    pub fn new(initial: SceneId, clock: Arc<dyn Clock>, timer: Arc<dyn Timer>) -> Self {
        Self {
            initial,
            state: RefCell::new(CoordinatorState {
                current: initial,
                history: NavigationHistory::new(),
                transition_active: false,
            }),
            handlers: RefCell::new(HandlerRegistry::default()),
            policy: Box::new(InitialScenePolicy::new(initial)),
            clock,
            timer,
        }
    }

    /// Replaces the transition policy. Callers that want to keep the
    /// initial-scene rule compose it into `policy` themselves.
    #[must_use]
    pub fn with_policy(mut self, policy: impl TransitionPolicy + 'static) -> Self {
        self.policy = Box::new(policy);
        self
    }

    /// Wraps the coordinator for sharing with collaborators.
    #[must_use]
    pub fn shared(self) -> Rc<Self> {
        Rc::new(self)
    }

    /// Moves to `target`.
    ///
    /// Exit handlers of the current scene run before the commit, enter
    /// handlers of `target` after it, both with the same record. A fade or
    /// slide with a non-zero delay suspends once between the two.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError::TransitionInProgress` if another transition
    /// has not finished, `NavigationError::TransitionBlocked` if the policy
    /// denies the move (nothing is mutated in either case), and
    /// `NavigationError::HandlerFault` if a handler fails.
    #[instrument(skip(self, options), fields(style = ?options.style, delay = ?options.delay))]
    pub async fn transition_to(
        &self,
        target: SceneId,
        options: TransitionOptions,
    ) -> Result<TransitionRecord, NavigationError> {
        let from = {
            let state = self.state.borrow();
            if state.transition_active {
                return Err(NavigationError::TransitionInProgress { target });
            }
            state.current
        };

        if let Verdict::Deny(denial) = self.policy.can_transition_to(target, from) {
            debug!(%from, %target, reason = %denial.reason, "transition blocked");
            return Err(NavigationError::TransitionBlocked {
                target,
                redirect_to: denial.redirect_to,
                reason: denial.reason,
            });
        }

        let _active = ActiveTransition::engage(&self.state);
        let suspends = options.suspends();
        let record = TransitionRecord::new(from, target, options.payload, self.clock.now());

        self.fire(HandlerPhase::Exit, from, &record)?;

        if suspends {
            self.timer.sleep(options.delay).await;
        }

        {
            let mut state = self.state.borrow_mut();
            state.current = target;
            if options.record_in_history {
                state.history.push(target);
            }
        }
        info!(
            transition_id = %record.transition_id,
            %from,
            to = %target,
            "scene transition committed"
        );

        self.fire(HandlerPhase::Enter, target, &record)?;

        Ok(record)
    }

    /// Returns to the previous history entry without recording it again.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError::NoHistory` with fewer than two entries, and
    /// otherwise whatever `transition_to` returns. If the transition fails
    /// before its commit, or the returned future is dropped while
    /// suspended, the history is left as it was.
    #[instrument(skip(self, options))]
    pub async fn go_back(
        &self,
        options: TransitionOptions,
    ) -> Result<TransitionRecord, NavigationError> {
        let (popped, previous) = {
            let mut state = self.state.borrow_mut();
            let len = state.history.len();
            if len < 2 {
                return Err(NavigationError::NoHistory { len });
            }
            if state.transition_active {
                return Err(NavigationError::TransitionInProgress {
                    target: state.history.previous().unwrap_or(state.current),
                });
            }
            let (Some(popped), Some(previous)) = (state.history.pop(), state.history.top()) else {
                return Err(NavigationError::NoHistory { len });
            };
            (popped, previous)
        };
        let popped = PoppedEntry::hold(&self.state, popped);

        let result = self.transition_to(previous, options.without_history()).await;

        let committed = matches!(
            result,
            Ok(_)
                | Err(NavigationError::HandlerFault {
                    phase: HandlerPhase::Enter,
                    ..
                })
        );
        if committed {
            popped.commit();
        }
        result
    }

    /// Resets to the initial scene and empties the history. No handlers
    /// fire.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError::TransitionInProgress` while a transition is
    /// running.
    pub fn clear_history(&self) -> Result<(), NavigationError> {
        let mut state = self.state.borrow_mut();
        if state.transition_active {
            return Err(NavigationError::TransitionInProgress {
                target: self.initial,
            });
        }
        state.current = self.initial;
        state.history.clear();
        info!(initial = %self.initial, "navigation history cleared");
        Ok(())
    }

    /// Registers `handler` to run whenever `scene` is entered.
    pub fn on_scene_enter<F>(&self, scene: SceneId, handler: F) -> SubscriptionToken
    where
        F: Fn(&TransitionRecord) -> Result<(), HandlerError> + 'static,
    {
        self.register(HandlerPhase::Enter, scene, Rc::new(handler))
    }

    /// Registers `handler` to run whenever `scene` is left.
    pub fn on_scene_exit<F>(&self, scene: SceneId, handler: F) -> SubscriptionToken
    where
        F: Fn(&TransitionRecord) -> Result<(), HandlerError> + 'static,
    {
        self.register(HandlerPhase::Exit, scene, Rc::new(handler))
    }

    /// Removes a handler. Returns whether it was still registered.
    pub fn unsubscribe(&self, token: SubscriptionToken) -> bool {
        self.handlers.borrow_mut().remove(token)
    }

    /// Number of handlers registered for `scene` in `phase`.
    #[must_use]
    pub fn handler_count(&self, phase: HandlerPhase, scene: SceneId) -> usize {
        self.handlers.borrow().count(phase, scene)
    }

    /// Evaluates the policy for `target` from the current scene without
    /// transitioning.
    #[must_use]
    pub fn can_transition_to(&self, target: SceneId) -> Verdict {
        let current = self.state.borrow().current;
        self.policy.can_transition_to(target, current)
    }

    /// The designated initial scene.
    #[must_use]
    pub fn initial_scene(&self) -> SceneId {
        self.initial
    }

    /// The current scene.
    #[must_use]
    pub fn current_scene(&self) -> SceneId {
        self.state.borrow().current
    }

    /// The second-most-recent history entry.
    #[must_use]
    pub fn previous_scene(&self) -> Option<SceneId> {
        self.state.borrow().history.previous()
    }

    /// A copy of the history, oldest first.
    #[must_use]
    pub fn navigation_history(&self) -> Vec<SceneId> {
        self.state.borrow().history.to_vec()
    }

    /// Whether a transition is currently running.
    #[must_use]
    pub fn is_transitioning(&self) -> bool {
        self.state.borrow().transition_active
    }

    fn register(
        &self,
        phase: HandlerPhase,
        scene: SceneId,
        handler: TransitionHandler,
    ) -> SubscriptionToken {
        debug!(%phase, %scene, "registering transition handler");
        self.handlers.borrow_mut().register(phase, scene, handler)
    }

    fn fire(
        &self,
        phase: HandlerPhase,
        scene: SceneId,
        record: &TransitionRecord,
    ) -> Result<(), NavigationError> {
        let handlers = self.handlers.borrow().snapshot(phase, scene);
        debug!(%phase, %scene, count = handlers.len(), "firing transition handlers");
        for handler in handlers {
            handler(record).map_err(|source| NavigationError::HandlerFault {
                scene,
                phase,
                source,
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::future::Future;
    use std::pin::Pin;
    use std::rc::Rc;
    use std::sync::Arc;
    use std::task::Poll;
    use std::time::Duration;

    use otherworlds_core::scene_id::SceneId;
    use otherworlds_core::snapshot::ActivityMode;
    use otherworlds_test_support::{FixedClock, FixedSnapshot, RecordingTimer};

    use super::TransitionCoordinator;
    use crate::application::handlers::HandlerPhase;
    use crate::domain::guards::{GuardChain, GuardedPolicy};
    use crate::domain::history::HISTORY_CAPACITY;
    use crate::domain::options::TransitionOptions;
    use crate::domain::policy::{InitialScenePolicy, Verdict};
    use crate::error::NavigationError;

    fn coordinator_with_timer(timer: Arc<RecordingTimer>) -> TransitionCoordinator {
        TransitionCoordinator::new(SceneId::Title, Arc::new(FixedClock::standard()), timer)
    }

    fn coordinator() -> TransitionCoordinator {
        coordinator_with_timer(Arc::new(RecordingTimer::new()))
    }

    async fn walk(coordinator: &TransitionCoordinator, scenes: &[SceneId]) {
        for scene in scenes {
            coordinator
                .transition_to(*scene, TransitionOptions::instant())
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_transition_commits_target_and_returns_record() {
        // Arrange
        let coordinator = coordinator();
        let payload = TransitionOptions::instant().with_payload("slot", serde_json::json!(2));

        // Act
        let record = coordinator.transition_to(SceneId::Hub, payload).await.unwrap();

        // Assert
        assert_eq!(coordinator.current_scene(), SceneId::Hub);
        assert_eq!(record.from_scene, SceneId::Title);
        assert_eq!(record.to_scene, SceneId::Hub);
        assert_eq!(record.payload["slot"], serde_json::json!(2));
        assert_eq!(record.timestamp, FixedClock::standard().0);
        assert_eq!(coordinator.navigation_history(), vec![SceneId::Hub]);
        assert!(!coordinator.is_transitioning());
    }

    #[tokio::test]
    async fn test_current_scene_tracks_the_last_committed_record() {
        let coordinator = coordinator();
        for target in [SceneId::Hub, SceneId::PartyRoster, SceneId::Hub, SceneId::Dungeon] {
            let record = coordinator
                .transition_to(target, TransitionOptions::instant())
                .await
                .unwrap();
            assert_eq!(coordinator.current_scene(), record.to_scene);
        }
    }

    #[tokio::test]
    async fn test_blocked_transition_mutates_nothing() {
        // Arrange
        let coordinator = coordinator();
        walk(&coordinator, &[SceneId::Hub]).await;
        let exits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&exits);
        coordinator.on_scene_exit(SceneId::Hub, move |_| {
            counter.set(counter.get() + 1);
            Ok(())
        });

        // Act
        let result = coordinator
            .transition_to(SceneId::Title, TransitionOptions::instant())
            .await;

        // Assert
        match result {
            Err(NavigationError::TransitionBlocked {
                target,
                redirect_to,
                ..
            }) => {
                assert_eq!(target, SceneId::Title);
                assert_eq!(redirect_to, None);
            }
            other => panic!("expected TransitionBlocked, got {other:?}"),
        }
        assert_eq!(coordinator.current_scene(), SceneId::Hub);
        assert_eq!(coordinator.navigation_history(), vec![SceneId::Hub]);
        assert_eq!(exits.get(), 0);
        assert!(!coordinator.is_transitioning());
    }

    #[tokio::test]
    async fn test_initial_scene_may_transition_to_itself() {
        let coordinator = coordinator();
        assert_eq!(coordinator.can_transition_to(SceneId::Title), Verdict::Allow);

        let record = coordinator
            .transition_to(SceneId::Title, TransitionOptions::instant())
            .await
            .unwrap();

        assert_eq!(record.from_scene, SceneId::Title);
        assert_eq!(coordinator.navigation_history(), vec![SceneId::Title]);
    }

    #[tokio::test]
    async fn test_enter_handler_fires_once_with_matching_record() {
        // Arrange
        let coordinator = coordinator();
        walk(&coordinator, &[SceneId::Hub]).await;
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        coordinator.on_scene_enter(SceneId::Inn, move |record| {
            sink.borrow_mut().push((record.from_scene, record.to_scene));
            Ok(())
        });

        // Act
        coordinator
            .transition_to(SceneId::Inn, TransitionOptions::instant())
            .await
            .unwrap();

        // Assert
        assert_eq!(*seen.borrow(), vec![(SceneId::Hub, SceneId::Inn)]);
    }

    #[tokio::test]
    async fn test_exit_handlers_run_strictly_before_enter_handlers() {
        // Arrange
        let coordinator = coordinator();
        walk(&coordinator, &[SceneId::Hub]).await;
        let counter = Rc::new(Cell::new(0_u32));
        let exit_at = Rc::new(Cell::new(0_u32));
        let enter_at = Rc::new(Cell::new(0_u32));
        {
            let (counter, exit_at) = (Rc::clone(&counter), Rc::clone(&exit_at));
            coordinator.on_scene_exit(SceneId::Hub, move |_| {
                counter.set(counter.get() + 1);
                exit_at.set(counter.get());
                Ok(())
            });
        }
        {
            let (counter, enter_at) = (Rc::clone(&counter), Rc::clone(&enter_at));
            coordinator.on_scene_enter(SceneId::Shop, move |_| {
                counter.set(counter.get() + 1);
                enter_at.set(counter.get());
                Ok(())
            });
        }

        // Act
        coordinator
            .transition_to(SceneId::Shop, TransitionOptions::fade(Duration::from_millis(200)))
            .await
            .unwrap();

        // Assert
        assert!(exit_at.get() > 0);
        assert!(exit_at.get() < enter_at.get());
    }

    #[tokio::test]
    async fn test_handlers_for_one_scene_fire_in_registration_order() {
        let coordinator = coordinator();
        let order = Rc::new(RefCell::new(Vec::new()));
        for label in ["first", "second", "third"] {
            let order = Rc::clone(&order);
            coordinator.on_scene_enter(SceneId::Hub, move |_| {
                order.borrow_mut().push(label);
                Ok(())
            });
        }

        walk(&coordinator, &[SceneId::Hub]).await;

        assert_eq!(*order.borrow(), vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_fade_suspends_once_for_the_requested_delay() {
        // Arrange
        let timer = Arc::new(RecordingTimer::new());
        let coordinator = coordinator_with_timer(Arc::clone(&timer));

        // Act
        coordinator
            .transition_to(SceneId::Hub, TransitionOptions::fade(Duration::from_millis(300)))
            .await
            .unwrap();
        coordinator
            .transition_to(SceneId::Inn, TransitionOptions::instant())
            .await
            .unwrap();

        // Assert
        assert_eq!(timer.sleeps(), vec![Duration::from_millis(300)]);
    }

    #[tokio::test]
    async fn test_overlapping_transition_is_rejected_while_first_is_suspended() {
        // Arrange
        let coordinator = coordinator();
        walk(&coordinator, &[SceneId::Hub]).await;

        // Act
        let (first, second) = tokio::join!(
            coordinator.transition_to(SceneId::Temple, TransitionOptions::fade(Duration::from_millis(300))),
            coordinator.transition_to(SceneId::Shop, TransitionOptions::instant()),
        );

        // Assert
        assert_eq!(first.unwrap().to_scene, SceneId::Temple);
        match second {
            Err(NavigationError::TransitionInProgress { target }) => {
                assert_eq!(target, SceneId::Shop);
            }
            other => panic!("expected TransitionInProgress, got {other:?}"),
        }
        assert_eq!(coordinator.current_scene(), SceneId::Temple);
        assert_eq!(
            coordinator.navigation_history(),
            vec![SceneId::Hub, SceneId::Temple]
        );
        assert!(!coordinator.is_transitioning());
    }

    #[tokio::test]
    async fn test_is_transitioning_is_true_during_handlers_only() {
        let coordinator = Rc::new(coordinator());
        let observed = Rc::new(Cell::new(false));
        {
            let weak = Rc::downgrade(&coordinator);
            let observed = Rc::clone(&observed);
            coordinator.on_scene_enter(SceneId::Hub, move |_| {
                let coordinator = weak.upgrade().expect("coordinator alive");
                observed.set(coordinator.is_transitioning());
                Ok(())
            });
        }

        walk(&coordinator, &[SceneId::Hub]).await;

        assert!(observed.get());
        assert!(!coordinator.is_transitioning());
    }

    #[tokio::test]
    async fn test_exit_handler_fault_resets_flag_and_leaves_scene_uncommitted() {
        // Arrange
        let coordinator = coordinator();
        walk(&coordinator, &[SceneId::Hub]).await;
        coordinator.on_scene_exit(SceneId::Hub, |_| Err("save failed".into()));

        // Act
        let result = coordinator
            .transition_to(SceneId::Dungeon, TransitionOptions::instant())
            .await;

        // Assert
        match result {
            Err(NavigationError::HandlerFault { scene, phase, .. }) => {
                assert_eq!(scene, SceneId::Hub);
                assert_eq!(phase, HandlerPhase::Exit);
            }
            other => panic!("expected HandlerFault, got {other:?}"),
        }
        assert!(!coordinator.is_transitioning());
        assert_eq!(coordinator.current_scene(), SceneId::Hub);
    }

    #[tokio::test]
    async fn test_enter_handler_fault_resets_flag_after_commit() {
        // Arrange
        let coordinator = coordinator();
        let later = Rc::new(Cell::new(false));
        coordinator.on_scene_enter(SceneId::Hub, |_| Err("broken".into()));
        {
            let later = Rc::clone(&later);
            coordinator.on_scene_enter(SceneId::Hub, move |_| {
                later.set(true);
                Ok(())
            });
        }

        // Act
        let result = coordinator
            .transition_to(SceneId::Hub, TransitionOptions::instant())
            .await;

        // Assert
        assert!(matches!(
            result,
            Err(NavigationError::HandlerFault {
                phase: HandlerPhase::Enter,
                ..
            })
        ));
        assert!(!coordinator.is_transitioning());
        assert_eq!(coordinator.current_scene(), SceneId::Hub);
        assert_eq!(coordinator.navigation_history(), vec![SceneId::Hub]);
        assert!(!later.get(), "handlers after a failure should not run");
    }

    #[tokio::test]
    async fn test_dropping_a_suspended_transition_resets_the_flag() {
        // Arrange
        let coordinator = coordinator();
        let mut pending = Box::pin(
            coordinator.transition_to(SceneId::Hub, TransitionOptions::fade(Duration::from_secs(1))),
        );

        // Act: poll once so the transition reaches its suspension point.
        let poll = futures_poll_once(pending.as_mut()).await;
        assert!(poll.is_none());
        assert!(coordinator.is_transitioning());
        drop(pending);

        // Assert
        assert!(!coordinator.is_transitioning());
        assert_eq!(coordinator.current_scene(), SceneId::Title);
    }

    #[tokio::test]
    async fn test_dropping_a_suspended_go_back_keeps_the_history() {
        // Arrange
        let coordinator = coordinator();
        walk(&coordinator, &[SceneId::Hub, SceneId::Shop]).await;
        let mut pending =
            Box::pin(coordinator.go_back(TransitionOptions::fade(Duration::from_secs(1))));

        // Act
        let poll = futures_poll_once(pending.as_mut()).await;
        assert!(poll.is_none());
        assert_eq!(coordinator.navigation_history(), vec![SceneId::Hub]);
        drop(pending);

        // Assert
        assert!(!coordinator.is_transitioning());
        assert_eq!(coordinator.current_scene(), SceneId::Shop);
        assert_eq!(
            coordinator.navigation_history(),
            vec![SceneId::Hub, SceneId::Shop]
        );
        let back = coordinator.go_back(TransitionOptions::instant()).await.unwrap();
        assert_eq!(back.to_scene, SceneId::Hub);
    }

    async fn futures_poll_once<F: Future + Unpin>(mut fut: F) -> Option<F::Output> {
        std::future::poll_fn(|cx| {
            Poll::Ready(match Pin::new(&mut fut).poll(cx) {
                Poll::Ready(output) => Some(output),
                Poll::Pending => None,
            })
        })
        .await
    }

    #[tokio::test]
    async fn test_history_is_capped_and_evicts_oldest() {
        // Arrange
        let coordinator = coordinator();
        walk(&coordinator, &[SceneId::PartyRoster]).await;
        for _ in 1..HISTORY_CAPACITY {
            walk(&coordinator, &[SceneId::Hub]).await;
        }
        assert_eq!(coordinator.navigation_history().len(), HISTORY_CAPACITY);

        // Act
        walk(&coordinator, &[SceneId::Inn]).await;

        // Assert
        let history = coordinator.navigation_history();
        assert_eq!(history.len(), HISTORY_CAPACITY);
        assert_eq!(history.first(), Some(&SceneId::Hub));
        assert_eq!(history.last(), Some(&SceneId::Inn));
    }

    #[tokio::test]
    async fn test_unrecorded_transition_leaves_history_alone() {
        let coordinator = coordinator();
        walk(&coordinator, &[SceneId::Hub]).await;

        coordinator
            .transition_to(SceneId::Encounter, TransitionOptions::instant().without_history())
            .await
            .unwrap();

        assert_eq!(coordinator.current_scene(), SceneId::Encounter);
        assert_eq!(coordinator.navigation_history(), vec![SceneId::Hub]);
    }

    #[tokio::test]
    async fn test_go_back_walks_history_until_exhausted() {
        // Arrange: A -> B -> C
        let coordinator = coordinator();
        walk(&coordinator, &[SceneId::Hub, SceneId::Shop, SceneId::Temple]).await;

        // Act + Assert
        let back = coordinator.go_back(TransitionOptions::instant()).await.unwrap();
        assert_eq!(back.to_scene, SceneId::Shop);
        assert_eq!(coordinator.current_scene(), SceneId::Shop);
        assert_eq!(coordinator.previous_scene(), Some(SceneId::Hub));

        coordinator.go_back(TransitionOptions::instant()).await.unwrap();
        assert_eq!(coordinator.current_scene(), SceneId::Hub);
        assert_eq!(coordinator.navigation_history(), vec![SceneId::Hub]);

        match coordinator.go_back(TransitionOptions::instant()).await {
            Err(NavigationError::NoHistory { len }) => assert_eq!(len, 1),
            other => panic!("expected NoHistory, got {other:?}"),
        }
        assert_eq!(coordinator.current_scene(), SceneId::Hub);
    }

    #[tokio::test]
    async fn test_blocked_go_back_restores_history() {
        // Arrange: Title -> Title -> Hub; going back would re-enter Title.
        let coordinator = coordinator();
        walk(&coordinator, &[SceneId::Title, SceneId::Hub]).await;

        // Act
        let result = coordinator.go_back(TransitionOptions::instant()).await;

        // Assert
        assert!(matches!(result, Err(NavigationError::TransitionBlocked { .. })));
        assert_eq!(
            coordinator.navigation_history(),
            vec![SceneId::Title, SceneId::Hub]
        );
        assert_eq!(coordinator.current_scene(), SceneId::Hub);
    }

    #[tokio::test]
    async fn test_clear_history_resets_to_initial_scene() {
        let coordinator = coordinator();
        walk(&coordinator, &[SceneId::Hub, SceneId::Inn]).await;

        coordinator.clear_history().unwrap();

        assert_eq!(coordinator.current_scene(), SceneId::Title);
        assert!(coordinator.navigation_history().is_empty());
        assert_eq!(coordinator.previous_scene(), None);
    }

    #[tokio::test]
    async fn test_unsubscribed_handler_no_longer_fires() {
        // Arrange
        let coordinator = coordinator();
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        let token = coordinator.on_scene_enter(SceneId::Hub, move |_| {
            counter.set(counter.get() + 1);
            Ok(())
        });
        walk(&coordinator, &[SceneId::Hub]).await;

        // Act
        assert!(coordinator.unsubscribe(token));
        walk(&coordinator, &[SceneId::Inn, SceneId::Hub]).await;

        // Assert
        assert_eq!(hits.get(), 1);
        assert_eq!(coordinator.handler_count(HandlerPhase::Enter, SceneId::Hub), 0);
        assert!(!coordinator.unsubscribe(token));
    }

    #[tokio::test]
    async fn test_guarded_policy_blocks_with_redirect() {
        // Arrange
        let snapshot = Rc::new(FixedSnapshot::new(0, ActivityMode::Safe));
        let source = Rc::clone(&snapshot);
        let coordinator = coordinator().with_policy(GuardedPolicy::new(
            InitialScenePolicy::new(SceneId::Title),
            GuardChain::standard(),
            move || otherworlds_core::snapshot::SnapshotSource::snapshot(&*source),
        ));
        walk(&coordinator, &[SceneId::Hub]).await;

        // Act
        let result = coordinator
            .transition_to(SceneId::Shop, TransitionOptions::instant())
            .await;

        // Assert
        assert_eq!(result.unwrap_err().redirect(), Some(SceneId::Hub));
        assert_eq!(coordinator.current_scene(), SceneId::Hub);
    }
}
