//! The scene lifecycle binder.
//!
//! Listens to the coordinator's enter events and turns them into the
//! concrete exit/destroy/create/init/enter sequence of scene instances.
//! At most one instance is bound; the previous one is exited and destroyed
//! before the next one's `init` starts.
//!
//! Enter handlers run synchronously inside `transition_to`, but `init` is
//! asynchronous, so the handler only queues a bind request and marks the
//! binder busy. [`SceneLifecycle::settle`] performs the queued bind. While
//! busy, the binder's exit handlers refuse every transition, so the
//! coordinator cannot commit a scene the binder would not bind, and
//! `update`/`render` are no-ops.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use otherworlds_core::scene_id::SceneId;
use otherworlds_navigation::{
    HandlerError, NavigationError, SubscriptionToken, TransitionCoordinator, TransitionRecord,
};
use tracing::{debug, error, info, instrument, warn};

use crate::contract::{Scene, SceneFactory};
use crate::error::{BindInProgress, LifecycleError};

/// Where a scene instance is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenePhase {
    /// Built by the factory, `init` not yet completed.
    Constructed,
    /// `init` completed.
    Initialized,
    /// `enter` called; the instance is being driven.
    Active,
    /// `exit` called.
    Exited,
    /// `destroy` called; no further calls are allowed.
    Destroyed,
}

/// A scene instance together with the phase it has reached. Every call is
/// checked against the phase so contract violations fail fast.
struct BoundScene<S: ?Sized> {
    id: SceneId,
    scene: Box<dyn Scene<S>>,
    phase: ScenePhase,
}

impl<S: ?Sized> BoundScene<S> {
    fn new(scene: Box<dyn Scene<S>>) -> Self {
        Self {
            id: scene.scene_id(),
            scene,
            phase: ScenePhase::Constructed,
        }
    }

    fn require(&self, operation: &'static str, allowed: &[ScenePhase]) -> Result<(), LifecycleError> {
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            Err(LifecycleError::ContractViolation {
                scene: self.id,
                operation,
                phase: self.phase,
            })
        }
    }

    async fn init(&mut self, surface: &S) -> Result<(), LifecycleError> {
        self.require("init", &[ScenePhase::Constructed])?;
        self.scene
            .init(surface)
            .await
            .map_err(|source| LifecycleError::Init {
                scene: self.id,
                source,
            })?;
        self.phase = ScenePhase::Initialized;
        Ok(())
    }

    fn enter(&mut self, record: Option<&TransitionRecord>) -> Result<(), LifecycleError> {
        self.require("enter", &[ScenePhase::Initialized])?;
        self.scene.enter(record);
        self.phase = ScenePhase::Active;
        Ok(())
    }

    fn update(&mut self, delta_ms: f64) -> Result<(), LifecycleError> {
        self.require("update", &[ScenePhase::Active])?;
        self.scene.update(delta_ms);
        Ok(())
    }

    fn render(&mut self, surface: &S) -> Result<(), LifecycleError> {
        self.require("render", &[ScenePhase::Active])?;
        self.scene.render(surface);
        Ok(())
    }

    fn exit(&mut self) -> Result<(), LifecycleError> {
        self.require("exit", &[ScenePhase::Initialized, ScenePhase::Active])?;
        self.scene.exit();
        self.phase = ScenePhase::Exited;
        Ok(())
    }

    fn destroy(&mut self) -> Result<(), LifecycleError> {
        self.require(
            "destroy",
            &[ScenePhase::Constructed, ScenePhase::Initialized, ScenePhase::Exited],
        )?;
        self.scene.destroy();
        self.phase = ScenePhase::Destroyed;
        Ok(())
    }

    /// Exits (if it got that far) and destroys the instance.
    fn retire(&mut self) -> Result<(), LifecycleError> {
        if matches!(self.phase, ScenePhase::Initialized | ScenePhase::Active) {
            self.exit()?;
        }
        self.destroy()
    }
}

struct BindRequest {
    target: SceneId,
    record: Option<TransitionRecord>,
}

struct BinderState<S: ?Sized> {
    bound: Option<BoundScene<S>>,
    /// The scene a queued or running bind is working towards.
    binding: Option<SceneId>,
    pending: Option<BindRequest>,
}

impl<S: ?Sized> BinderState<S> {
    fn bound_id(&self) -> Option<SceneId> {
        self.bound.as_ref().map(|bound| bound.id)
    }

    fn is_busy(&self) -> bool {
        self.binding.is_some()
    }
}

/// Queues a bind of `target`. Returns whether the request was accepted.
fn request_bind<S: ?Sized>(
    state: &RefCell<BinderState<S>>,
    target: SceneId,
    record: Option<&TransitionRecord>,
) -> bool {
    let Ok(mut state) = state.try_borrow_mut() else {
        warn!(%target, "reentrant transition ignored: binder state in use");
        return false;
    };
    if state.pending.is_none() && state.bound_id() == Some(target) {
        debug!(%target, "scene already bound, skipping rebind");
        return false;
    }
    if let Some(binding) = state.binding {
        warn!(
            %target,
            %binding,
            "reentrant transition ignored: binder is busy"
        );
        return false;
    }
    state.binding = Some(target);
    state.pending = Some(BindRequest {
        target,
        record: record.cloned(),
    });
    true
}

/// Exit handler: refuses to leave the current scene while a bind is queued
/// or running.
fn refuse_while_binding<S: ?Sized>(state: &RefCell<BinderState<S>>) -> Result<(), HandlerError> {
    let Ok(state) = state.try_borrow() else {
        return Ok(());
    };
    match state.binding {
        Some(target) => {
            debug!(%target, "transition refused: bind in progress");
            Err(BindInProgress { target }.into())
        }
        None => Ok(()),
    }
}

/// Clears the busy flag when dropped.
struct BusyFlag<'a, S: ?Sized>(&'a RefCell<BinderState<S>>);

impl<S: ?Sized> Drop for BusyFlag<'_, S> {
    fn drop(&mut self) {
        if let Ok(mut state) = self.0.try_borrow_mut() {
            state.binding = None;
        }
    }
}

/// Binds concrete scene instances to the coordinator's current scene.
pub struct SceneLifecycle<S: ?Sized + 'static> {
    coordinator: Rc<TransitionCoordinator>,
    surface: Rc<S>,
    factory: Box<dyn SceneFactory<S>>,
    state: Rc<RefCell<BinderState<S>>>,
    subscriptions: RefCell<Vec<SubscriptionToken>>,
}

impl<S: ?Sized + 'static> fmt::Debug for SceneLifecycle<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("SceneLifecycle")
            .field("bound", &state.bound_id())
            .field("binding", &state.binding)
            .field("subscriptions", &self.subscriptions.borrow().len())
            .finish_non_exhaustive()
    }
}

impl<S: ?Sized + 'static> SceneLifecycle<S> {
    /// Creates a binder and subscribes it to the enter and exit events of
    /// every scene. Nothing is bound until [`start`](Self::start) is awaited.
    pub fn new(
        coordinator: Rc<TransitionCoordinator>,
        surface: Rc<S>,
        factory: impl SceneFactory<S> + 'static,
    ) -> Self {
        let state = Rc::new(RefCell::new(BinderState {
            bound: None,
            binding: None,
            pending: None,
        }));

        let mut subscriptions = Vec::with_capacity(SceneId::ALL.len() * 2);
        for scene in SceneId::ALL {
            let enter_state = Rc::clone(&state);
            subscriptions.push(coordinator.on_scene_enter(scene, move |record| {
                request_bind(&enter_state, record.to_scene, Some(record));
                Ok(())
            }));
            let exit_state = Rc::clone(&state);
            subscriptions.push(
                coordinator.on_scene_exit(scene, move |_| refuse_while_binding(&exit_state)),
            );
        }

        Self {
            coordinator,
            surface,
            factory: Box::new(factory),
            state,
            subscriptions: RefCell::new(subscriptions),
        }
    }

    /// Binds the coordinator's current scene.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError` if the scene fails to initialise.
    pub async fn start(&self) -> Result<(), LifecycleError> {
        request_bind(&self.state, self.coordinator.current_scene(), None);
        self.settle().await
    }

    /// Clears the navigation history and rebinds the initial scene. A bind
    /// that is queued but not yet started is discarded in favour of the
    /// initial scene.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::Navigation` if a transition or a bind is
    /// running, or any error from rebinding.
    pub async fn restart(&self) -> Result<(), LifecycleError> {
        let initial = self.coordinator.initial_scene();
        {
            let state = self.state.borrow();
            if state.is_busy() && state.pending.is_none() {
                return Err(NavigationError::TransitionInProgress { target: initial }.into());
            }
        }
        self.coordinator.clear_history()?;

        {
            let mut state = self.state.borrow_mut();
            if let Some(stale) = state.pending.take() {
                debug!(stale = %stale.target, %initial, "queued bind discarded by restart");
            }
            if state.bound_id() == Some(initial) {
                state.binding = None;
            } else {
                state.binding = Some(initial);
                state.pending = Some(BindRequest {
                    target: initial,
                    record: None,
                });
            }
        }
        self.settle().await
    }

    /// Performs the queued bind, if any: exits and destroys the bound
    /// instance, then creates, initialises, binds and enters the new one.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::Init` if the new instance fails to
    /// initialise (it is destroyed and nothing stays bound),
    /// `LifecycleError::FactoryMismatch` if the factory built the wrong
    /// scene, or `LifecycleError::ContractViolation` on an out-of-order call.
    #[instrument(skip(self))]
    pub async fn settle(&self) -> Result<(), LifecycleError> {
        let Some(request) = self.state.borrow_mut().pending.take() else {
            return Ok(());
        };
        let _busy = BusyFlag(&self.state);

        let previous = self.state.borrow_mut().bound.take();
        if let Some(mut previous) = previous {
            debug!(scene = %previous.id, "retiring bound scene");
            previous.retire()?;
        }

        let mut next = BoundScene::new(self.factory.create(request.target));
        if next.id != request.target {
            next.destroy()?;
            return Err(LifecycleError::FactoryMismatch {
                requested: request.target,
                produced: next.id,
            });
        }

        if let Err(err) = next.init(&*self.surface).await {
            error!(scene = %request.target, error = %err, "scene failed to initialise");
            next.destroy()?;
            return Err(err);
        }

        let mut state = self.state.borrow_mut();
        let bound = state.bound.insert(next);
        bound.enter(request.record.as_ref())?;
        info!(scene = %request.target, "scene bound");
        Ok(())
    }

    /// Advances the bound scene. A no-op while busy or with nothing bound.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::ContractViolation` if the bound instance is
    /// not active.
    pub fn update(&self, delta_ms: f64) -> Result<(), LifecycleError> {
        let mut state = self.state.borrow_mut();
        if state.is_busy() {
            return Ok(());
        }
        match state.bound.as_mut() {
            Some(bound) => bound.update(delta_ms),
            None => Ok(()),
        }
    }

    /// Renders the bound scene. A no-op while busy or with nothing bound.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::ContractViolation` if the bound instance is
    /// not active.
    pub fn render(&self, surface: &S) -> Result<(), LifecycleError> {
        let mut state = self.state.borrow_mut();
        if state.is_busy() {
            return Ok(());
        }
        match state.bound.as_mut() {
            Some(bound) => bound.render(surface),
            None => Ok(()),
        }
    }

    /// The scene type of the bound instance.
    #[must_use]
    pub fn current_scene_type(&self) -> Option<SceneId> {
        self.state.borrow().bound_id()
    }

    /// The lifecycle phase of the bound instance.
    #[must_use]
    pub fn bound_phase(&self) -> Option<ScenePhase> {
        self.state.borrow().bound.as_ref().map(|bound| bound.phase)
    }

    /// Whether a bind is queued or in progress.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.state.borrow().is_busy()
    }

    /// The surface handed to scenes during `init`.
    #[must_use]
    pub fn surface(&self) -> &Rc<S> {
        &self.surface
    }

    /// The coordinator this binder listens to.
    #[must_use]
    pub fn coordinator(&self) -> &Rc<TransitionCoordinator> {
        &self.coordinator
    }

    /// Unsubscribes from the coordinator, then exits and destroys the bound
    /// instance. Calling it again is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::ContractViolation` if the bound instance
    /// cannot be retired.
    pub fn shutdown(&self) -> Result<(), LifecycleError> {
        let tokens: Vec<SubscriptionToken> = self.subscriptions.borrow_mut().drain(..).collect();
        for token in tokens {
            self.coordinator.unsubscribe(token);
        }

        let mut state = self.state.borrow_mut();
        state.pending = None;
        state.binding = None;
        if let Some(mut bound) = state.bound.take() {
            info!(scene = %bound.id, "shutting down bound scene");
            bound.retire()?;
        }
        Ok(())
    }

    /// Number of coordinator handlers this binder still holds.
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.borrow().len()
    }
}

impl<S: ?Sized + 'static> Drop for SceneLifecycle<S> {
    fn drop(&mut self) {
        if let Err(err) = self.shutdown() {
            error!(error = %err, "scene lifecycle shutdown failed");
        }
    }
}
