//! The host: owns the engine and drives it once per tick.

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use otherworlds_core::clock::{Clock, Timer};
use otherworlds_core::input::InputSource;
use otherworlds_core::scene_id::SceneId;
use otherworlds_core::snapshot::SnapshotSource;
use otherworlds_navigation::domain::guards::{GuardChain, GuardedPolicy};
use otherworlds_navigation::domain::policy::{Denial, InitialScenePolicy, Verdict};
use otherworlds_navigation::{NavigationError, TransitionCoordinator, TransitionOptions};
use otherworlds_scene::SceneLifecycle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, instrument, warn};

use crate::config::ClientConfig;
use crate::error::AppError;
use crate::input::ScriptedInput;
use crate::party::PartyState;
use crate::request::{NavigationRequest, RequestQueue};
use crate::scenes::MenuFactory;
use crate::surface::TextSurface;

/// Owns the coordinator, the binder and the host-side collaborators.
pub struct Host {
    coordinator: Rc<TransitionCoordinator>,
    lifecycle: SceneLifecycle<TextSurface>,
    input: ScriptedInput,
    party: Rc<PartyState>,
    requests: RequestQueue,
    fade: Duration,
    ticks: Cell<u64>,
}

impl std::fmt::Debug for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Host")
            .field("current", &self.coordinator.current_scene())
            .field("bound", &self.lifecycle.current_scene_type())
            .field("ticks", &self.ticks.get())
            .finish_non_exhaustive()
    }
}

impl Host {
    /// Wires the engine together. The coordinator enforces the standard
    /// guards against the party state; nothing is bound until
    /// [`start`](Self::start).
    #[must_use]
    pub fn new(config: &ClientConfig, clock: Arc<dyn Clock>, timer: Arc<dyn Timer>) -> Self {
        let party = Rc::new(PartyState::new());
        let snapshots = {
            let party = Rc::clone(&party);
            move || party.snapshot()
        };
        let coordinator = TransitionCoordinator::new(SceneId::INITIAL, clock, timer)
            .with_policy(GuardedPolicy::new(
                InitialScenePolicy::default(),
                GuardChain::standard(),
                snapshots,
            ))
            .shared();

        let input = ScriptedInput::new(config.script.iter().copied());
        let requests = RequestQueue::new();
        let factory = MenuFactory::new(
            Rc::new(input.clone()) as Rc<dyn InputSource>,
            Rc::clone(&party),
            requests.clone(),
        );
        let lifecycle = SceneLifecycle::new(
            Rc::clone(&coordinator),
            Rc::new(TextSurface::new()),
            factory,
        );

        Self {
            coordinator,
            lifecycle,
            input,
            party,
            requests,
            fade: config.fade,
            ticks: Cell::new(0),
        }
    }

    /// Binds the initial scene.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Lifecycle` if the scene cannot be bound.
    pub async fn start(&self) -> Result<(), AppError> {
        self.lifecycle.start().await?;
        info!(scene = %self.coordinator.current_scene(), "client started");
        Ok(())
    }

    /// Runs one tick: delivers the next scripted key, updates and renders
    /// the bound scene, then applies the requests it posted.
    ///
    /// # Errors
    ///
    /// Returns the first non-recoverable error. Denied or exhausted
    /// navigation requests are logged and skipped.
    pub async fn tick(&self, delta_ms: f64) -> Result<(), AppError> {
        self.ticks.set(self.ticks.get() + 1);
        self.input.step();

        self.lifecycle.update(delta_ms)?;
        let surface = self.lifecycle.surface();
        surface.begin_frame();
        self.lifecycle.render(surface)?;

        for request in self.requests.drain() {
            match self.apply(request).await {
                Ok(()) => {}
                Err(err) if err.is_recoverable() => {
                    warn!(?request, error = %err, "navigation request rejected");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    /// Applies one request.
    ///
    /// # Errors
    ///
    /// Returns whatever the navigation step returns.
    pub async fn apply(&self, request: NavigationRequest) -> Result<(), AppError> {
        match request {
            NavigationRequest::Goto(target) => self.navigate(target).await.map(|_| ()),
            NavigationRequest::Back => self.go_back().await,
            NavigationRequest::Restart => self.restart().await,
        }
    }

    /// Moves to `target`, or to the guard's redirect if it is denied, then
    /// binds the scene. Returns the scene actually landed on.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Navigation` if the transition (or its redirect) is
    /// rejected, and `AppError::Lifecycle` if the bind fails. A scene that
    /// was committed is bound even when a later enter handler fails.
    #[instrument(skip(self))]
    pub async fn navigate(&self, target: SceneId) -> Result<SceneId, AppError> {
        let destination = match self.coordinator.can_transition_to(target) {
            Verdict::Allow => target,
            Verdict::Deny(Denial {
                redirect_to: Some(redirect),
                reason,
            }) => {
                warn!(%target, %redirect, %reason, "navigation redirected");
                redirect
            }
            Verdict::Deny(Denial {
                redirect_to: None,
                reason,
            }) => {
                return Err(NavigationError::TransitionBlocked {
                    target,
                    redirect_to: None,
                    reason,
                }
                .into());
            }
        };

        if destination != target && destination == self.coordinator.current_scene() {
            debug!(scene = %destination, "already at redirect target");
            return Ok(destination);
        }

        let transition = self
            .coordinator
            .transition_to(destination, TransitionOptions::fade(self.fade))
            .await;
        self.lifecycle.settle().await?;
        transition?;
        Ok(destination)
    }

    /// Returns to the previous scene in the history and binds it.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Navigation` with `NoHistory` when there is nowhere
    /// to go back to.
    pub async fn go_back(&self) -> Result<(), AppError> {
        let transition = self.coordinator.go_back(TransitionOptions::fade(self.fade)).await;
        self.lifecycle.settle().await?;
        transition?;
        Ok(())
    }

    /// Clears the history and rebinds the initial scene.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Lifecycle` if a transition is running or the bind
    /// fails.
    pub async fn restart(&self) -> Result<(), AppError> {
        self.lifecycle.restart().await?;
        info!("returned to title");
        Ok(())
    }

    /// Drives the loop at a fixed interval until `max_ticks` ticks have run
    /// or the script is replayed and nothing is pending. Returns the number
    /// of ticks run.
    ///
    /// # Errors
    ///
    /// Returns the first non-recoverable error from a tick.
    pub async fn run(&self, tick: Duration, max_ticks: u64) -> Result<u64, AppError> {
        let mut interval = tokio::time::interval(tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let delta_ms = tick.as_secs_f64() * 1000.0;

        let mut ran = 0;
        while ran < max_ticks {
            interval.tick().await;
            self.tick(delta_ms).await?;
            ran += 1;
            if self.is_idle() {
                break;
            }
        }
        info!(ticks = ran, scene = %self.coordinator.current_scene(), "client loop finished");
        Ok(ran)
    }

    /// Whether the script is exhausted and no request is pending.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.input.is_exhausted() && self.requests.is_empty() && !self.lifecycle.is_busy()
    }

    /// Unbinds the scene and detaches from the coordinator.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Lifecycle` if the bound scene cannot be retired.
    pub fn shutdown(&self) -> Result<(), AppError> {
        self.lifecycle.shutdown()?;
        Ok(())
    }

    /// The coordinator's current scene.
    #[must_use]
    pub fn current_scene(&self) -> SceneId {
        self.coordinator.current_scene()
    }

    /// The scene type the binder holds.
    #[must_use]
    pub fn bound_scene(&self) -> Option<SceneId> {
        self.lifecycle.current_scene_type()
    }

    /// The coordinator.
    #[must_use]
    pub fn coordinator(&self) -> &Rc<TransitionCoordinator> {
        &self.coordinator
    }

    /// The surface scenes draw into.
    #[must_use]
    pub fn surface(&self) -> &TextSurface {
        self.lifecycle.surface()
    }

    /// The input source scenes subscribe through.
    #[must_use]
    pub fn input(&self) -> &ScriptedInput {
        &self.input
    }

    /// The party model the guards read.
    #[must_use]
    pub fn party(&self) -> &PartyState {
        &self.party
    }

    /// Ticks run so far.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks.get()
    }
}
