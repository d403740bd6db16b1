//! Shared test helpers for scene lifecycle integration tests.
#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use async_trait::async_trait;
use otherworlds_core::scene_id::SceneId;
use otherworlds_navigation::{TransitionCoordinator, TransitionRecord};
use otherworlds_scene::{Scene, SceneError, SceneLifecycle, ScopedInputRegistrar};
use otherworlds_test_support::{FakeInputSource, FixedClock, RecordingTimer};

/// Ordered log of every lifecycle call made on any test scene.
pub type Journal = Rc<RefCell<Vec<String>>>;

/// Surface that remembers which scenes rendered into it.
#[derive(Debug, Default)]
pub struct TestSurface {
    pub frames: RefCell<Vec<SceneId>>,
}

/// How the factory should build a given scene.
#[derive(Debug, Clone, Copy, Default)]
pub struct SceneBehaviour {
    /// `init` returns an error.
    pub fail_init: bool,
    /// `init` yields to the scheduler before completing.
    pub slow_init: bool,
}

/// A scene that journals every call and subscribes to key presses in `init`.
pub struct RecordingScene {
    id: SceneId,
    journal: Journal,
    registrar: ScopedInputRegistrar,
    behaviour: SceneBehaviour,
}

impl RecordingScene {
    fn log(&self, call: &str) {
        self.journal
            .borrow_mut()
            .push(format!("{}:{call}", self.id));
    }
}

#[async_trait(?Send)]
impl Scene<TestSurface> for RecordingScene {
    fn scene_id(&self) -> SceneId {
        self.id
    }

    async fn init(&mut self, _surface: &TestSurface) -> Result<(), SceneError> {
        self.log("init");
        self.registrar.on_key_press(|_| {});
        if self.behaviour.slow_init {
            tokio::task::yield_now().await;
        }
        if self.behaviour.fail_init {
            return Err(SceneError::ResourceLoad {
                resource: "portrait.png".into(),
                reason: "missing".into(),
            });
        }
        Ok(())
    }

    fn enter(&mut self, record: Option<&TransitionRecord>) {
        match record {
            Some(record) => self.log(&format!("enter:from={}", record.from_scene)),
            None => self.log("enter"),
        }
    }

    fn exit(&mut self) {
        self.log("exit");
    }

    fn update(&mut self, _delta_ms: f64) {
        self.log("update");
    }

    fn render(&mut self, surface: &TestSurface) {
        surface.frames.borrow_mut().push(self.id);
        self.log("render");
    }

    fn destroy(&mut self) {
        self.registrar.destroy();
        self.log("destroy");
    }
}

/// Everything a lifecycle test needs, wired together.
pub struct Harness {
    pub coordinator: Rc<TransitionCoordinator>,
    pub lifecycle: SceneLifecycle<TestSurface>,
    pub surface: Rc<TestSurface>,
    pub journal: Journal,
    pub input: FakeInputSource,
    pub timer: Arc<RecordingTimer>,
}

impl Harness {
    /// Journal entries, draining them.
    pub fn take_journal(&self) -> Vec<String> {
        std::mem::take(&mut *self.journal.borrow_mut())
    }
}

/// Builds a harness where every scene behaves normally.
pub fn harness() -> Harness {
    harness_with(|_| SceneBehaviour::default())
}

/// Builds a harness with per-scene behaviour.
pub fn harness_with(behaviour: impl Fn(SceneId) -> SceneBehaviour + 'static) -> Harness {
    let timer = Arc::new(RecordingTimer::new());
    let coordinator = TransitionCoordinator::new(
        SceneId::Title,
        Arc::new(FixedClock::standard()),
        Arc::clone(&timer) as Arc<dyn otherworlds_core::clock::Timer>,
    )
    .shared();
    let surface = Rc::new(TestSurface::default());
    let journal: Journal = Rc::new(RefCell::new(Vec::new()));
    let input = FakeInputSource::new();

    let factory = {
        let journal = Rc::clone(&journal);
        let input = input.clone();
        move |id: SceneId| -> Box<dyn Scene<TestSurface>> {
            Box::new(RecordingScene {
                id,
                journal: Rc::clone(&journal),
                registrar: ScopedInputRegistrar::new(Rc::new(input.clone())),
                behaviour: behaviour(id),
            })
        }
    };

    let lifecycle = SceneLifecycle::new(Rc::clone(&coordinator), Rc::clone(&surface), factory);

    Harness {
        coordinator,
        lifecycle,
        surface,
        journal,
        input,
        timer,
    }
}
