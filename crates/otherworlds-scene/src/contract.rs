//! The scene contract and scene factory.

use async_trait::async_trait;
use otherworlds_core::scene_id::SceneId;
use otherworlds_navigation::TransitionRecord;

use crate::error::SceneError;

/// Capabilities every scene implements.
///
/// The binder calls `init` exactly once before anything else, then `enter`,
/// then `update` and `render` once per tick each, then `exit` and finally
/// `destroy`. `enter`, `exit` and `destroy` default to no-ops.
///
/// `S` is the host's rendering surface; it is passed through unexamined.
#[async_trait(?Send)]
pub trait Scene<S: ?Sized> {
    /// The scene type this instance implements.
    fn scene_id(&self) -> SceneId;

    /// Allocates resources tied to the surface.
    async fn init(&mut self, surface: &S) -> Result<(), SceneError>;

    /// Called once the instance becomes the active scene. `record` is the
    /// transition that led here, or `None` for the startup bind.
    fn enter(&mut self, _record: Option<&TransitionRecord>) {}

    /// Called right before the instance stops being active.
    fn exit(&mut self) {}

    /// Advances scene-local state.
    fn update(&mut self, delta_ms: f64);

    /// Draws the scene.
    fn render(&mut self, surface: &S);

    /// Releases every resource, including all input subscriptions. No
    /// further calls follow.
    fn destroy(&mut self) {}
}

/// Builds fresh scene instances for the binder.
pub trait SceneFactory<S: ?Sized> {
    /// Creates a new, uninitialised instance of `id`.
    fn create(&self, id: SceneId) -> Box<dyn Scene<S>>;
}

impl<S, F> SceneFactory<S> for F
where
    S: ?Sized,
    F: Fn(SceneId) -> Box<dyn Scene<S>>,
{
    fn create(&self, id: SceneId) -> Box<dyn Scene<S>> {
        self(id)
    }
}
