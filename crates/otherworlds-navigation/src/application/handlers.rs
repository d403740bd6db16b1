//! Enter/exit handler registry with subscription tokens.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use otherworlds_core::scene_id::SceneId;
use uuid::Uuid;

use crate::domain::record::TransitionRecord;

/// Error type handlers may return.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// A transition handler. Receives the record of the transition it fires for.
pub type TransitionHandler = Rc<dyn Fn(&TransitionRecord) -> Result<(), HandlerError>>;

/// Which side of a transition a handler listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerPhase {
    /// Fired for the scene being left, before the commit.
    Exit,
    /// Fired for the scene being entered, after the commit.
    Enter,
}

impl fmt::Display for HandlerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerPhase::Exit => f.write_str("exit"),
            HandlerPhase::Enter => f.write_str("enter"),
        }
    }
}

/// Identifies one registered handler so it can be removed again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionToken {
    id: Uuid,
    scene: SceneId,
    phase: HandlerPhase,
}

impl SubscriptionToken {
    /// The scene the handler is registered for.
    #[must_use]
    pub fn scene(&self) -> SceneId {
        self.scene
    }

    /// The phase the handler is registered for.
    #[must_use]
    pub fn phase(&self) -> HandlerPhase {
        self.phase
    }
}

/// Handlers keyed by phase and scene, each list in registration order.
#[derive(Default)]
pub(crate) struct HandlerRegistry {
    handlers: HashMap<(HandlerPhase, SceneId), Vec<(Uuid, TransitionHandler)>>,
}

impl HandlerRegistry {
    pub(crate) fn register(
        &mut self,
        phase: HandlerPhase,
        scene: SceneId,
        handler: TransitionHandler,
    ) -> SubscriptionToken {
        let id = Uuid::new_v4();
        self.handlers
            .entry((phase, scene))
            .or_default()
            .push((id, handler));
        SubscriptionToken { id, scene, phase }
    }

    /// Removes the handler behind `token`. Returns whether it was present.
    pub(crate) fn remove(&mut self, token: SubscriptionToken) -> bool {
        let Some(list) = self.handlers.get_mut(&(token.phase, token.scene)) else {
            return false;
        };
        let before = list.len();
        list.retain(|(id, _)| *id != token.id);
        list.len() != before
    }

    /// Clones the handler list so it can run without the registry borrowed.
    pub(crate) fn snapshot(&self, phase: HandlerPhase, scene: SceneId) -> Vec<TransitionHandler> {
        self.handlers
            .get(&(phase, scene))
            .map(|list| list.iter().map(|(_, h)| Rc::clone(h)).collect())
            .unwrap_or_default()
    }

    pub(crate) fn count(&self, phase: HandlerPhase, scene: SceneId) -> usize {
        self.handlers.get(&(phase, scene)).map_or(0, Vec::len)
    }
}
