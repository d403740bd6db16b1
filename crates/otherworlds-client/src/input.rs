//! Scripted input source.
//!
//! Replays a fixed sequence of key presses, one per tick, and accepts
//! direct events from the host. Handlers may unsubscribe themselves (or
//! others) while an event is being dispatched.

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::rc::Rc;

use otherworlds_core::input::{
    InputSource, Key, KeyHandler, PointerHandler, PointerPosition, Unsubscribe,
};
use tracing::debug;

type Shared<H> = Rc<RefCell<H>>;

#[derive(Default)]
struct Handlers {
    next_id: u64,
    keys: BTreeMap<u64, Shared<KeyHandler>>,
    moves: BTreeMap<u64, Shared<PointerHandler>>,
    clicks: BTreeMap<u64, Shared<PointerHandler>>,
}

impl Handlers {
    fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Input source fed from a key script.
#[derive(Clone, Default)]
pub struct ScriptedInput {
    handlers: Rc<RefCell<Handlers>>,
    script: Rc<RefCell<VecDeque<Key>>>,
}

impl fmt::Debug for ScriptedInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptedInput")
            .field("remaining", &self.remaining())
            .field("subscriptions", &self.active_subscriptions())
            .finish()
    }
}

impl ScriptedInput {
    /// Creates a source that will replay `script`.
    #[must_use]
    pub fn new(script: impl IntoIterator<Item = Key>) -> Self {
        Self {
            handlers: Rc::default(),
            script: Rc::new(RefCell::new(script.into_iter().collect())),
        }
    }

    /// Delivers the next scripted key, if any. Returns the key delivered.
    pub fn step(&self) -> Option<Key> {
        let key = self.script.borrow_mut().pop_front()?;
        debug!(%key, "scripted key");
        self.press(key);
        Some(key)
    }

    /// Number of scripted keys not yet delivered.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.script.borrow().len()
    }

    /// Whether the script has been fully replayed.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.script.borrow().is_empty()
    }

    /// Delivers a key press to every key subscriber.
    pub fn press(&self, key: Key) {
        let targets: Vec<(u64, Shared<KeyHandler>)> = self
            .handlers
            .borrow()
            .keys
            .iter()
            .map(|(id, handler)| (*id, Rc::clone(handler)))
            .collect();
        for (id, handler) in targets {
            if self.handlers.borrow().keys.contains_key(&id) {
                (*handler.borrow_mut())(key);
            }
        }
    }

    /// Delivers a pointer move to every move subscriber.
    pub fn move_pointer(&self, position: PointerPosition) {
        self.dispatch_pointer(|handlers| &handlers.moves, position);
    }

    /// Delivers a click to every click subscriber.
    pub fn click(&self, position: PointerPosition) {
        self.dispatch_pointer(|handlers| &handlers.clicks, position);
    }

    /// Number of handlers currently registered across all event kinds.
    #[must_use]
    pub fn active_subscriptions(&self) -> usize {
        let handlers = self.handlers.borrow();
        handlers.keys.len() + handlers.moves.len() + handlers.clicks.len()
    }

    fn dispatch_pointer(
        &self,
        table: fn(&Handlers) -> &BTreeMap<u64, Shared<PointerHandler>>,
        position: PointerPosition,
    ) {
        let targets: Vec<(u64, Shared<PointerHandler>)> = table(&self.handlers.borrow())
            .iter()
            .map(|(id, handler)| (*id, Rc::clone(handler)))
            .collect();
        for (id, handler) in targets {
            if table(&self.handlers.borrow()).contains_key(&id) {
                (*handler.borrow_mut())(position);
            }
        }
    }

    fn release(&self, remove: fn(&mut Handlers, u64) -> bool, id: u64) -> Unsubscribe {
        let handlers = Rc::clone(&self.handlers);
        Box::new(move || {
            if remove(&mut handlers.borrow_mut(), id) {
                debug!(id, "input handler released");
            }
        })
    }
}

impl InputSource for ScriptedInput {
    fn on_key_press(&self, handler: KeyHandler) -> Unsubscribe {
        let id = {
            let mut handlers = self.handlers.borrow_mut();
            let id = handlers.allocate();
            handlers.keys.insert(id, Rc::new(RefCell::new(handler)));
            id
        };
        self.release(|h, id| h.keys.remove(&id).is_some(), id)
    }

    fn on_pointer_move(&self, handler: PointerHandler) -> Unsubscribe {
        let id = {
            let mut handlers = self.handlers.borrow_mut();
            let id = handlers.allocate();
            handlers.moves.insert(id, Rc::new(RefCell::new(handler)));
            id
        };
        self.release(|h, id| h.moves.remove(&id).is_some(), id)
    }

    fn on_pointer_click(&self, handler: PointerHandler) -> Unsubscribe {
        let id = {
            let mut handlers = self.handlers.borrow_mut();
            let id = handlers.allocate();
            handlers.clicks.insert(id, Rc::new(RefCell::new(handler)));
            id
        };
        self.release(|h, id| h.clicks.remove(&id).is_some(), id)
    }
}
