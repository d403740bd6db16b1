//! Test input source — dispatches synthetic input and counts subscriptions.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use otherworlds_core::input::{
    InputSource, Key, KeyHandler, PointerHandler, PointerPosition, Unsubscribe,
};

#[derive(Default)]
struct Registry {
    next_id: u64,
    keys: BTreeMap<u64, KeyHandler>,
    moves: BTreeMap<u64, PointerHandler>,
    clicks: BTreeMap<u64, PointerHandler>,
    released: usize,
}

/// An input source driven by test code.
///
/// Handlers must not unsubscribe from inside a dispatch; the registry is
/// mutably borrowed while handlers run.
#[derive(Clone, Default)]
pub struct FakeInputSource {
    registry: Rc<RefCell<Registry>>,
}

impl std::fmt::Debug for FakeInputSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FakeInputSource")
            .field("active", &self.active_subscriptions())
            .field("released", &self.released_subscriptions())
            .finish()
    }
}

impl FakeInputSource {
    /// Creates a source with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers a key press to every key subscriber.
    pub fn press(&self, key: Key) {
        for handler in self.registry.borrow_mut().keys.values_mut() {
            handler(key);
        }
    }

    /// Delivers a pointer move to every move subscriber.
    pub fn move_pointer(&self, position: PointerPosition) {
        for handler in self.registry.borrow_mut().moves.values_mut() {
            handler(position);
        }
    }

    /// Delivers a click to every click subscriber.
    pub fn click(&self, position: PointerPosition) {
        for handler in self.registry.borrow_mut().clicks.values_mut() {
            handler(position);
        }
    }

    /// Number of handlers currently registered across all event kinds.
    #[must_use]
    pub fn active_subscriptions(&self) -> usize {
        let registry = self.registry.borrow();
        registry.keys.len() + registry.moves.len() + registry.clicks.len()
    }

    /// Number of unsubscribe closures that actually removed a handler.
    #[must_use]
    pub fn released_subscriptions(&self) -> usize {
        self.registry.borrow().released
    }

    fn next_id(&self) -> u64 {
        let mut registry = self.registry.borrow_mut();
        registry.next_id += 1;
        registry.next_id
    }

    fn release(&self, remove: fn(&mut Registry, u64) -> bool, id: u64) -> Unsubscribe {
        let registry = Rc::clone(&self.registry);
        Box::new(move || {
            let mut registry = registry.borrow_mut();
            if remove(&mut registry, id) {
                registry.released += 1;
            }
        })
    }
}

impl InputSource for FakeInputSource {
    fn on_key_press(&self, handler: KeyHandler) -> Unsubscribe {
        let id = self.next_id();
        self.registry.borrow_mut().keys.insert(id, handler);
        self.release(|r, id| r.keys.remove(&id).is_some(), id)
    }

    fn on_pointer_move(&self, handler: PointerHandler) -> Unsubscribe {
        let id = self.next_id();
        self.registry.borrow_mut().moves.insert(id, handler);
        self.release(|r, id| r.moves.remove(&id).is_some(), id)
    }

    fn on_pointer_click(&self, handler: PointerHandler) -> Unsubscribe {
        let id = self.next_id();
        self.registry.borrow_mut().clicks.insert(id, handler);
        self.release(|r, id| r.clicks.remove(&id).is_some(), id)
    }
}
