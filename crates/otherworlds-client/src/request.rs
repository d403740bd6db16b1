//! Navigation requests posted by scenes and applied by the host.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use otherworlds_core::scene_id::SceneId;

/// What a scene asks the host to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationRequest {
    /// Move to a scene, subject to the guards.
    Goto(SceneId),
    /// Return to the previous history entry.
    Back,
    /// Clear the history and return to the initial scene.
    Restart,
}

/// Shared FIFO of pending requests.
#[derive(Debug, Clone, Default)]
pub struct RequestQueue {
    pending: Rc<RefCell<VecDeque<NavigationRequest>>>,
}

impl RequestQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a request.
    pub fn post(&self, request: NavigationRequest) {
        self.pending.borrow_mut().push_back(request);
    }

    /// Removes and returns every pending request, oldest first.
    #[must_use]
    pub fn drain(&self) -> Vec<NavigationRequest> {
        self.pending.borrow_mut().drain(..).collect()
    }

    /// Whether nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.borrow().is_empty()
    }
}
