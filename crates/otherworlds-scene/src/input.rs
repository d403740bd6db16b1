//! Scoped input registration.

use std::fmt;
use std::rc::Rc;

use otherworlds_core::input::{InputSource, Key, PointerPosition, Unsubscribe};
use tracing::debug;

/// Records every subscription a scene makes so all of them can be released
/// in one call.
///
/// One registrar lives exactly as long as the scene instance owning it.
/// [`destroy`](Self::destroy) runs each recorded unsubscribe once and empties
/// the list; dropping the registrar does the same.
pub struct ScopedInputRegistrar {
    source: Rc<dyn InputSource>,
    releases: Vec<Unsubscribe>,
}

impl fmt::Debug for ScopedInputRegistrar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedInputRegistrar")
            .field("active", &self.releases.len())
            .finish_non_exhaustive()
    }
}

impl ScopedInputRegistrar {
    /// Creates a registrar subscribing through `source`.
    #[must_use]
    pub fn new(source: Rc<dyn InputSource>) -> Self {
        Self {
            source,
            releases: Vec::new(),
        }
    }

    /// Subscribes to key presses.
    pub fn on_key_press(&mut self, handler: impl FnMut(Key) + 'static) {
        let release = self.source.on_key_press(Box::new(handler));
        self.releases.push(release);
    }

    /// Subscribes to pointer movement.
    pub fn on_pointer_move(&mut self, handler: impl FnMut(PointerPosition) + 'static) {
        let release = self.source.on_pointer_move(Box::new(handler));
        self.releases.push(release);
    }

    /// Subscribes to pointer clicks.
    pub fn on_pointer_click(&mut self, handler: impl FnMut(PointerPosition) + 'static) {
        let release = self.source.on_pointer_click(Box::new(handler));
        self.releases.push(release);
    }

    /// Number of subscriptions not yet released.
    #[must_use]
    pub fn active_subscriptions(&self) -> usize {
        self.releases.len()
    }

    /// Releases every recorded subscription exactly once.
    pub fn destroy(&mut self) {
        if self.releases.is_empty() {
            return;
        }
        let released = self.releases.len();
        for release in self.releases.drain(..) {
            release();
        }
        debug!(released, "input subscriptions released");
    }
}

impl Drop for ScopedInputRegistrar {
    fn drop(&mut self) {
        self.destroy();
    }
}
