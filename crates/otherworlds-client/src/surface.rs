//! Line-based rendering surface.

use std::cell::{Cell, RefCell};

/// Collects the lines a scene draws during one frame.
#[derive(Debug, Default)]
pub struct TextSurface {
    lines: RefCell<Vec<String>>,
    frames: Cell<u64>,
}

impl TextSurface {
    /// Creates an empty surface.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Discards the previous frame's lines.
    pub fn begin_frame(&self) {
        self.lines.borrow_mut().clear();
        self.frames.set(self.frames.get() + 1);
    }

    /// Appends one line to the current frame.
    pub fn draw(&self, line: impl Into<String>) {
        self.lines.borrow_mut().push(line.into());
    }

    /// The lines drawn since the last `begin_frame`.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    /// Whether any line of the current frame contains `needle`.
    #[must_use]
    pub fn shows(&self, needle: &str) -> bool {
        self.lines.borrow().iter().any(|line| line.contains(needle))
    }

    /// Number of frames begun so far.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames.get()
    }
}
