//! Input subscription abstraction.
//!
//! The host owns the actual event loop; scenes only ever see this trait.
//! Every registration hands back an [`Unsubscribe`] closure that detaches
//! exactly that handler.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Closure that removes one input registration when called.
pub type Unsubscribe = Box<dyn FnOnce()>;

/// Handler invoked for each key press.
pub type KeyHandler = Box<dyn FnMut(Key)>;

/// Handler invoked for each pointer move or click.
pub type PointerHandler = Box<dyn FnMut(PointerPosition)>;

/// Logical keys the client reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// Confirm.
    Enter,
    /// Cancel / back.
    Escape,
    /// Cursor up.
    Up,
    /// Cursor down.
    Down,
    /// Delete the previous character.
    Backspace,
    /// A printable character.
    Char(char),
}

impl Key {
    /// Parses a key name as used in input scripts (`enter`, `escape`, `up`,
    /// `down`, `backspace`, or a single character).
    #[must_use]
    pub fn parse(name: &str) -> Option<Key> {
        match name.trim().to_ascii_lowercase().as_str() {
            "enter" => Some(Key::Enter),
            "escape" | "esc" => Some(Key::Escape),
            "up" => Some(Key::Up),
            "down" => Some(Key::Down),
            "backspace" => Some(Key::Backspace),
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(Key::Char(c)),
                    _ => None,
                }
            }
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Enter => f.write_str("enter"),
            Key::Escape => f.write_str("escape"),
            Key::Up => f.write_str("up"),
            Key::Down => f.write_str("down"),
            Key::Backspace => f.write_str("backspace"),
            Key::Char(c) => write!(f, "{c}"),
        }
    }
}

/// Pointer location in surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PointerPosition {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate.
    pub y: f32,
}

/// Source of input events supplied by the host.
pub trait InputSource {
    /// Subscribes to key presses.
    fn on_key_press(&self, handler: KeyHandler) -> Unsubscribe;

    /// Subscribes to pointer movement.
    fn on_pointer_move(&self, handler: PointerHandler) -> Unsubscribe;

    /// Subscribes to pointer clicks.
    fn on_pointer_click(&self, handler: PointerHandler) -> Unsubscribe;
}
