//! Per-call transition options.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Opaque data handed from the caller to the handlers of one transition.
pub type TransitionPayload = serde_json::Map<String, serde_json::Value>;

/// Visual style of a transition. Only `Instant` skips the delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionStyle {
    /// Fade out and back in.
    Fade,
    /// Slide the new scene in.
    Slide,
    /// Switch without any delay.
    #[default]
    Instant,
}

/// Options for a single `transition_to` call.
///
/// Built fresh per call and consumed by it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionOptions {
    /// How long the transition suspends between exit and commit.
    pub delay: Duration,
    /// The visual style.
    pub style: TransitionStyle,
    /// Data made available to exit and enter handlers.
    pub payload: TransitionPayload,
    /// Whether the target is appended to the navigation history.
    pub record_in_history: bool,
}

impl Default for TransitionOptions {
    fn default() -> Self {
        Self::instant()
    }
}

impl TransitionOptions {
    /// An instant, recorded transition with an empty payload.
    #[must_use]
    pub fn instant() -> Self {
        Self {
            delay: Duration::ZERO,
            style: TransitionStyle::Instant,
            payload: TransitionPayload::new(),
            record_in_history: true,
        }
    }

    /// A fade lasting `delay`.
    #[must_use]
    pub fn fade(delay: Duration) -> Self {
        Self {
            delay,
            style: TransitionStyle::Fade,
            ..Self::instant()
        }
    }

    /// A slide lasting `delay`.
    #[must_use]
    pub fn slide(delay: Duration) -> Self {
        Self {
            delay,
            style: TransitionStyle::Slide,
            ..Self::instant()
        }
    }

    /// Attaches `value` under `key` in the payload.
    #[must_use]
    pub fn with_payload(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.payload.insert(key.into(), value);
        self
    }

    /// Keeps the target out of the navigation history.
    #[must_use]
    pub fn without_history(mut self) -> Self {
        self.record_in_history = false;
        self
    }

    /// Whether this transition suspends before committing.
    #[must_use]
    pub fn suspends(&self) -> bool {
        self.style != TransitionStyle::Instant && !self.delay.is_zero()
    }
}
