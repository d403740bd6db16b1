//! Otherworlds Core — shared abstractions for scene orchestration.
//!
//! This crate defines the identifiers and narrow host-facing interfaces
//! that the navigation and scene crates depend on. It contains no
//! scene or rendering code.

pub mod clock;
pub mod input;
pub mod scene_id;
pub mod snapshot;
