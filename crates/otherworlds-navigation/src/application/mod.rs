//! The transition coordinator and its handler registry.

pub mod coordinator;
pub mod handlers;
