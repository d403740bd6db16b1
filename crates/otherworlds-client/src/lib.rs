//! Otherworlds — text-mode client.
//!
//! Wires the scene engine to a line-based surface, a scripted input source
//! and a small party model, and runs the fixed-rate tick loop.

pub mod config;
pub mod error;
pub mod host;
pub mod input;
pub mod party;
pub mod request;
pub mod scenes;
pub mod surface;

pub use config::ClientConfig;
pub use error::AppError;
pub use host::Host;
