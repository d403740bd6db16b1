//! Otherworlds — scene lifecycle.
//!
//! Defines the contract every scene implements, binds concrete scene
//! instances to the coordinator's enter events, and provides the scoped
//! input registrar scenes use to release their subscriptions on destroy.

pub mod binder;
pub mod contract;
pub mod error;
pub mod input;

pub use binder::{SceneLifecycle, ScenePhase};
pub use contract::{Scene, SceneFactory};
pub use error::{BindInProgress, LifecycleError, SceneError};
pub use input::ScopedInputRegistrar;
