//! Otherworlds — scene navigation.
//!
//! Responsible for deciding which scene is current, sequencing the exit and
//! enter notifications of each transition, keeping the bounded navigation
//! history, and evaluating the guards that may deny or redirect a
//! transition.

pub mod application;
pub mod domain;
pub mod error;

pub use application::coordinator::TransitionCoordinator;
pub use application::handlers::{HandlerError, HandlerPhase, SubscriptionToken};
pub use domain::options::{TransitionOptions, TransitionPayload, TransitionStyle};
pub use domain::record::TransitionRecord;
pub use error::NavigationError;
