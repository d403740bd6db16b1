//! Shared test mocks and utilities for the Otherworlds scene engine.

mod clock;
mod input;
mod snapshot;
mod timer;

pub use clock::FixedClock;
pub use input::FakeInputSource;
pub use snapshot::FixedSnapshot;
pub use timer::RecordingTimer;
