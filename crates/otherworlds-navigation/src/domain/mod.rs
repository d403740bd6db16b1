//! Navigation domain types: options, records, history, policies and guards.

pub mod guards;
pub mod history;
pub mod options;
pub mod policy;
pub mod record;
