//! Core data models for the crew tracker.

mod athlete;
mod ids;
mod performance;
mod ranking;

pub use athlete::*;
pub use ids::*;
pub use performance::*;
pub use ranking::*;
