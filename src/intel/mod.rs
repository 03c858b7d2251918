//! Fact blackboard: ingests per-tick observations and exposes the current
//! fact snapshot to every reader.

pub mod blackboard;
pub mod facts;
pub mod observation;

pub use blackboard::{IntelBlackboard, TRACKED_KEYS};
pub use facts::FactSnapshot;
pub use observation::Observation;
