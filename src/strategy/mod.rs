//! Strategy classifier: a pure, ordered decision tree over the fact snapshot.

pub mod decision;
pub mod rules;

pub use decision::{Mode, Priority, StrategyDecision, TechFocus};
pub use rules::{classify, decide, Classification, StrategyManager, StrategyRule};
