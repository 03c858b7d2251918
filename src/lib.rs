//! Hivemind - decision and worker-allocation core for an RTS agent
//!
//! Observe, decide, act, re-observe: the intel blackboard holds the current
//! facts, the strategy classifier turns them into a posture, and the resource
//! allocator keeps workers spread across minerals and gas.

pub mod core;
pub mod economy;
pub mod intel;
pub mod strategy;
