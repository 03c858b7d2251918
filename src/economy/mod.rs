//! Resource allocator and the world interface it runs against
//!
//! Architecture: Trait + Snapshot
//! - `EconomyView` / `CommandSink` are the only way to touch the game
//! - `BaseResourceInfo` is rebuilt from live state for every decision
//! - `ResourceAllocator` carries nothing between passes but its throttle time

pub mod allocator;
pub mod analysis;
pub mod report;
pub mod sandbox;
pub mod world;

pub use allocator::ResourceAllocator;
pub use analysis::{analyze_base, BaseResourceInfo};
pub use report::{
    AssignmentFailure, EconomyTotals, EfficiencyReport, PassOutcome, PassReport, Stage,
    StageCounts,
};
pub use sandbox::{IssuedCommand, SandboxLayout, SandboxWorld};
pub use world::{Base, CommandSink, EconomyView, Extractor, MineralField, Worker, WorldResult};
