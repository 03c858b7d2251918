//! Narrow interface to the externally owned game world
//!
//! The allocator only ever sees value snapshots returned by these queries and
//! talks back through [`CommandSink`]. It keeps no handles to world objects
//! between calls.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::core::error::{CommandError, WorldError};
use crate::core::types::{GameTime, UnitTag, Vec2};

pub type WorldResult<T> = std::result::Result<T, WorldError>;

/// A resource center
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Base {
    pub tag: UnitTag,
    pub position: Vec2,
}

/// A mineral patch
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MineralField {
    pub tag: UnitTag,
    pub position: Vec2,
}

/// A gas structure with its live harvester counts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extractor {
    pub tag: UnitTag,
    pub position: Vec2,
    pub is_ready: bool,
    pub assigned_harvesters: u32,
    pub ideal_harvesters: u32,
}

impl Extractor {
    pub fn has_spare_capacity(&self) -> bool {
        self.assigned_harvesters < self.ideal_harvesters
    }
}

/// A harvesting unit as last reported by the world
///
/// `order_target` is the only record of what a worker is gathering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Worker {
    pub tag: UnitTag,
    pub position: Vec2,
    pub is_idle: bool,
    pub is_gathering: bool,
    pub order_target: Option<UnitTag>,
}

impl Worker {
    /// Gathering from one of the given resource tags
    pub fn gathers_from(&self, targets: &ahash::AHashSet<UnitTag>) -> bool {
        self.is_gathering && self.order_target.is_some_and(|t| targets.contains(&t))
    }
}

/// Anything with a map position
pub trait Positioned {
    fn position(&self) -> Vec2;
}

impl Positioned for Base {
    fn position(&self) -> Vec2 {
        self.position
    }
}

impl Positioned for MineralField {
    fn position(&self) -> Vec2 {
        self.position
    }
}

impl Positioned for Extractor {
    fn position(&self) -> Vec2 {
        self.position
    }
}

impl Positioned for Worker {
    fn position(&self) -> Vec2 {
        self.position
    }
}

/// Read-only world queries
///
/// Radius queries return objects strictly closer than `radius` to `point`, in
/// the world's own enumeration order.
pub trait EconomyView {
    /// Elapsed game time
    fn game_time(&self) -> GameTime;

    /// Game loop iteration counter
    fn iteration(&self) -> u64;

    /// All of our resource centers
    fn bases(&self) -> WorldResult<Vec<Base>>;

    fn mineral_fields_near(&self, point: Vec2, radius: f32) -> WorldResult<Vec<MineralField>>;

    /// Our gas structures near a point, ready or not
    fn extractors_near(&self, point: Vec2, radius: f32) -> WorldResult<Vec<Extractor>>;

    /// All of our gas structures, ready or not
    fn extractors(&self) -> WorldResult<Vec<Extractor>>;

    /// All of our harvesting-capable units
    fn workers(&self) -> WorldResult<Vec<Worker>>;

    fn distance(&self, a: Vec2, b: Vec2) -> f32 {
        a.distance(&b)
    }
}

/// Fire-and-forget unit commands
///
/// `Err` means the command was refused on the spot (dead unit, invalid
/// target). Success only means the order was queued; outcomes show up in
/// later world reads.
pub trait CommandSink {
    fn gather(&mut self, worker: UnitTag, target: UnitTag) -> Result<(), CommandError>;

    fn move_to(&mut self, worker: UnitTag, position: Vec2) -> Result<(), CommandError>;
}

/// The item closest to `point`; ties keep the first in order
pub fn closest<'a, V, T>(world: &V, items: &'a [T], point: Vec2) -> Option<&'a T>
where
    V: EconomyView + ?Sized,
    T: Positioned,
{
    items
        .iter()
        .min_by_key(|item| OrderedFloat(world.distance(item.position(), point)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::economy::sandbox::SandboxWorld;

    #[test]
    fn test_closest_picks_nearest_and_first_on_tie() {
        let world = SandboxWorld::new();
        let fields = vec![
            MineralField { tag: UnitTag(1), position: Vec2::new(10.0, 0.0) },
            MineralField { tag: UnitTag(2), position: Vec2::new(-2.0, 0.0) },
            MineralField { tag: UnitTag(3), position: Vec2::new(2.0, 0.0) },
        ];
        let nearest = closest(&world, &fields, Vec2::new(0.0, 0.0)).unwrap();
        assert_eq!(nearest.tag, UnitTag(2));
    }

    #[test]
    fn test_closest_of_nothing() {
        let world = SandboxWorld::new();
        let fields: Vec<MineralField> = Vec::new();
        assert!(closest(&world, &fields, Vec2::default()).is_none());
    }

    #[test]
    fn test_gathers_from_requires_gathering_flag() {
        let mut targets = ahash::AHashSet::new();
        targets.insert(UnitTag(7));
        let mut worker = Worker {
            tag: UnitTag(1),
            position: Vec2::default(),
            is_idle: false,
            is_gathering: true,
            order_target: Some(UnitTag(7)),
        };
        assert!(worker.gathers_from(&targets));
        worker.is_gathering = false;
        assert!(!worker.gathers_from(&targets));
    }
}
