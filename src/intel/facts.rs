//! The fact snapshot read by every downstream decision

use serde::{Deserialize, Serialize};

use crate::core::types::GameTime;

/// Default supply cap before any supply structure is observed
pub const DEFAULT_SUPPLY_CAP: f64 = 15.0;

/// Default base count (the starting base)
pub const DEFAULT_BASE_COUNT: u32 = 1;

/// Everything the agent currently believes about the game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactSnapshot {
    // Enemy
    pub enemy_air: bool,
    pub enemy_rush: bool,
    pub enemy_ground: bool,
    pub enemy_tech_level: u32,
    pub enemy_base_count: u32,
    pub last_enemy_sighting: GameTime,

    // Own economy and army
    pub minerals: f64,
    pub gas: f64,
    pub supply_used: f64,
    pub supply_cap: f64,
    pub army_size: u32,
    pub base_count: u32,

    pub game_time: GameTime,
}

impl Default for FactSnapshot {
    fn default() -> Self {
        Self {
            enemy_air: false,
            enemy_rush: false,
            enemy_ground: false,
            enemy_tech_level: 0,
            enemy_base_count: 0,
            last_enemy_sighting: 0.0,

            minerals: 0.0,
            gas: 0.0,
            supply_used: 0.0,
            supply_cap: DEFAULT_SUPPLY_CAP,
            army_size: 0,
            base_count: DEFAULT_BASE_COUNT,

            game_time: 0.0,
        }
    }
}

impl FactSnapshot {
    /// Fraction of supply in use, `None` when there is no supply cap
    pub fn supply_ratio(&self) -> Option<f64> {
        (self.supply_cap > 0.0).then(|| self.supply_used / self.supply_cap)
    }
}
