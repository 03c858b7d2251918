//! Intel blackboard - the single shared view of world facts
//!
//! Every tick the game bridge writes a fresh observation; the strategy layer
//! and anything else reads the resulting snapshot. Updates overwrite every
//! field, they never merge with the previous tick.

use crate::core::error::Result;
use crate::intel::facts::{FactSnapshot, DEFAULT_BASE_COUNT, DEFAULT_SUPPLY_CAP};
use crate::intel::observation::Observation;

/// Observation keys read by [`IntelBlackboard::update`]
pub const TRACKED_KEYS: [&str; 13] = [
    "minerals",
    "gas",
    "food_used",
    "food_cap",
    "army_size",
    "base_count",
    "game_time",
    "enemy_air",
    "enemy_rush",
    "enemy_ground",
    "enemy_tech_level",
    "enemy_base_count",
    "last_enemy_sighting",
];

#[derive(Debug, Clone, Default)]
pub struct IntelBlackboard {
    facts: FactSnapshot,
}

impl IntelBlackboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn facts(&self) -> &FactSnapshot {
        &self.facts
    }

    /// Overwrite all facts from an observation
    ///
    /// Absent or malformed values take their documented default. Unknown keys
    /// are ignored. Never fails.
    pub fn update(&mut self, obs: &Observation) {
        self.facts = FactSnapshot {
            minerals: obs.number("minerals").unwrap_or(0.0),
            gas: obs.number("gas").unwrap_or(0.0),
            supply_used: obs.number("food_used").unwrap_or(0.0),
            supply_cap: obs.number("food_cap").unwrap_or(DEFAULT_SUPPLY_CAP),
            army_size: obs.count("army_size").unwrap_or(0),
            base_count: obs.count("base_count").unwrap_or(DEFAULT_BASE_COUNT),
            game_time: obs.number("game_time").unwrap_or(0.0),

            enemy_air: obs.flag("enemy_air").unwrap_or(false),
            enemy_rush: obs.flag("enemy_rush").unwrap_or(false),
            enemy_ground: obs.flag("enemy_ground").unwrap_or(false),
            enemy_tech_level: obs.count("enemy_tech_level").unwrap_or(0),
            enemy_base_count: obs.count("enemy_base_count").unwrap_or(0),
            last_enemy_sighting: obs.number("last_enemy_sighting").unwrap_or(0.0),
        };

        let absent = TRACKED_KEYS.iter().filter(|k| !obs.contains(k)).count();
        tracing::trace!(
            game_time = self.facts.game_time,
            absent,
            "Blackboard updated from observation"
        );
    }

    /// Parse a JSON object and update from it
    ///
    /// On a parse error the current facts are left untouched.
    pub fn update_from_json(&mut self, json: &str) -> Result<()> {
        let obs: Observation = serde_json::from_str(json)?;
        self.update(&obs);
        Ok(())
    }

    /// Restore every fact to its default (between games)
    pub fn reset(&mut self) {
        self.facts = FactSnapshot::default();
    }
}
