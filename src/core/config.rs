//! Economy configuration with documented constants
//!
//! Every ratio, radius and threshold used by the resource allocator lives
//! here. The allocator receives a config value at construction; there is no
//! global config.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::error::{HivemindError, Result};

/// Tunables for the resource allocator
///
/// Defaults match a standard three-resource economy: 16 workers per base,
/// three per extractor, 60 total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    // === THROTTLE ===
    /// Minimum game time between two optimization passes (game seconds)
    pub optimization_interval: f64,

    /// Stage failures are logged only on iterations divisible by this
    ///
    /// A broken world bridge fails every pass; at 200 iterations the log
    /// stays readable at normal game speed.
    pub log_every_iterations: u64,

    // === RATIOS ===
    /// Desired workers per base (minerals plus gas)
    pub workers_per_base: u32,

    /// Desired workers per ready extractor
    pub workers_per_gas: u32,

    /// Upper bound on the total worker population
    pub max_workers: u32,

    /// Lower bound of the mineral worker target per base
    pub min_mineral_workers: u32,

    /// Upper bound of the mineral worker target per base
    pub max_mineral_workers: u32,

    /// Mineral workers above target tolerated before reassigning
    pub mineral_surplus_tolerance: u32,

    /// Gas workers above ideal tolerated before pushing back to minerals
    pub gas_surplus_tolerance: u32,

    // === COMMAND VOLUME ===
    /// Idle workers handled per pass; the rest wait for the next pass
    pub max_idle_assignments_per_pass: usize,

    // === DISTANCES ===
    /// Radius around a base in which mineral fields belong to it
    pub mineral_search_radius: f32,

    /// Radius around a base in which extractors belong to it
    pub extractor_search_radius: f32,

    /// Non-gathering workers farther than this from a base may be pulled to it
    pub reassign_distance: f32,

    // === CROSS-BASE BALANCING ===
    /// Busiest minus least-busy base must exceed this to rebalance
    pub imbalance_spread: u32,

    /// Half-width of the band around the average considered balanced
    pub imbalance_band: u32,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            optimization_interval: 2.0,
            log_every_iterations: 200,

            workers_per_base: 16,
            workers_per_gas: 3,
            max_workers: 60,
            min_mineral_workers: 14,
            max_mineral_workers: 16,
            mineral_surplus_tolerance: 2,
            gas_surplus_tolerance: 1,

            max_idle_assignments_per_pass: 10,

            mineral_search_radius: 15.0,
            extractor_search_radius: 10.0,
            reassign_distance: 20.0,

            imbalance_spread: 4,
            imbalance_band: 2,
        }
    }
}

impl EconomyConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Clamp a raw mineral target into the configured band
    ///
    /// An inverted band (not yet validated) resolves to its upper bound.
    pub fn clamp_mineral_target(&self, raw: i64) -> u32 {
        raw.max(i64::from(self.min_mineral_workers))
            .min(i64::from(self.max_mineral_workers)) as u32
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if !(self.optimization_interval > 0.0) {
            return Err(HivemindError::Config(format!(
                "optimization_interval ({}) must be positive",
                self.optimization_interval
            )));
        }

        if self.min_mineral_workers > self.max_mineral_workers {
            return Err(HivemindError::Config(format!(
                "min_mineral_workers ({}) should be <= max_mineral_workers ({})",
                self.min_mineral_workers, self.max_mineral_workers
            )));
        }

        if self.workers_per_base == 0 {
            return Err(HivemindError::Config("workers_per_base must be non-zero".into()));
        }

        if self.log_every_iterations == 0 {
            return Err(HivemindError::Config(
                "log_every_iterations must be non-zero".into(),
            ));
        }

        let radii = [
            self.mineral_search_radius,
            self.extractor_search_radius,
            self.reassign_distance,
        ];
        if radii.iter().any(|r| !(*r > 0.0)) {
            return Err(HivemindError::Config("Search radii must be positive".into()));
        }

        Ok(())
    }
}

/// Load and validate an economy config from a TOML file
///
/// Missing keys fall back to their defaults.
pub fn load_economy_config(path: impl AsRef<Path>) -> Result<EconomyConfig> {
    let contents = fs::read_to_string(path.as_ref())?;
    let config: EconomyConfig = toml::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}
