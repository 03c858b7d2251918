//! Per-base resource snapshots
//!
//! Everything here is derived from a fresh world read. Nothing is cached:
//! a [`BaseResourceInfo`] lives for one decision and is then dropped.

use ahash::AHashSet;
use serde::Serialize;

use crate::core::config::EconomyConfig;
use crate::core::types::UnitTag;
use crate::economy::world::{Base, EconomyView, Extractor, MineralField, Worker, WorldResult};

/// What one base currently has and should have
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaseResourceInfo {
    pub base: Base,
    pub mineral_workers: u32,
    pub gas_workers: u32,
    pub total_workers: u32,
    pub target_mineral_workers: u32,
    pub target_gas_workers: u32,
    pub minerals_nearby: usize,
    /// Extractors within range of the base, ready or not
    pub extractors: Vec<Extractor>,
}

impl BaseResourceInfo {
    pub fn ready_extractors(&self) -> impl Iterator<Item = &Extractor> {
        self.extractors.iter().filter(|e| e.is_ready)
    }

    pub fn mineral_shortfall(&self) -> u32 {
        self.target_mineral_workers.saturating_sub(self.mineral_workers)
    }
}

/// Gas target for a base with this many ready extractors
pub fn gas_target(config: &EconomyConfig, ready_extractors: usize) -> u32 {
    (ready_extractors as u32).saturating_mul(config.workers_per_gas)
}

/// Mineral target: what is left of the per-base budget after gas, clamped
pub fn mineral_target(config: &EconomyConfig, gas_target: u32) -> u32 {
    config.clamp_mineral_target(i64::from(config.workers_per_base) - i64::from(gas_target))
}

pub fn mineral_fields_at<V: EconomyView + ?Sized>(
    world: &V,
    base: &Base,
    config: &EconomyConfig,
) -> WorldResult<Vec<MineralField>> {
    world.mineral_fields_near(base.position, config.mineral_search_radius)
}

fn tag_set<I: IntoIterator<Item = UnitTag>>(tags: I) -> AHashSet<UnitTag> {
    tags.into_iter().collect()
}

/// Workers gathering from this base's mineral fields, in world order
pub fn mineral_workers_at<V: EconomyView + ?Sized>(
    world: &V,
    base: &Base,
    config: &EconomyConfig,
) -> WorldResult<Vec<Worker>> {
    let minerals = tag_set(mineral_fields_at(world, base, config)?.iter().map(|m| m.tag));
    if minerals.is_empty() {
        return Ok(Vec::new());
    }

    Ok(world
        .workers()?
        .into_iter()
        .filter(|w| w.gathers_from(&minerals))
        .collect())
}

/// Build the snapshot for one base from live world state
pub fn analyze_base<V: EconomyView + ?Sized>(
    world: &V,
    base: &Base,
    config: &EconomyConfig,
) -> WorldResult<BaseResourceInfo> {
    let minerals = mineral_fields_at(world, base, config)?;
    let extractors = world.extractors_near(base.position, config.extractor_search_radius)?;
    let workers = world.workers()?;

    let mineral_tags = tag_set(minerals.iter().map(|m| m.tag));
    let extractor_tags = tag_set(extractors.iter().map(|e| e.tag));

    let mineral_workers = workers.iter().filter(|w| w.gathers_from(&mineral_tags)).count() as u32;
    let gas_workers = workers.iter().filter(|w| w.gathers_from(&extractor_tags)).count() as u32;

    let ready = extractors.iter().filter(|e| e.is_ready).count();
    let target_gas_workers = gas_target(config, ready);

    Ok(BaseResourceInfo {
        base: *base,
        mineral_workers,
        gas_workers,
        total_workers: mineral_workers + gas_workers,
        target_mineral_workers: mineral_target(config, target_gas_workers),
        target_gas_workers,
        minerals_nearby: minerals.len(),
        extractors,
    })
}
