//! In-memory world for tests, the headless runner and benchmarks
//!
//! Commands take effect immediately, so the next query already reflects
//! them. Failure injection covers the two error paths the allocator must
//! survive: refused commands for specific units, and a world bridge that
//! can't be read at all.

use ahash::AHashSet;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::core::error::{CommandError, WorldError};
use crate::core::types::{GameTime, UnitTag, Vec2};
use crate::economy::world::{
    Base, CommandSink, EconomyView, Extractor, MineralField, Worker, WorldResult,
};

/// Harvesters an extractor wants when fully saturated
pub const IDEAL_GAS_HARVESTERS: u32 = 3;

/// A command as received by the sandbox, accepted or not
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum IssuedCommand {
    Gather { worker: UnitTag, target: UnitTag },
    Move { worker: UnitTag, position: Vec2 },
}

impl IssuedCommand {
    pub fn worker(&self) -> UnitTag {
        match self {
            IssuedCommand::Gather { worker, .. } | IssuedCommand::Move { worker, .. } => *worker,
        }
    }
}

#[derive(Debug, Clone)]
struct SandboxExtractor {
    tag: UnitTag,
    position: Vec2,
    is_ready: bool,
    ideal_harvesters: u32,
}

/// Layout parameters for [`SandboxWorld::generate`]
#[derive(Debug, Clone)]
pub struct SandboxLayout {
    pub bases: usize,
    pub workers: usize,
    pub minerals_per_base: usize,
    pub extractors_per_base: usize,
    /// Distance between neighbouring bases
    pub base_spacing: f32,
}

impl Default for SandboxLayout {
    fn default() -> Self {
        Self {
            bases: 2,
            workers: 24,
            minerals_per_base: 8,
            extractors_per_base: 1,
            base_spacing: 60.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SandboxWorld {
    time: GameTime,
    iteration: u64,
    next_tag: u64,
    bases: Vec<Base>,
    minerals: Vec<MineralField>,
    extractors: Vec<SandboxExtractor>,
    workers: Vec<Worker>,
    rejected: AHashSet<UnitTag>,
    queries_failing: bool,
    commands: Vec<IssuedCommand>,
}

impl SandboxWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bases in a row, minerals in an arc on one side, extractors on the
    /// other, all workers idle and scattered around the first base
    pub fn generate(layout: &SandboxLayout, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut world = Self::new();

        for b in 0..layout.bases {
            let center = Vec2::new(b as f32 * layout.base_spacing, 0.0);
            world.add_base(center);

            for m in 0..layout.minerals_per_base {
                let spread = layout.minerals_per_base.max(1) as f32;
                let angle = -0.8 + 1.6 * (m as f32 + 0.5) / spread;
                let radius = rng.gen_range(6.5..8.0);
                world.add_mineral(center + Vec2::new(angle.cos(), angle.sin()) * radius);
            }

            for e in 0..layout.extractors_per_base {
                let angle = std::f32::consts::PI + (e as f32 - 0.5) * 0.9;
                world.add_extractor(center + Vec2::new(angle.cos(), angle.sin()) * 7.0, true);
            }
        }

        for _ in 0..layout.workers {
            let offset = Vec2::new(rng.gen_range(-4.0..4.0), rng.gen_range(-4.0..4.0));
            world.add_worker(offset);
        }

        world
    }

    fn mint_tag(&mut self) -> UnitTag {
        self.next_tag += 1;
        UnitTag(self.next_tag)
    }

    // === SETUP ===

    pub fn add_base(&mut self, position: Vec2) -> UnitTag {
        let tag = self.mint_tag();
        self.bases.push(Base { tag, position });
        tag
    }

    pub fn add_mineral(&mut self, position: Vec2) -> UnitTag {
        let tag = self.mint_tag();
        self.minerals.push(MineralField { tag, position });
        tag
    }

    pub fn add_extractor(&mut self, position: Vec2, is_ready: bool) -> UnitTag {
        let tag = self.mint_tag();
        self.extractors.push(SandboxExtractor {
            tag,
            position,
            is_ready,
            ideal_harvesters: IDEAL_GAS_HARVESTERS,
        });
        tag
    }

    /// An idle worker
    pub fn add_worker(&mut self, position: Vec2) -> UnitTag {
        let tag = self.mint_tag();
        self.workers.push(Worker {
            tag,
            position,
            is_idle: true,
            is_gathering: false,
            order_target: None,
        });
        tag
    }

    pub fn add_gathering_worker(&mut self, position: Vec2, target: UnitTag) -> UnitTag {
        let tag = self.add_worker(position);
        if let Some(worker) = self.worker_mut(tag) {
            worker.is_idle = false;
            worker.is_gathering = true;
            worker.order_target = Some(target);
        }
        tag
    }

    /// Put a worker on a non-gathering order (walking somewhere)
    pub fn set_moving(&mut self, tag: UnitTag) {
        if let Some(worker) = self.worker_mut(tag) {
            worker.is_idle = false;
            worker.is_gathering = false;
            worker.order_target = None;
        }
    }

    pub fn set_extractor_ready(&mut self, tag: UnitTag, ready: bool) {
        if let Some(e) = self.extractors.iter_mut().find(|e| e.tag == tag) {
            e.is_ready = ready;
        }
    }

    /// Remove any unit or structure, as if it died
    ///
    /// Workers gathering from it drop their order and go idle.
    pub fn remove_unit(&mut self, tag: UnitTag) {
        self.bases.retain(|b| b.tag != tag);
        self.minerals.retain(|m| m.tag != tag);
        self.extractors.retain(|e| e.tag != tag);
        self.workers.retain(|w| w.tag != tag);

        for worker in self.workers.iter_mut().filter(|w| w.order_target == Some(tag)) {
            worker.is_idle = true;
            worker.is_gathering = false;
            worker.order_target = None;
        }
    }

    // === CLOCK ===

    pub fn set_time(&mut self, time: GameTime) {
        self.time = time;
    }

    /// Step the clock by `dt` and count one game loop iteration
    pub fn advance(&mut self, dt: GameTime) {
        self.time += dt;
        self.iteration += 1;
    }

    // === FAILURE INJECTION ===

    pub fn reject_commands_for(&mut self, tag: UnitTag) {
        self.rejected.insert(tag);
    }

    pub fn set_queries_failing(&mut self, failing: bool) {
        self.queries_failing = failing;
    }

    // === INSPECTION ===

    pub fn commands(&self) -> &[IssuedCommand] {
        &self.commands
    }

    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    pub fn base(&self, tag: UnitTag) -> Option<Base> {
        self.bases.iter().find(|b| b.tag == tag).copied()
    }

    pub fn worker(&self, tag: UnitTag) -> Option<&Worker> {
        self.workers.iter().find(|w| w.tag == tag)
    }

    fn worker_mut(&mut self, tag: UnitTag) -> Option<&mut Worker> {
        self.workers.iter_mut().find(|w| w.tag == tag)
    }

    pub fn mineral_tags(&self) -> Vec<UnitTag> {
        self.minerals.iter().map(|m| m.tag).collect()
    }

    /// Workers currently gathering from `target`
    pub fn gatherers_of(&self, target: UnitTag) -> u32 {
        self.workers
            .iter()
            .filter(|w| w.is_gathering && w.order_target == Some(target))
            .count() as u32
    }

    fn check_readable(&self) -> WorldResult<()> {
        if self.queries_failing {
            Err(WorldError::Unavailable("sandbox queries disabled".into()))
        } else {
            Ok(())
        }
    }

    fn snapshot(&self, e: &SandboxExtractor) -> Extractor {
        Extractor {
            tag: e.tag,
            position: e.position,
            is_ready: e.is_ready,
            assigned_harvesters: self.gatherers_of(e.tag),
            ideal_harvesters: e.ideal_harvesters,
        }
    }

    fn check_commandable(&self, worker: UnitTag) -> Result<(), CommandError> {
        if self.worker(worker).is_none() {
            return Err(CommandError::StaleUnit(worker));
        }
        if self.rejected.contains(&worker) {
            return Err(CommandError::Rejected {
                worker,
                reason: "unit refuses orders".into(),
            });
        }
        Ok(())
    }
}

impl EconomyView for SandboxWorld {
    fn game_time(&self) -> GameTime {
        self.time
    }

    fn iteration(&self) -> u64 {
        self.iteration
    }

    fn bases(&self) -> WorldResult<Vec<Base>> {
        self.check_readable()?;
        Ok(self.bases.clone())
    }

    fn mineral_fields_near(&self, point: Vec2, radius: f32) -> WorldResult<Vec<MineralField>> {
        self.check_readable()?;
        Ok(self
            .minerals
            .iter()
            .filter(|m| m.position.distance(&point) < radius)
            .copied()
            .collect())
    }

    fn extractors_near(&self, point: Vec2, radius: f32) -> WorldResult<Vec<Extractor>> {
        self.check_readable()?;
        Ok(self
            .extractors
            .iter()
            .filter(|e| e.position.distance(&point) < radius)
            .map(|e| self.snapshot(e))
            .collect())
    }

    fn extractors(&self) -> WorldResult<Vec<Extractor>> {
        self.check_readable()?;
        Ok(self.extractors.iter().map(|e| self.snapshot(e)).collect())
    }

    fn workers(&self) -> WorldResult<Vec<Worker>> {
        self.check_readable()?;
        Ok(self.workers.clone())
    }
}

impl CommandSink for SandboxWorld {
    fn gather(&mut self, worker: UnitTag, target: UnitTag) -> Result<(), CommandError> {
        self.commands.push(IssuedCommand::Gather { worker, target });
        self.check_commandable(worker)?;

        let valid_target = self.minerals.iter().any(|m| m.tag == target)
            || self.extractors.iter().any(|e| e.tag == target && e.is_ready);
        if !valid_target {
            return Err(CommandError::Rejected {
                worker,
                reason: format!("cannot gather from {target}"),
            });
        }

        if let Some(w) = self.worker_mut(worker) {
            w.is_idle = false;
            w.is_gathering = true;
            w.order_target = Some(target);
        }
        Ok(())
    }

    fn move_to(&mut self, worker: UnitTag, position: Vec2) -> Result<(), CommandError> {
        self.commands.push(IssuedCommand::Move { worker, position });
        self.check_commandable(worker)?;

        if let Some(w) = self.worker_mut(worker) {
            w.is_idle = false;
            w.is_gathering = false;
            w.order_target = None;
            w.position = position;
        }
        Ok(())
    }
}
