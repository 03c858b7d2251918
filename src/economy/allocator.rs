//! Resource allocator - throttled worker distribution
//!
//! Called every game tick, but does real work at most once per
//! `optimization_interval` of game time. A pass runs four stages in order:
//!
//! 1. Idle workers are sent to the nearest base's minerals
//! 2. Each base is pulled towards its mineral target
//! 3. Workers are moved from crowded bases to starved ones
//! 4. Ready extractors are filled to their ideal harvester count
//!
//! The only state kept between passes is the time of the last pass. Who is
//! gathering what is re-read from the workers' live order targets every time,
//! so dead units, lost bases and dropped commands are absorbed by the next
//! pass without any bookkeeping.

use ahash::AHashSet;

use crate::core::config::EconomyConfig;
use crate::core::error::{Result, WorldError};
use crate::core::types::{GameTime, UnitTag};
use crate::economy::analysis::{
    analyze_base, mineral_fields_at, mineral_workers_at, BaseResourceInfo,
};
use crate::economy::report::{
    EconomyTotals, EfficiencyReport, PassOutcome, PassReport, Stage,
};
use crate::economy::world::{
    closest, Base, CommandSink, EconomyView, Extractor, Worker, WorldResult,
};

/// A stage that could not read the world
struct StageFailure {
    stage: Stage,
    error: WorldError,
}

trait StageContext<T> {
    fn in_stage(self, stage: Stage) -> std::result::Result<T, StageFailure>;
}

impl<T> StageContext<T> for WorldResult<T> {
    fn in_stage(self, stage: Stage) -> std::result::Result<T, StageFailure> {
        self.map_err(|error| StageFailure { stage, error })
    }
}

pub struct ResourceAllocator {
    config: EconomyConfig,
    last_run_time: GameTime,
}

impl ResourceAllocator {
    pub fn new(config: EconomyConfig) -> Self {
        Self {
            config,
            last_run_time: 0.0,
        }
    }

    pub fn config(&self) -> &EconomyConfig {
        &self.config
    }

    /// Game time of the last pass that got past the throttle
    pub fn last_run_time(&self) -> GameTime {
        self.last_run_time
    }

    /// Forget the throttle timestamp (between games)
    pub fn reset(&mut self) {
        self.last_run_time = 0.0;
    }

    fn should_run(&self, now: GameTime) -> bool {
        now - self.last_run_time >= self.config.optimization_interval
    }

    /// Per-tick entry point
    ///
    /// Not reentrant: `&mut self` rules out overlapping passes.
    pub fn on_tick<W>(&mut self, world: &mut W) -> PassOutcome
    where
        W: EconomyView + CommandSink,
    {
        let now = world.game_time();
        if !self.should_run(now) {
            return PassOutcome::Throttled;
        }
        self.last_run_time = now;

        let mut report = PassReport::new(now);
        match self.run_pass(world, &mut report) {
            Ok(()) => {
                tracing::debug!(
                    game_time = now,
                    idle = report.issued.idle_workers,
                    base = report.issued.base_balance,
                    cross_base = report.issued.cross_base_balance,
                    gas = report.issued.gas_saturation,
                    "Resource pass complete"
                );
                if !report.failures.is_empty() {
                    tracing::debug!(
                        game_time = now,
                        rejected = report.failures.len(),
                        first = %report.failures[0].error,
                        "Worker commands rejected this pass"
                    );
                }
                PassOutcome::Completed(report)
            }
            Err(StageFailure { stage, error }) => {
                if world.iteration() % self.config.log_every_iterations.max(1) == 0 {
                    tracing::warn!(
                        game_time = now,
                        %stage,
                        %error,
                        "Resource pass aborted"
                    );
                }
                PassOutcome::Failed {
                    stage,
                    error,
                    partial: report,
                }
            }
        }
    }

    fn run_pass<W>(&self, world: &mut W, report: &mut PassReport) -> std::result::Result<(), StageFailure>
    where
        W: EconomyView + CommandSink,
    {
        self.assign_idle_workers(world, report)
            .in_stage(Stage::IdleWorkers)?;
        self.balance_bases(world, report)
            .in_stage(Stage::BaseBalance)?;
        self.balance_across_bases(world, report)
            .in_stage(Stage::CrossBaseBalance)?;
        self.saturate_gas(world, report)
            .in_stage(Stage::GasSaturation)?;
        Ok(())
    }

    // === STAGE 1: IDLE WORKERS ===

    fn assign_idle_workers<W>(&self, world: &mut W, report: &mut PassReport) -> WorldResult<()>
    where
        W: EconomyView + CommandSink,
    {
        let bases = world.bases()?;
        if bases.is_empty() {
            return Ok(());
        }

        let idle: Vec<Worker> = world
            .workers()?
            .into_iter()
            .filter(|w| w.is_idle)
            .take(self.config.max_idle_assignments_per_pass)
            .collect();

        for worker in idle {
            let Some(base) = closest(world, &bases, worker.position).copied() else {
                continue;
            };

            let minerals = mineral_fields_at(world, &base, &self.config)?;
            let result = match closest(world, &minerals, worker.position) {
                Some(mineral) => world.gather(worker.tag, mineral.tag),
                None => world.move_to(worker.tag, base.position),
            };
            report.record(Stage::IdleWorkers, worker.tag, result);
        }

        Ok(())
    }

    // === STAGE 2: PER-BASE BALANCE ===

    fn balance_bases<W>(&self, world: &mut W, report: &mut PassReport) -> WorldResult<()>
    where
        W: EconomyView + CommandSink,
    {
        let bases = world.bases()?;

        for base in &bases {
            let info = analyze_base(world, base, &self.config)?;
            let target = info.target_mineral_workers;
            let current = info.mineral_workers;

            if current < target {
                self.fill_minerals(world, base, target - current, report)?;
            } else if current > target + self.config.mineral_surplus_tolerance {
                self.shed_mineral_surplus(world, base, &bases, current - target, report)?;
            }
        }

        Ok(())
    }

    /// Send idle workers, then stray non-gatherers, to this base's minerals
    fn fill_minerals<W>(
        &self,
        world: &mut W,
        base: &Base,
        count: u32,
        report: &mut PassReport,
    ) -> WorldResult<()>
    where
        W: EconomyView + CommandSink,
    {
        let workers = world.workers()?;
        let idle = workers.iter().filter(|w| w.is_idle);
        let strays = workers.iter().filter(|w| {
            !w.is_idle
                && !w.is_gathering
                && world.distance(w.position, base.position) > self.config.reassign_distance
        });
        let available: Vec<Worker> = idle.chain(strays).take(count as usize).copied().collect();

        let minerals = mineral_fields_at(world, base, &self.config)?;
        if minerals.is_empty() {
            return Ok(());
        }

        for worker in available {
            if let Some(mineral) = closest(world, &minerals, worker.position).copied() {
                let result = world.gather(worker.tag, mineral.tag);
                report.record(Stage::BaseBalance, worker.tag, result);
            }
        }

        Ok(())
    }

    /// Move surplus mineral workers onto local gas, else to another base
    fn shed_mineral_surplus<W>(
        &self,
        world: &mut W,
        base: &Base,
        bases: &[Base],
        excess: u32,
        report: &mut PassReport,
    ) -> WorldResult<()>
    where
        W: EconomyView + CommandSink,
    {
        let surplus: Vec<Worker> = mineral_workers_at(world, base, &self.config)?
            .into_iter()
            .take(excess as usize)
            .collect();

        for worker in surplus {
            // Re-read every time: the previous worker may have filled it.
            let spare_gas = world
                .extractors_near(base.position, self.config.extractor_search_radius)?
                .into_iter()
                .find(|e| e.is_ready && e.has_spare_capacity());

            if let Some(extractor) = spare_gas {
                let result = world.gather(worker.tag, extractor.tag);
                report.record(Stage::BaseBalance, worker.tag, result);
                continue;
            }

            let Some(other) = bases.iter().find(|b| b.tag != base.tag) else {
                continue;
            };
            let minerals = mineral_fields_at(world, other, &self.config)?;
            if let Some(mineral) = closest(world, &minerals, worker.position).copied() {
                let result = world.gather(worker.tag, mineral.tag);
                report.record(Stage::BaseBalance, worker.tag, result);
            }
        }

        Ok(())
    }

    // === STAGE 3: CROSS-BASE BALANCE ===

    fn balance_across_bases<W>(&self, world: &mut W, report: &mut PassReport) -> WorldResult<()>
    where
        W: EconomyView + CommandSink,
    {
        let bases = world.bases()?;
        if bases.len() < 2 {
            return Ok(());
        }

        let total_workers = world.workers()?.len() as u32;
        let average = total_workers / bases.len() as u32;
        let band = self.config.imbalance_band;

        let mut infos = bases
            .iter()
            .map(|b| analyze_base(world, b, &self.config))
            .collect::<WorldResult<Vec<BaseResourceInfo>>>()?;
        infos.sort_by_key(|info| info.total_workers);

        let (Some(least), Some(most)) = (infos.first(), infos.last()) else {
            return Ok(());
        };
        if most.total_workers - least.total_workers <= self.config.imbalance_spread {
            return Ok(());
        }

        let crowded: Vec<Base> = infos
            .iter()
            .filter(|info| info.total_workers > average + band)
            .map(|info| info.base)
            .collect();
        let starved: Vec<Base> = infos
            .iter()
            .filter(|info| info.total_workers < average.saturating_sub(band))
            .map(|info| info.base)
            .collect();

        for from in &crowded {
            for to in &starved {
                let from_info = analyze_base(world, from, &self.config)?;
                let to_info = analyze_base(world, to, &self.config)?;

                if from_info.total_workers > to_info.total_workers + band {
                    self.transfer_one_worker(world, from, to, report)?;
                }
            }
        }

        Ok(())
    }

    fn transfer_one_worker<W>(
        &self,
        world: &mut W,
        from: &Base,
        to: &Base,
        report: &mut PassReport,
    ) -> WorldResult<()>
    where
        W: EconomyView + CommandSink,
    {
        let Some(worker) = mineral_workers_at(world, from, &self.config)?.into_iter().next() else {
            return Ok(());
        };

        let minerals = mineral_fields_at(world, to, &self.config)?;
        if let Some(mineral) = closest(world, &minerals, worker.position).copied() {
            let result = world.gather(worker.tag, mineral.tag);
            report.record(Stage::CrossBaseBalance, worker.tag, result);
        }

        Ok(())
    }

    // === STAGE 4: GAS SATURATION ===

    fn saturate_gas<W>(&self, world: &mut W, report: &mut PassReport) -> WorldResult<()>
    where
        W: EconomyView + CommandSink,
    {
        let ready: Vec<Extractor> = world
            .extractors()?
            .into_iter()
            .filter(|e| e.is_ready)
            .collect();

        for extractor in &ready {
            let assigned = extractor.assigned_harvesters;
            let ideal = extractor.ideal_harvesters;

            if assigned < ideal {
                self.pull_to_gas(world, extractor, ideal - assigned, report)?;
            } else if assigned > ideal + self.config.gas_surplus_tolerance {
                self.release_from_gas(world, extractor, assigned - ideal, report)?;
            }
        }

        Ok(())
    }

    /// Idle workers first, then mineral gatherers at the extractor's base
    fn pull_to_gas<W>(
        &self,
        world: &mut W,
        extractor: &Extractor,
        count: u32,
        report: &mut PassReport,
    ) -> WorldResult<()>
    where
        W: EconomyView + CommandSink,
    {
        let bases = world.bases()?;
        let Some(home) = closest(world, &bases, extractor.position).copied() else {
            return Ok(());
        };

        let local_minerals: AHashSet<UnitTag> = mineral_fields_at(world, &home, &self.config)?
            .iter()
            .map(|m| m.tag)
            .collect();

        let workers = world.workers()?;
        let idle = workers.iter().filter(|w| w.is_idle);
        let miners = workers
            .iter()
            .filter(|w| !w.is_idle && w.gathers_from(&local_minerals));
        let recruits: Vec<Worker> = idle.chain(miners).take(count as usize).copied().collect();

        for worker in recruits {
            let result = world.gather(worker.tag, extractor.tag);
            report.record(Stage::GasSaturation, worker.tag, result);
        }

        Ok(())
    }

    fn release_from_gas<W>(
        &self,
        world: &mut W,
        extractor: &Extractor,
        count: u32,
        report: &mut PassReport,
    ) -> WorldResult<()>
    where
        W: EconomyView + CommandSink,
    {
        let on_gas: Vec<Worker> = world
            .workers()?
            .into_iter()
            .filter(|w| w.is_gathering && w.order_target == Some(extractor.tag))
            .collect();

        let bases = world.bases()?;
        let Some(home) = closest(world, &bases, extractor.position).copied() else {
            return Ok(());
        };
        let minerals = mineral_fields_at(world, &home, &self.config)?;
        if minerals.is_empty() {
            return Ok(());
        }

        for worker in on_gas.into_iter().take(count as usize) {
            if let Some(mineral) = closest(world, &minerals, worker.position).copied() {
                let result = world.gather(worker.tag, mineral.tag);
                report.record(Stage::GasSaturation, worker.tag, result);
            }
        }

        Ok(())
    }

    // === QUERIES ===

    /// Saturation of the whole economy against the per-base worker target
    ///
    /// Never fails: with no bases, or when the world can't be read, this is
    /// the empty report.
    pub fn efficiency<V: EconomyView + ?Sized>(&self, world: &V) -> EfficiencyReport {
        match self.try_efficiency(world) {
            Ok(report) => report,
            Err(error) => {
                tracing::debug!(%error, "Efficiency unavailable");
                EfficiencyReport::empty()
            }
        }
    }

    fn try_efficiency<V: EconomyView + ?Sized>(&self, world: &V) -> WorldResult<EfficiencyReport> {
        let total_workers = world.workers()?.len();
        let total_bases = world.bases()?.len();

        if total_bases == 0 {
            return Ok(EfficiencyReport::empty());
        }

        let workers_per_base = total_workers as f32 / total_bases as f32;
        let optimal = self.config.workers_per_base as f32;
        let efficiency = if optimal > 0.0 {
            (workers_per_base / optimal).min(1.0)
        } else {
            0.0
        };

        Ok(EfficiencyReport {
            efficiency,
            workers_per_base,
            totals: Some(EconomyTotals {
                total_workers,
                total_bases,
            }),
        })
    }

    /// Per-base snapshot from live state
    pub fn analyze<V: EconomyView + ?Sized>(&self, world: &V, base: &Base) -> Result<BaseResourceInfo> {
        Ok(analyze_base(world, base, &self.config)?)
    }

    /// How many more workers the economy wants before hitting `max_workers`
    pub fn worker_headroom<V: EconomyView + ?Sized>(&self, world: &V) -> Result<usize> {
        let total = world.workers()?.len();
        Ok((self.config.max_workers as usize).saturating_sub(total))
    }
}

impl Default for ResourceAllocator {
    fn default() -> Self {
        Self::new(EconomyConfig::default())
    }
}
