//! What an allocation pass did, and how efficient the economy looks

use serde::Serialize;
use std::fmt;

use crate::core::error::{CommandError, WorldError};
use crate::core::types::{GameTime, UnitTag};

/// The four stages of an allocation pass, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    IdleWorkers,
    BaseBalance,
    CrossBaseBalance,
    GasSaturation,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::IdleWorkers => "idle_workers",
            Stage::BaseBalance => "base_balance",
            Stage::CrossBaseBalance => "cross_base_balance",
            Stage::GasSaturation => "gas_saturation",
        };
        f.write_str(name)
    }
}

/// A single worker command refused by the world
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignmentFailure {
    pub stage: Stage,
    pub worker: UnitTag,
    #[serde(serialize_with = "serialize_display")]
    pub error: CommandError,
}

fn serialize_display<S: serde::Serializer, T: fmt::Display>(
    value: &T,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// Accepted commands per stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StageCounts {
    pub idle_workers: usize,
    pub base_balance: usize,
    pub cross_base_balance: usize,
    pub gas_saturation: usize,
}

impl StageCounts {
    pub fn get(&self, stage: Stage) -> usize {
        match stage {
            Stage::IdleWorkers => self.idle_workers,
            Stage::BaseBalance => self.base_balance,
            Stage::CrossBaseBalance => self.cross_base_balance,
            Stage::GasSaturation => self.gas_saturation,
        }
    }

    fn bump(&mut self, stage: Stage) {
        match stage {
            Stage::IdleWorkers => self.idle_workers += 1,
            Stage::BaseBalance => self.base_balance += 1,
            Stage::CrossBaseBalance => self.cross_base_balance += 1,
            Stage::GasSaturation => self.gas_saturation += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.idle_workers + self.base_balance + self.cross_base_balance + self.gas_saturation
    }
}

/// Outcome of every command attempted during one pass
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PassReport {
    pub game_time: GameTime,
    pub issued: StageCounts,
    pub failures: Vec<AssignmentFailure>,
}

impl PassReport {
    pub fn new(game_time: GameTime) -> Self {
        Self {
            game_time,
            ..Self::default()
        }
    }

    /// Record one command result; returns whether it was accepted
    pub fn record(
        &mut self,
        stage: Stage,
        worker: UnitTag,
        result: Result<(), CommandError>,
    ) -> bool {
        match result {
            Ok(()) => {
                self.issued.bump(stage);
                true
            }
            Err(error) => {
                self.failures.push(AssignmentFailure {
                    stage,
                    worker,
                    error,
                });
                false
            }
        }
    }

    /// Commands attempted, accepted or not
    pub fn attempted(&self, stage: Stage) -> usize {
        self.issued.get(stage) + self.failures.iter().filter(|f| f.stage == stage).count()
    }

    pub fn commands_issued(&self) -> usize {
        self.issued.total()
    }
}

/// Result of one call to the allocator's tick entry point
#[derive(Debug, Clone, PartialEq)]
pub enum PassOutcome {
    /// Inside the optimization interval; nothing was read or issued
    Throttled,
    /// All four stages ran
    Completed(PassReport),
    /// A stage could not read the world; later stages were skipped
    Failed {
        stage: Stage,
        error: WorldError,
        partial: PassReport,
    },
}

impl PassOutcome {
    pub fn is_throttled(&self) -> bool {
        matches!(self, PassOutcome::Throttled)
    }

    pub fn report(&self) -> Option<&PassReport> {
        match self {
            PassOutcome::Throttled => None,
            PassOutcome::Completed(report) => Some(report),
            PassOutcome::Failed { partial, .. } => Some(partial),
        }
    }
}

/// Absolute worker and base counts behind an efficiency figure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EconomyTotals {
    pub total_workers: usize,
    pub total_bases: usize,
}

/// How close the economy is to full saturation
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EfficiencyReport {
    /// Saturation in [0, 1]
    pub efficiency: f32,
    pub workers_per_base: f32,
    #[serde(flatten)]
    pub totals: Option<EconomyTotals>,
}

impl EfficiencyReport {
    /// Report for an economy with no bases (or an unreadable world)
    pub fn empty() -> Self {
        Self {
            efficiency: 0.0,
            workers_per_base: 0.0,
            totals: None,
        }
    }
}
