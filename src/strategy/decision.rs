//! Strategic posture values

use serde::{Deserialize, Serialize};
use std::fmt;

/// Overall stance of the agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Eco,
    Army,
    Defend,
    AllIn,
    Expand,
}

/// Which unit composition to lean towards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TechFocus {
    Ground,
    AntiAir,
    Mixed,
}

/// What spending should favour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Economy,
    Production,
    Defense,
    Offense,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Eco => "eco",
            Mode::Army => "army",
            Mode::Defend => "defend",
            Mode::AllIn => "all_in",
            Mode::Expand => "expand",
        }
    }
}

impl TechFocus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TechFocus::Ground => "ground",
            TechFocus::AntiAir => "anti_air",
            TechFocus::Mixed => "mixed",
        }
    }
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Economy => "economy",
            Priority::Production => "production",
            Priority::Defense => "defense",
            Priority::Offense => "offense",
        }
    }
}

/// A derived posture; recomputed on demand and never stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StrategyDecision {
    pub mode: Mode,
    pub tech_focus: TechFocus,
    pub priority: Priority,
}

impl StrategyDecision {
    pub const fn new(mode: Mode, tech_focus: TechFocus, priority: Priority) -> Self {
        Self {
            mode,
            tech_focus,
            priority,
        }
    }
}

impl fmt::Display for StrategyDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.mode.as_str(),
            self.tech_focus.as_str(),
            self.priority.as_str()
        )
    }
}
