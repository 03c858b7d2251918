//! Priority-ordered strategy rules
//!
//! Rules are evaluated top to bottom and the first match wins. The order is
//! part of the behaviour: the default shares its output with the economy
//! recovery rule, so callers that care about the path use [`classify`].

use serde::Serialize;

use crate::intel::{FactSnapshot, IntelBlackboard};
use crate::strategy::decision::{Mode, Priority, StrategyDecision, TechFocus};

/// Army size below which enemy air forces an anti-air response
pub const ANTI_AIR_ARMY_THRESHOLD: u32 = 20;
/// Minerals below which a single-base economy is starved
pub const LOW_MINERALS: f64 = 100.0;
/// Minerals at which spending on expansion or army is possible
pub const BANKED_MINERALS: f64 = 300.0;
/// Expansion only while owning fewer bases than this
pub const EXPANSION_BASE_LIMIT: u32 = 3;
/// Supply fraction under which expanding is still safe
pub const EXPAND_SUPPLY_FRACTION: f64 = 0.7;
/// Supply fraction separating "room to build" from "maxed"
pub const MAXED_SUPPLY_FRACTION: f64 = 0.9;
/// Army size above which a maxed agent commits to an all-in
pub const ALL_IN_ARMY_THRESHOLD: u32 = 50;

/// Which rule produced a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyRule {
    RushDefense,
    AntiAir,
    EconomyRecovery,
    Expand,
    ArmyProduction,
    AllIn,
    Default,
}

impl StrategyRule {
    /// Rules in evaluation order
    pub const ORDER: [StrategyRule; 7] = [
        StrategyRule::RushDefense,
        StrategyRule::AntiAir,
        StrategyRule::EconomyRecovery,
        StrategyRule::Expand,
        StrategyRule::ArmyProduction,
        StrategyRule::AllIn,
        StrategyRule::Default,
    ];

    /// Does this rule's condition hold for the given facts?
    pub fn matches(&self, f: &FactSnapshot) -> bool {
        match self {
            StrategyRule::RushDefense => f.enemy_rush,
            StrategyRule::AntiAir => f.enemy_air && f.army_size < ANTI_AIR_ARMY_THRESHOLD,
            StrategyRule::EconomyRecovery => f.minerals < LOW_MINERALS && f.base_count < 2,
            StrategyRule::Expand => {
                f.minerals >= BANKED_MINERALS
                    && f.base_count < EXPANSION_BASE_LIMIT
                    && f.supply_used < f.supply_cap * EXPAND_SUPPLY_FRACTION
            }
            StrategyRule::ArmyProduction => {
                f.minerals >= BANKED_MINERALS
                    && f.supply_used < f.supply_cap * MAXED_SUPPLY_FRACTION
            }
            StrategyRule::AllIn => {
                f.army_size > ALL_IN_ARMY_THRESHOLD
                    && f.supply_used >= f.supply_cap * MAXED_SUPPLY_FRACTION
            }
            StrategyRule::Default => true,
        }
    }

    /// The decision this rule yields
    pub fn decision(&self) -> StrategyDecision {
        match self {
            StrategyRule::RushDefense => {
                StrategyDecision::new(Mode::Defend, TechFocus::Ground, Priority::Defense)
            }
            StrategyRule::AntiAir => {
                StrategyDecision::new(Mode::Army, TechFocus::AntiAir, Priority::Defense)
            }
            StrategyRule::EconomyRecovery | StrategyRule::Default => {
                StrategyDecision::new(Mode::Eco, TechFocus::Ground, Priority::Economy)
            }
            StrategyRule::Expand => {
                StrategyDecision::new(Mode::Expand, TechFocus::Ground, Priority::Economy)
            }
            StrategyRule::ArmyProduction => {
                StrategyDecision::new(Mode::Army, TechFocus::Mixed, Priority::Production)
            }
            StrategyRule::AllIn => {
                StrategyDecision::new(Mode::AllIn, TechFocus::Mixed, Priority::Offense)
            }
        }
    }
}

/// A decision together with the rule that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub rule: StrategyRule,
    pub decision: StrategyDecision,
}

/// Evaluate the rules in order and report the first match
pub fn classify(facts: &FactSnapshot) -> Classification {
    let rule = StrategyRule::ORDER
        .into_iter()
        .find(|rule| rule.matches(facts))
        .unwrap_or(StrategyRule::Default);

    Classification {
        rule,
        decision: rule.decision(),
    }
}

/// Pick the strategic posture for the given facts
pub fn decide(facts: &FactSnapshot) -> StrategyDecision {
    classify(facts).decision
}

/// Reads the blackboard and answers "what should we be doing right now?"
pub struct StrategyManager<'a> {
    intel: &'a IntelBlackboard,
}

impl<'a> StrategyManager<'a> {
    pub fn new(intel: &'a IntelBlackboard) -> Self {
        Self { intel }
    }

    pub fn facts(&self) -> &FactSnapshot {
        self.intel.facts()
    }

    pub fn decide(&self) -> StrategyDecision {
        decide(self.facts())
    }

    pub fn classify(&self) -> Classification {
        classify(self.facts())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zero_facts() -> FactSnapshot {
        FactSnapshot {
            supply_cap: 0.0,
            base_count: 0,
            ..FactSnapshot::default()
        }
    }

    #[test]
    fn test_rush_dominates_everything() {
        let facts = FactSnapshot {
            enemy_rush: true,
            enemy_air: true,
            minerals: 5000.0,
            army_size: 100,
            ..zero_facts()
        };
        let c = classify(&facts);
        assert_eq!(c.rule, StrategyRule::RushDefense);
        assert_eq!(
            c.decision,
            StrategyDecision::new(Mode::Defend, TechFocus::Ground, Priority::Defense)
        );
    }

    #[test]
    fn test_enemy_air_with_small_army() {
        let facts = FactSnapshot {
            enemy_air: true,
            army_size: 10,
            ..zero_facts()
        };
        assert_eq!(
            decide(&facts),
            StrategyDecision::new(Mode::Army, TechFocus::AntiAir, Priority::Defense)
        );
    }

    #[test]
    fn test_enemy_air_with_large_army_falls_through() {
        let facts = FactSnapshot {
            enemy_air: true,
            army_size: 20,
            ..zero_facts()
        };
        assert_ne!(classify(&facts).rule, StrategyRule::AntiAir);
    }

    #[test]
    fn test_starved_single_base() {
        let facts = FactSnapshot {
            minerals: 50.0,
            base_count: 1,
            ..zero_facts()
        };
        let c = classify(&facts);
        assert_eq!(c.rule, StrategyRule::EconomyRecovery);
        assert_eq!(
            c.decision,
            StrategyDecision::new(Mode::Eco, TechFocus::Ground, Priority::Economy)
        );
    }

    #[test]
    fn test_expand_when_banked_and_supply_free() {
        let facts = FactSnapshot {
            minerals: 300.0,
            base_count: 1,
            supply_used: 10.0,
            supply_cap: 20.0,
            ..zero_facts()
        };
        assert_eq!(
            decide(&facts),
            StrategyDecision::new(Mode::Expand, TechFocus::Ground, Priority::Economy)
        );
    }

    #[test]
    fn test_army_when_too_many_bases_to_expand() {
        let facts = FactSnapshot {
            minerals: 300.0,
            supply_used: 17.0,
            supply_cap: 20.0,
            base_count: 5,
            ..zero_facts()
        };
        assert_eq!(
            decide(&facts),
            StrategyDecision::new(Mode::Army, TechFocus::Mixed, Priority::Production)
        );
    }

    #[test]
    fn test_all_in_when_maxed() {
        // Economy recovery outranks all-in, so the starved single-base case
        // must not apply.
        let facts = FactSnapshot {
            army_size: 60,
            supply_used: 19.0,
            supply_cap: 20.0,
            base_count: 2,
            ..zero_facts()
        };
        let c = classify(&facts);
        assert_eq!(c.rule, StrategyRule::AllIn);
        assert_eq!(
            c.decision,
            StrategyDecision::new(Mode::AllIn, TechFocus::Mixed, Priority::Offense)
        );
    }

    #[test]
    fn test_all_zero_facts_yield_eco() {
        assert_eq!(
            decide(&zero_facts()),
            StrategyDecision::new(Mode::Eco, TechFocus::Ground, Priority::Economy)
        );
    }

    #[test]
    fn test_default_path_distinct_from_economy_recovery() {
        assert_eq!(classify(&zero_facts()).rule, StrategyRule::EconomyRecovery);

        // Minerals in [100, 300) skip every conditional rule.
        let facts = FactSnapshot {
            minerals: 150.0,
            ..zero_facts()
        };
        let c = classify(&facts);
        assert_eq!(c.rule, StrategyRule::Default);
        assert_eq!(
            c.decision,
            StrategyDecision::new(Mode::Eco, TechFocus::Ground, Priority::Economy)
        );
    }

    #[test]
    fn test_zero_supply_cap_disables_supply_gated_rules() {
        let facts = FactSnapshot {
            minerals: 1000.0,
            base_count: 1,
            supply_used: 0.0,
            supply_cap: 0.0,
            ..FactSnapshot::default()
        };
        assert_eq!(classify(&facts).rule, StrategyRule::Default);

        let facts = FactSnapshot {
            army_size: 51,
            supply_cap: 0.0,
            minerals: 150.0,
            ..FactSnapshot::default()
        };
        assert_eq!(classify(&facts).rule, StrategyRule::AllIn);
    }

    #[test]
    fn test_manager_reads_blackboard() {
        use crate::intel::Observation;

        let mut bb = IntelBlackboard::new();
        bb.update(&Observation::new().with("enemy_rush", true));
        let manager = StrategyManager::new(&bb);
        assert_eq!(manager.decide().mode, Mode::Defend);
        assert_eq!(manager.classify().rule, StrategyRule::RushDefense);
    }
}
