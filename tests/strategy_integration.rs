//! Blackboard and strategy classifier integration tests

use hivemind::intel::{FactSnapshot, IntelBlackboard, Observation, TRACKED_KEYS};
use hivemind::strategy::{
    classify, decide, Mode, Priority, StrategyDecision, StrategyManager, StrategyRule, TechFocus,
};
use proptest::prelude::*;

fn decision(mode: Mode, tech_focus: TechFocus, priority: Priority) -> StrategyDecision {
    StrategyDecision::new(mode, tech_focus, priority)
}

#[test]
fn test_observation_to_decision_loop() {
    let mut intel = IntelBlackboard::new();

    // Opening: nothing banked, one base
    intel.update(&Observation::new().with("minerals", 50).with("base_count", 1));
    assert_eq!(
        StrategyManager::new(&intel).decide(),
        decision(Mode::Eco, TechFocus::Ground, Priority::Economy)
    );

    // Banked with supply to spare: expand
    intel.update(
        &Observation::new()
            .with("minerals", 300)
            .with("base_count", 1)
            .with("food_used", 10)
            .with("food_cap", 20),
    );
    assert_eq!(
        StrategyManager::new(&intel).decide(),
        decision(Mode::Expand, TechFocus::Ground, Priority::Economy)
    );

    // Scout spots a rush: everything else is irrelevant
    intel.update(
        &Observation::new()
            .with("enemy_rush", true)
            .with("minerals", 5000)
            .with("army_size", 100),
    );
    assert_eq!(
        StrategyManager::new(&intel).decide(),
        decision(Mode::Defend, TechFocus::Ground, Priority::Defense)
    );

    // New game
    intel.reset();
    assert_eq!(intel.facts(), &FactSnapshot::default());
}

#[test]
fn test_air_threat_from_json_observation() {
    let mut intel = IntelBlackboard::new();
    intel
        .update_from_json(r#"{"enemy_air": true, "army_size": 10, "minerals": 900}"#)
        .unwrap();

    let manager = StrategyManager::new(&intel);
    assert_eq!(manager.classify().rule, StrategyRule::AntiAir);
    assert_eq!(
        manager.decide(),
        decision(Mode::Army, TechFocus::AntiAir, Priority::Defense)
    );
}

#[test]
fn test_literal_rule_scenarios() {
    let zero = FactSnapshot {
        supply_cap: 0.0,
        base_count: 0,
        ..FactSnapshot::default()
    };

    let cases = [
        (
            FactSnapshot {
                minerals: 300.0,
                supply_used: 17.0,
                supply_cap: 20.0,
                base_count: 5,
                ..zero.clone()
            },
            StrategyRule::ArmyProduction,
            decision(Mode::Army, TechFocus::Mixed, Priority::Production),
        ),
        (
            FactSnapshot {
                army_size: 60,
                supply_used: 19.0,
                supply_cap: 20.0,
                base_count: 2,
                ..zero.clone()
            },
            StrategyRule::AllIn,
            decision(Mode::AllIn, TechFocus::Mixed, Priority::Offense),
        ),
        (
            FactSnapshot {
                minerals: 200.0,
                base_count: 3,
                supply_used: 10.0,
                supply_cap: 20.0,
                ..zero.clone()
            },
            StrategyRule::Default,
            decision(Mode::Eco, TechFocus::Ground, Priority::Economy),
        ),
    ];

    for (facts, rule, expected) in cases {
        let c = classify(&facts);
        assert_eq!(c.rule, rule, "facts: {facts:?}");
        assert_eq!(c.decision, expected);
    }

    assert_eq!(
        decide(&zero),
        decision(Mode::Eco, TechFocus::Ground, Priority::Economy)
    );
}

#[test]
fn test_default_observation_is_default_facts() {
    let mut intel = IntelBlackboard::new();
    intel.update(&Observation::new());
    assert_eq!(intel.facts(), &FactSnapshot::default());
}

fn arb_facts() -> impl Strategy<Value = FactSnapshot> {
    (
        (any::<bool>(), any::<bool>(), any::<bool>(), 0u32..5, 0u32..6),
        (0.0f64..2000.0, 0.0f64..200.0, 0.0f64..200.0, 0u32..120, 0u32..6),
    )
        .prop_map(
            |(
                (enemy_air, enemy_rush, enemy_ground, enemy_tech_level, enemy_base_count),
                (minerals, supply_used, supply_cap, army_size, base_count),
            )| FactSnapshot {
                enemy_air,
                enemy_rush,
                enemy_ground,
                enemy_tech_level,
                enemy_base_count,
                minerals,
                supply_used,
                supply_cap,
                army_size,
                base_count,
                ..FactSnapshot::default()
            },
        )
}

/// Read the fact field fed by an observation key, as JSON for comparison
fn field_for_key(facts: &FactSnapshot, key: &str) -> serde_json::Value {
    let json = serde_json::to_value(facts).unwrap();
    let field = match key {
        "food_used" => "supply_used",
        "food_cap" => "supply_cap",
        other => other,
    };
    json[field].clone()
}

proptest! {
    #[test]
    fn prop_decide_is_pure(facts in arb_facts()) {
        prop_assert_eq!(decide(&facts), decide(&facts));
        prop_assert_eq!(classify(&facts), classify(&facts));
    }

    #[test]
    fn prop_first_matching_rule_wins(facts in arb_facts()) {
        let c = classify(&facts);
        prop_assert!(c.rule.matches(&facts));
        for earlier in StrategyRule::ORDER.iter().take_while(|r| **r != c.rule) {
            prop_assert!(!earlier.matches(&facts), "{:?} matched before {:?}", earlier, c.rule);
        }
        prop_assert_eq!(c.decision, c.rule.decision());
    }

    #[test]
    fn prop_rush_ignores_lower_rule_fields(
        facts in arb_facts(),
        minerals in 0.0f64..10000.0,
        army_size in 0u32..500,
        supply_used in 0.0f64..200.0,
    ) {
        let rushed = FactSnapshot { enemy_rush: true, ..facts };
        let varied = FactSnapshot { minerals, army_size, supply_used, ..rushed.clone() };
        prop_assert_eq!(decide(&rushed), decide(&varied));
        prop_assert_eq!(decide(&varied).mode, Mode::Defend);
    }

    #[test]
    fn prop_missing_keys_take_defaults(mask in 0u16..(1 << 13)) {
        let full = Observation::new()
            .with("minerals", 777)
            .with("gas", 333)
            .with("food_used", 55)
            .with("food_cap", 99)
            .with("army_size", 41)
            .with("base_count", 4)
            .with("game_time", 123.5)
            .with("enemy_air", true)
            .with("enemy_rush", true)
            .with("enemy_ground", true)
            .with("enemy_tech_level", 3)
            .with("enemy_base_count", 2)
            .with("last_enemy_sighting", 99.5);

        let partial: Observation = TRACKED_KEYS
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1u16 << *i) != 0)
            .map(|(_, k)| (*k, full.get(k).cloned().unwrap()))
            .collect();

        let mut intel = IntelBlackboard::new();
        intel.update(&full);
        intel.update(&partial);

        let defaults = FactSnapshot::default();
        for (i, key) in TRACKED_KEYS.iter().enumerate() {
            let got = field_for_key(intel.facts(), key);
            if mask & (1u16 << i) == 0 {
                prop_assert_eq!(got, field_for_key(&defaults, key), "key {}", key);
            } else {
                prop_assert_ne!(got, field_for_key(&defaults, key), "key {}", key);
            }
        }
    }
}
