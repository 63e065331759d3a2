//! End-to-end decision tests against the engine facade

use chrono::{Duration, Utc};
use decision_engine::{
    DecisionEngine, DecisionRequest, EngineSettings, EngineType, InstanceMode, InstanceState,
    PolicyConfig, PoolQuote, PricingSnapshot, RecommendedAction,
};
use std::path::PathBuf;

fn rule_based_engine() -> DecisionEngine {
    DecisionEngine::new(EngineSettings {
        engine_type: EngineType::RuleBased,
        model_dir: PathBuf::from("/nonexistent"),
        region: "ap-south-1".to_string(),
    })
}

fn scenario_policy() -> PolicyConfig {
    PolicyConfig {
        auto_switch_enabled: true,
        min_savings_percent: 5.0,
        risk_threshold: 0.7,
        max_switches_per_week: 10,
        min_pool_duration_hours: 2.0,
    }
}

fn scenario_instance() -> InstanceState {
    InstanceState {
        instance_id: "i-1234".to_string(),
        current_mode: InstanceMode::Discounted,
        current_pool_id: Some("P1".to_string()),
    }
}

fn scenario_pricing() -> PricingSnapshot {
    PricingSnapshot {
        guaranteed_price: 0.085,
        pools: vec![
            PoolQuote { pool_id: "P1".to_string(), price: 0.040 },
            PoolQuote { pool_id: "P2".to_string(), price: 0.035 },
            PoolQuote { pool_id: "P3".to_string(), price: 0.038 },
        ],
    }
}

/// Scenario A: normal conditions, a cheaper pool clearing the savings
/// threshold wins
#[test]
fn scenario_a_switches_to_cheapest_pool() {
    let engine = rule_based_engine();
    let decision = engine.decide(
        &scenario_instance(),
        &scenario_pricing(),
        &scenario_policy(),
        2,
        Some(Utc::now() - Duration::hours(3)),
    );

    // ratio 0.040/0.085 ~ 0.47 is normal; P2 saves ~5.9% >= 5.0%
    assert_eq!(decision.recommended_action, RecommendedAction::SwitchPool);
    assert_eq!(decision.recommended_pool_id, "P2");
    assert_eq!(decision.recommended_mode, InstanceMode::Discounted);
    assert!((decision.expected_savings_per_hour - 0.005).abs() < 1e-6);
    assert!(decision.allowed);
}

/// Scenario B: price ratio at 0.90 trips the high-risk rule and the
/// engine recommends the guaranteed tier at a cost
#[test]
fn scenario_b_high_ratio_falls_back_to_guaranteed() {
    let engine = rule_based_engine();
    let pricing = PricingSnapshot {
        guaranteed_price: 0.085,
        pools: vec![
            PoolQuote { pool_id: "P1".to_string(), price: 0.0765 },
            PoolQuote { pool_id: "P2".to_string(), price: 0.080 },
        ],
    };
    let decision = engine.decide(
        &scenario_instance(),
        &pricing,
        &scenario_policy(),
        2,
        Some(Utc::now() - Duration::hours(3)),
    );

    assert_eq!(
        decision.recommended_action,
        RecommendedAction::FallbackGuaranteed
    );
    assert_eq!(decision.recommended_mode, InstanceMode::Guaranteed);
    assert_eq!(decision.recommended_pool_id, "n/a");
    assert!((decision.risk_score - 0.85).abs() < 1e-9);
    assert!(decision.expected_savings_per_hour < 0.0);
}

/// Scenario C: the frequency gate overrides any pricing
#[test]
fn scenario_c_switch_limit_blocks_regardless_of_pricing() {
    let engine = rule_based_engine();

    for pricing in [
        scenario_pricing(),
        PricingSnapshot {
            guaranteed_price: 0.085,
            pools: vec![PoolQuote { pool_id: "P1".to_string(), price: 0.0765 }],
        },
    ] {
        let decision = engine.decide(
            &scenario_instance(),
            &pricing,
            &scenario_policy(),
            10,
            Some(Utc::now() - Duration::hours(3)),
        );
        assert_eq!(decision.recommended_action, RecommendedAction::Stay);
        assert!(!decision.allowed);
        assert_eq!(decision.risk_score, 0.0);
        assert!(decision.reason.contains("Switch limit reached"));
    }
}

/// Cooldown gate blocks independently of the frequency gate
#[test]
fn cooldown_blocks_regardless_of_pricing() {
    let engine = rule_based_engine();
    let decision = engine.decide(
        &scenario_instance(),
        &scenario_pricing(),
        &scenario_policy(),
        0,
        Some(Utc::now() - Duration::minutes(45)),
    );
    assert_eq!(decision.recommended_action, RecommendedAction::Stay);
    assert!(!decision.allowed);
    assert!(decision.reason.contains("Too soon to switch"));
}

/// Scenario D: a model-based engine with no loaded bundle scores every
/// pool neutrally, even at extreme ratios
#[test]
fn scenario_d_model_engine_neutral_for_unknown_pools() {
    let engine = DecisionEngine::new(EngineSettings {
        engine_type: EngineType::ModelBased,
        model_dir: PathBuf::from("/nonexistent"),
        region: "ap-south-1".to_string(),
    });
    assert!(!engine.is_loaded());

    let pricing = PricingSnapshot {
        guaranteed_price: 0.085,
        pools: vec![PoolQuote { pool_id: "P1".to_string(), price: 0.084 }],
    };
    let decision = engine.decide(
        &scenario_instance(),
        &pricing,
        &scenario_policy(),
        2,
        None,
    );

    // Neutral 0.5 stays below the 0.7 risk threshold: no fallback
    assert!((decision.risk_score - 0.5).abs() < 1e-9);
    assert_eq!(decision.recommended_action, RecommendedAction::Stay);
}

/// Risk score bounds hold across a grid of inputs
#[test]
fn risk_score_always_within_unit_interval() {
    let engine = rule_based_engine();
    let policy = scenario_policy();

    for guaranteed in [0.0, 0.001, 0.085, 10.0] {
        for price in [0.0001, 0.035, 0.085, 5.0] {
            let pricing = PricingSnapshot {
                guaranteed_price: guaranteed,
                pools: vec![PoolQuote { pool_id: "P1".to_string(), price }],
            };
            let decision = engine.decide(&scenario_instance(), &pricing, &policy, 2, None);
            assert!(
                (0.0..=1.0).contains(&decision.risk_score),
                "risk {} out of bounds for guaranteed={} price={}",
                decision.risk_score,
                guaranteed,
                price
            );
        }
    }
}

/// Identical inputs produce identical decisions
#[test]
fn decide_is_idempotent() {
    let engine = rule_based_engine();
    let instance = scenario_instance();
    let pricing = scenario_pricing();
    let policy = scenario_policy();
    let last_switch = Some(Utc::now() - Duration::hours(5));

    let first = engine.decide(&instance, &pricing, &policy, 2, last_switch);
    let second = engine.decide(&instance, &pricing, &policy, 2, last_switch);
    assert_eq!(first, second);
}

/// Every decision path carries a human-readable reason
#[test]
fn every_decision_has_a_reason() {
    let engine = rule_based_engine();
    let cases = vec![
        // blocked by frequency
        (scenario_pricing(), 10, None),
        // blocked by cooldown
        (scenario_pricing(), 0, Some(Utc::now() - Duration::minutes(10))),
        // empty quote list
        (
            PricingSnapshot { guaranteed_price: 0.085, pools: vec![] },
            0,
            None,
        ),
        // normal switch
        (scenario_pricing(), 0, None),
    ];

    for (pricing, count, last) in cases {
        let decision = engine.decide(&scenario_instance(), &pricing, &scenario_policy(), count, last);
        assert!(!decision.reason.is_empty());
    }
}

/// A decision request bundle round-trips through serde and decides the
/// same as the exploded arguments
#[test]
fn decision_request_bundle_matches_exploded_arguments() {
    let engine = rule_based_engine();
    let request = DecisionRequest {
        instance: scenario_instance(),
        pricing: scenario_pricing(),
        policy: scenario_policy(),
        recent_switch_count: 2,
        last_switch_time: Some(Utc::now() - Duration::hours(3)),
    };

    let raw = serde_json::to_string(&request).unwrap();
    let parsed: DecisionRequest = serde_json::from_str(&raw).unwrap();

    let from_bundle = engine.decide_request(&parsed);
    let from_args = engine.decide(
        &request.instance,
        &request.pricing,
        &request.policy,
        request.recent_switch_count,
        request.last_switch_time,
    );
    assert_eq!(from_bundle, from_args);
}

/// The engine is shareable across threads (no interior mutability)
#[test]
fn concurrent_decides_agree() {
    let engine = std::sync::Arc::new(rule_based_engine());
    let mut handles = Vec::new();

    for _ in 0..4 {
        let engine = std::sync::Arc::clone(&engine);
        handles.push(std::thread::spawn(move || {
            engine.decide(
                &scenario_instance(),
                &scenario_pricing(),
                &scenario_policy(),
                2,
                None,
            )
        }));
    }

    let mut decisions: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let first = decisions.pop().unwrap();
    for decision in decisions {
        assert_eq!(decision, first);
    }
}
