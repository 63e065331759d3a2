//! Decision orchestration
//!
//! Applies the policy gates (switch frequency, pool cooldown) before any
//! risk evaluation, resolves the instance's current price, invokes the
//! configured risk scorer and selects the recommended action.

use crate::models::{
    Decision, InstanceMode, InstanceState, PolicyConfig, PoolQuote, PricingSnapshot,
    RecommendedAction, RiskState,
};
use crate::observability::{DecisionLogger, EngineMetrics};
use crate::scorer::RiskScorer;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Pool id reported when a recommendation has no pool
const NO_POOL: &str = "n/a";

/// Policy-gated decision orchestrator
///
/// Stateless per call: every input is supplied fresh and the produced
/// `Decision` passes entirely to the caller.
pub struct PolicyEngine {
    scorer: Arc<dyn RiskScorer>,
    logger: DecisionLogger,
    metrics: EngineMetrics,
}

impl PolicyEngine {
    pub fn new(scorer: Arc<dyn RiskScorer>, logger: DecisionLogger, metrics: EngineMetrics) -> Self {
        Self {
            scorer,
            logger,
            metrics,
        }
    }

    pub fn scorer(&self) -> &dyn RiskScorer {
        self.scorer.as_ref()
    }

    /// Produce one switching decision
    ///
    /// Never fails for well-typed input: degenerate pricing yields a
    /// `stay` decision with an explanatory reason instead of an error.
    pub fn decide(
        &self,
        instance: &InstanceState,
        pricing: &PricingSnapshot,
        policy: &PolicyConfig,
        recent_switch_count: u32,
        last_switch_time: Option<DateTime<Utc>>,
    ) -> Decision {
        let current_pool_label = instance
            .current_pool_id
            .clone()
            .unwrap_or_else(|| NO_POOL.to_string());

        // Policy gate: switch frequency limit
        if recent_switch_count >= policy.max_switches_per_week {
            let reason = format!(
                "Switch limit reached: {}/{} switches this week",
                recent_switch_count, policy.max_switches_per_week
            );
            self.logger
                .log_policy_block(&instance.instance_id, "switch_frequency", &reason);
            self.metrics.inc_policy_blocks();
            return blocked(instance, &current_pool_label, reason);
        }

        // Policy gate: pool cooldown
        if let Some(last_switch) = last_switch_time {
            let hours_since = (Utc::now() - last_switch).num_seconds() as f64 / 3600.0;
            if hours_since < policy.min_pool_duration_hours {
                let reason = format!(
                    "Too soon to switch: {:.1}h < {}h minimum",
                    hours_since, policy.min_pool_duration_hours
                );
                self.logger
                    .log_policy_block(&instance.instance_id, "pool_cooldown", &reason);
                self.metrics.inc_policy_blocks();
                return blocked(instance, &current_pool_label, reason);
            }
        }

        // Resolve the instance's current price from the snapshot
        let (current_pool_id, current_price) = match self.resolve_current_price(instance, pricing) {
            Some(resolved) => resolved,
            None => {
                return Decision {
                    instance_id: instance.instance_id.clone(),
                    risk_score: 0.0,
                    recommended_action: RecommendedAction::Stay,
                    recommended_mode: instance.current_mode,
                    recommended_pool_id: current_pool_label,
                    expected_savings_per_hour: 0.0,
                    allowed: policy.auto_switch_enabled,
                    reason: "no pool quotes available".to_string(),
                };
            }
        };

        let guaranteed_price = pricing.guaranteed_price;
        let current_discount_ratio = if guaranteed_price > 0.0 {
            1.0 - current_price / guaranteed_price
        } else {
            0.0
        };

        let assessment = self.scorer.score(
            &current_pool_id,
            current_price,
            current_discount_ratio,
            guaranteed_price,
        );

        let mut action = RecommendedAction::Stay;
        let mut mode = instance.current_mode;
        let mut pool_id = current_pool_id.clone();
        let mut expected_savings = 0.0;
        let mut reason = assessment.reason.clone();

        if matches!(assessment.state, RiskState::Event | RiskState::HighRisk)
            && assessment.score >= policy.risk_threshold
        {
            // High risk: leave the discounted tier entirely
            action = RecommendedAction::FallbackGuaranteed;
            mode = InstanceMode::Guaranteed;
            pool_id = NO_POOL.to_string();
            expected_savings = -(guaranteed_price - current_price);
            reason = format!(
                "High risk detected (score: {:.2}), fallback to guaranteed tier recommended",
                assessment.score
            );
        } else if assessment.state == RiskState::SafeToReturn
            && instance.current_mode == InstanceMode::Guaranteed
        {
            if let Some(best) = best_pool(&pricing.pools) {
                let savings_pct = savings_percent(guaranteed_price - best.price, guaranteed_price);
                if savings_pct >= policy.min_savings_percent {
                    action = RecommendedAction::SwitchPool;
                    mode = InstanceMode::Discounted;
                    pool_id = best.pool_id.clone();
                    expected_savings = guaranteed_price - best.price;
                    reason = format!(
                        "Safe to return to discounted tier. Pool {} offers {:.1}% savings",
                        best.pool_id, savings_pct
                    );
                }
            }
        } else if instance.current_mode == InstanceMode::Discounted
            && assessment.state == RiskState::Normal
        {
            if let Some(best) = best_pool(&pricing.pools) {
                if best.pool_id != current_pool_id {
                    let savings = current_price - best.price;
                    let savings_pct = savings_percent(savings, guaranteed_price);
                    if savings_pct >= policy.min_savings_percent {
                        action = RecommendedAction::SwitchPool;
                        mode = InstanceMode::Discounted;
                        pool_id = best.pool_id.clone();
                        expected_savings = savings;
                        reason = format!(
                            "Better pool available: {} saves {:.1}%",
                            best.pool_id, savings_pct
                        );
                    }
                }
            }
        }

        Decision {
            instance_id: instance.instance_id.clone(),
            risk_score: round_to(assessment.score, 4),
            recommended_action: action,
            recommended_mode: mode,
            recommended_pool_id: pool_id,
            expected_savings_per_hour: round_to(expected_savings, 6),
            allowed: policy.auto_switch_enabled,
            reason,
        }
    }

    /// Match the recorded pool against the snapshot; adopt the first
    /// quote when the recorded pool has gone stale
    fn resolve_current_price(
        &self,
        instance: &InstanceState,
        pricing: &PricingSnapshot,
    ) -> Option<(String, f64)> {
        if let Some(pool_id) = &instance.current_pool_id {
            if let Some(quote) = pricing.pools.iter().find(|q| &q.pool_id == pool_id) {
                return Some((quote.pool_id.clone(), quote.price));
            }
        }

        let first = pricing.pools.first()?;
        if instance.current_pool_id.is_some() {
            // Recorded assignment has no quote in this snapshot
            self.logger.log_stale_pool_fallback(
                &instance.instance_id,
                instance.current_pool_id.as_deref(),
                &first.pool_id,
            );
            self.metrics.inc_stale_pool_fallbacks();
        }
        Some((first.pool_id.clone(), first.price))
    }
}

fn blocked(instance: &InstanceState, current_pool_label: &str, reason: String) -> Decision {
    Decision {
        instance_id: instance.instance_id.clone(),
        risk_score: 0.0,
        recommended_action: RecommendedAction::Stay,
        recommended_mode: instance.current_mode,
        recommended_pool_id: current_pool_label.to_string(),
        expected_savings_per_hour: 0.0,
        allowed: false,
        reason,
    }
}

/// Minimum-price pool; ties break on first occurrence
fn best_pool(pools: &[PoolQuote]) -> Option<&PoolQuote> {
    pools.iter().fold(None, |best, quote| match best {
        Some(b) if quote.price >= b.price => Some(b),
        _ => Some(quote),
    })
}

fn savings_percent(savings: f64, guaranteed_price: f64) -> f64 {
    if guaranteed_price > 0.0 {
        savings / guaranteed_price * 100.0
    } else {
        0.0
    }
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}
