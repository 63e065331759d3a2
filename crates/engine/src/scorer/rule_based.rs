//! Static-threshold risk scoring

use super::{price_ratio, RiskScorer};
use crate::models::{RiskAssessment, RiskState};

/// Price ratio at or above which the pool is considered high risk
const HIGH_PRICE_THRESHOLD: f64 = 0.85;

/// Price ratio at or below which returning to the discounted tier is safe
const SAFE_PRICE_THRESHOLD: f64 = 0.40;

/// Rule-based scorer with static thresholds
///
/// Needs no external data, so it is always loaded and serves as the
/// degradation target for the hybrid strategy.
#[derive(Debug, Clone, Default)]
pub struct RuleBasedScorer;

impl RuleBasedScorer {
    pub fn new() -> Self {
        Self
    }
}

impl RiskScorer for RuleBasedScorer {
    fn score(
        &self,
        _pool_id: &str,
        current_price: f64,
        _current_discount_ratio: f64,
        guaranteed_price: f64,
    ) -> RiskAssessment {
        let ratio = price_ratio(current_price, guaranteed_price);

        if ratio >= HIGH_PRICE_THRESHOLD {
            RiskAssessment {
                score: 0.85,
                state: RiskState::HighRisk,
                reason: format!("Price ratio {:.3} >= {}", ratio, HIGH_PRICE_THRESHOLD),
            }
        } else if ratio <= SAFE_PRICE_THRESHOLD {
            RiskAssessment {
                score: 0.15,
                state: RiskState::SafeToReturn,
                reason: format!("Price ratio {:.3} <= {}", ratio, SAFE_PRICE_THRESHOLD),
            }
        } else {
            RiskAssessment {
                score: 0.35,
                state: RiskState::Normal,
                reason: format!("Price ratio {:.3} in normal range", ratio),
            }
        }
    }

    fn is_loaded(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "rule_based"
    }
}
