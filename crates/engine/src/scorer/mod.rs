//! Risk scoring strategies

mod hybrid;
mod model_based;
mod rule_based;

pub use hybrid::HybridScorer;
pub use model_based::ModelBasedScorer;
pub use rule_based::RuleBasedScorer;

use crate::models::RiskAssessment;

/// Trait for risk scoring implementations
///
/// Implementations are pure functions of their inputs and the baselines
/// loaded at construction: no side effects, and no panics for any finite
/// positive price input. Unknown pools degrade to a neutral assessment
/// rather than erroring.
pub trait RiskScorer: Send + Sync {
    /// Score one price observation for a pool
    fn score(
        &self,
        pool_id: &str,
        current_price: f64,
        current_discount_ratio: f64,
        guaranteed_price: f64,
    ) -> RiskAssessment;

    /// Whether the scorer's baselines loaded successfully
    fn is_loaded(&self) -> bool;

    /// Name of the strategy for logging and status surfaces
    fn name(&self) -> &'static str;
}

/// Price ratio with the divide-by-zero guard shared by all scorers
///
/// A non-positive guaranteed price fixes the ratio at the neutral 1.0.
pub(crate) fn price_ratio(current_price: f64, guaranteed_price: f64) -> f64 {
    if guaranteed_price > 0.0 {
        current_price / guaranteed_price
    } else {
        1.0
    }
}
