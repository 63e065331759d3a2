//! Hybrid scoring: model baselines with rule-based degradation
//!
//! The delegate is chosen once at construction. A startup load failure is
//! logged there and the engine silently runs rule-based for the process
//! lifetime; the choice is never re-evaluated per call.

use super::{ModelBasedScorer, RiskScorer, RuleBasedScorer};
use crate::models::RiskAssessment;
use crate::repository::ModelRepository;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

enum Delegate {
    Model(ModelBasedScorer),
    Rules(RuleBasedScorer),
}

/// Scorer that prefers the trained baselines and degrades to rules
pub struct HybridScorer {
    delegate: Delegate,
}

impl HybridScorer {
    /// Attempt the model load and fix the delegate accordingly
    pub fn load(model_dir: &Path, region: &str) -> Self {
        Self::with_repository(Arc::new(ModelRepository::load(model_dir, region)))
    }

    /// Fix the delegate from an already-attempted repository load
    pub fn with_repository(repository: Arc<ModelRepository>) -> Self {
        let model = ModelBasedScorer::with_repository(repository);
        if model.is_loaded() {
            info!(
                event = "hybrid_delegate_selected",
                delegate = "model_based",
                "Hybrid engine using trained baselines"
            );
            Self {
                delegate: Delegate::Model(model),
            }
        } else {
            info!(
                event = "hybrid_delegate_selected",
                delegate = "rule_based",
                "Model baselines unavailable, hybrid engine degrading to rules"
            );
            Self {
                delegate: Delegate::Rules(RuleBasedScorer::new()),
            }
        }
    }

    /// The model repository, when the model delegate was selected
    pub fn repository(&self) -> Option<&ModelRepository> {
        match &self.delegate {
            Delegate::Model(m) => Some(m.repository()),
            Delegate::Rules(_) => None,
        }
    }
}

impl RiskScorer for HybridScorer {
    fn score(
        &self,
        pool_id: &str,
        current_price: f64,
        current_discount_ratio: f64,
        guaranteed_price: f64,
    ) -> RiskAssessment {
        match &self.delegate {
            Delegate::Model(m) => {
                m.score(pool_id, current_price, current_discount_ratio, guaranteed_price)
            }
            Delegate::Rules(r) => {
                r.score(pool_id, current_price, current_discount_ratio, guaranteed_price)
            }
        }
    }

    fn is_loaded(&self) -> bool {
        // Operational with either delegate once constructed
        true
    }

    fn name(&self) -> &'static str {
        match &self.delegate {
            Delegate::Model(_) => "hybrid(model)",
            Delegate::Rules(_) => "hybrid(rules)",
        }
    }
}
