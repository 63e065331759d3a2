//! Baseline-driven risk scoring
//!
//! Compares the observed price ratio against the per-pool percentile
//! context loaded from the model bundle, applying the anomaly rules in
//! strict priority order: absolute-high, p92 exceedance, median spike,
//! safe-return, normal.

use super::{price_ratio, RiskScorer};
use crate::models::{RiskAssessment, RiskState};
use crate::repository::ModelRepository;
use std::path::Path;
use std::sync::Arc;

/// Scorer backed by the trained statistical baselines
pub struct ModelBasedScorer {
    repository: Arc<ModelRepository>,
}

impl ModelBasedScorer {
    /// Load the bundle from disk; a failed load yields a scorer that
    /// reports `is_loaded() == false` and returns neutral assessments
    pub fn load(model_dir: &Path, region: &str) -> Self {
        Self {
            repository: Arc::new(ModelRepository::load(model_dir, region)),
        }
    }

    /// Build from an already-loaded repository
    pub fn with_repository(repository: Arc<ModelRepository>) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &ModelRepository {
        &self.repository
    }

    fn neutral(reason: &str) -> RiskAssessment {
        RiskAssessment {
            score: 0.5,
            state: RiskState::Normal,
            reason: reason.to_string(),
        }
    }
}

impl RiskScorer for ModelBasedScorer {
    fn score(
        &self,
        pool_id: &str,
        current_price: f64,
        _current_discount_ratio: f64,
        guaranteed_price: f64,
    ) -> RiskAssessment {
        if !self.repository.is_loaded() {
            return Self::neutral("models not loaded");
        }

        let context = match self.repository.context(pool_id) {
            Some(ctx) => ctx,
            None => return Self::neutral("pool not in training data"),
        };
        // thresholds are present whenever the bundle loaded
        let thresholds = match self.repository.thresholds() {
            Some(t) => t,
            None => return Self::neutral("models not loaded"),
        };

        let ratio = price_ratio(current_price, guaranteed_price);
        let spike_cutoff = context.ratio_p50 * (1.0 + thresholds.ratio_spike_threshold);

        if ratio > thresholds.ratio_absolute_high {
            RiskAssessment {
                score: 0.9,
                state: RiskState::Event,
                reason: format!(
                    "Ratio {:.3} exceeds absolute threshold {}",
                    ratio, thresholds.ratio_absolute_high
                ),
            }
        } else if ratio > context.ratio_p92 {
            RiskAssessment {
                score: 0.8,
                state: RiskState::HighRisk,
                reason: format!("Ratio {:.3} above p92 ({:.3})", ratio, context.ratio_p92),
            }
        } else if ratio > spike_cutoff {
            RiskAssessment {
                score: 0.6,
                state: RiskState::HighRisk,
                reason: format!(
                    "Ratio spike detected: {:.3} vs p50 {:.3}",
                    ratio, context.ratio_p50
                ),
            }
        } else if ratio < thresholds.ratio_safe_return {
            RiskAssessment {
                score: 0.2,
                state: RiskState::SafeToReturn,
                reason: format!(
                    "Ratio {:.3} below safe threshold {}",
                    ratio, thresholds.ratio_safe_return
                ),
            }
        } else {
            RiskAssessment {
                score: 0.3,
                state: RiskState::Normal,
                reason: format!("Normal conditions: ratio {:.3}", ratio),
            }
        }
    }

    fn is_loaded(&self) -> bool {
        self.repository.is_loaded()
    }

    fn name(&self) -> &'static str {
        "model_based"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::compute_checksum;
    use std::fs;
    use tempfile::TempDir;

    const REGION: &str = "ap-south-1";

    fn scorer_with_bundle() -> (TempDir, ModelBasedScorer) {
        let dir = TempDir::new().unwrap();
        let context = serde_json::json!({
            "config": {
                "ratio_spike_threshold": 0.30,
                "ratio_absolute_high": 0.85,
                "ratio_safe_return": 0.40
            },
            "pools": {
                "p1": { "ratio_p50": 0.50, "ratio_p92": 0.70 }
            }
        })
        .to_string();
        let price = serde_json::json!({ "models": {} }).to_string();

        fs::write(dir.path().join("ctx.json"), &context).unwrap();
        fs::write(dir.path().join("price.json"), &price).unwrap();
        let manifest = serde_json::json!({
            "version": "v1.0.0",
            "models": { (REGION): { "pool_context": "ctx.json", "price_model": "price.json" } },
            "checksums": {
                "ctx.json": compute_checksum(context.as_bytes()),
                "price.json": compute_checksum(price.as_bytes())
            }
        });
        fs::write(dir.path().join("manifest.json"), manifest.to_string()).unwrap();

        let scorer = ModelBasedScorer::load(dir.path(), REGION);
        assert!(scorer.is_loaded());
        (dir, scorer)
    }

    #[test]
    fn unknown_pool_returns_neutral_default() {
        let (_dir, scorer) = scorer_with_bundle();
        // Extreme ratio must not matter for an untrained pool
        let assessment = scorer.score("p-unknown", 99.0, -98.0, 1.0);
        assert!((assessment.score - 0.5).abs() < 1e-9);
        assert_eq!(assessment.state, RiskState::Normal);
        assert_eq!(assessment.reason, "pool not in training data");
    }

    #[test]
    fn unloaded_bundle_returns_neutral_default() {
        let dir = TempDir::new().unwrap();
        let scorer = ModelBasedScorer::load(dir.path(), REGION);
        assert!(!scorer.is_loaded());

        let assessment = scorer.score("p1", 0.90, 0.10, 1.0);
        assert!((assessment.score - 0.5).abs() < 1e-9);
        assert_eq!(assessment.reason, "models not loaded");
    }

    #[test]
    fn absolute_high_takes_priority() {
        let (_dir, scorer) = scorer_with_bundle();
        // ratio 0.9 is above p92 and the spike cutoff too; the absolute
        // rule must win
        let assessment = scorer.score("p1", 0.90, 0.10, 1.0);
        assert_eq!(assessment.state, RiskState::Event);
        assert!((assessment.score - 0.9).abs() < 1e-9);
        assert!(assessment.reason.contains("absolute threshold"));
    }

    #[test]
    fn p92_exceedance_is_high_risk() {
        let (_dir, scorer) = scorer_with_bundle();
        let assessment = scorer.score("p1", 0.75, 0.25, 1.0);
        assert_eq!(assessment.state, RiskState::HighRisk);
        assert!((assessment.score - 0.8).abs() < 1e-9);
        assert!(assessment.reason.contains("p92"));
    }

    #[test]
    fn median_spike_is_high_risk() {
        let (_dir, scorer) = scorer_with_bundle();
        // spike cutoff = 0.50 * 1.30 = 0.65; pick a ratio between the
        // cutoff and p92
        let assessment = scorer.score("p1", 0.68, 0.32, 1.0);
        assert_eq!(assessment.state, RiskState::HighRisk);
        assert!((assessment.score - 0.6).abs() < 1e-9);
        assert!(assessment.reason.contains("spike"));
    }

    #[test]
    fn low_ratio_is_safe_to_return() {
        let (_dir, scorer) = scorer_with_bundle();
        let assessment = scorer.score("p1", 0.35, 0.65, 1.0);
        assert_eq!(assessment.state, RiskState::SafeToReturn);
        assert!((assessment.score - 0.2).abs() < 1e-9);
    }

    #[test]
    fn in_band_ratio_is_normal() {
        let (_dir, scorer) = scorer_with_bundle();
        let assessment = scorer.score("p1", 0.45, 0.55, 1.0);
        assert_eq!(assessment.state, RiskState::Normal);
        assert!((assessment.score - 0.3).abs() < 1e-9);
    }

    #[test]
    fn zero_guaranteed_price_uses_neutral_ratio() {
        let (_dir, scorer) = scorer_with_bundle();
        // ratio pinned at 1.0 > absolute_high 0.85
        let assessment = scorer.score("p1", 0.05, 0.0, 0.0);
        assert_eq!(assessment.state, RiskState::Event);
    }
}
