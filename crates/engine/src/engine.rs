//! Decision engine facade
//!
//! Owns one scorer/policy pairing for the process lifetime. The scorer is
//! selected and loaded exactly once at construction; after that the engine
//! holds no mutable state, so it can be shared across threads and called
//! concurrently without locking.

use crate::config::{EngineSettings, EngineType};
use crate::models::{Decision, DecisionRequest, InstanceState, PolicyConfig, PricingSnapshot};
use crate::observability::{DecisionLogger, EngineMetrics};
use crate::policy::PolicyEngine;
use crate::repository::ModelRepository;
use crate::scorer::{HybridScorer, ModelBasedScorer, RiskScorer, RuleBasedScorer};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Instant;

/// Facade over scorer selection and policy orchestration
///
/// Constructed once by the embedding process (no hidden globals) and
/// passed by reference to request handlers.
pub struct DecisionEngine {
    settings: EngineSettings,
    scorer: Arc<dyn RiskScorer>,
    repository: Option<Arc<ModelRepository>>,
    policy: PolicyEngine,
    logger: DecisionLogger,
    metrics: EngineMetrics,
}

impl DecisionEngine {
    /// Build the engine for the configured type, loading the model
    /// bundle where the type calls for one
    ///
    /// Unknown engine-type strings are rejected earlier, when
    /// `EngineSettings` is parsed, so construction itself cannot fail.
    pub fn new(settings: EngineSettings) -> Self {
        let (scorer, repository): (Arc<dyn RiskScorer>, Option<Arc<ModelRepository>>) =
            match settings.engine_type {
                EngineType::RuleBased => (Arc::new(RuleBasedScorer::new()), None),
                EngineType::ModelBased => {
                    let repo =
                        Arc::new(ModelRepository::load(&settings.model_dir, &settings.region));
                    (
                        Arc::new(ModelBasedScorer::with_repository(Arc::clone(&repo))),
                        Some(repo),
                    )
                }
                EngineType::Hybrid => {
                    let repo =
                        Arc::new(ModelRepository::load(&settings.model_dir, &settings.region));
                    (
                        Arc::new(HybridScorer::with_repository(Arc::clone(&repo))),
                        Some(repo),
                    )
                }
            };

        let logger = DecisionLogger::new(settings.region.clone());
        let metrics = EngineMetrics::new();
        let policy = PolicyEngine::new(Arc::clone(&scorer), logger.clone(), metrics.clone());

        let engine = Self {
            settings,
            scorer,
            repository,
            policy,
            logger,
            metrics,
        };

        let version = engine.model_version().unwrap_or("not_loaded").to_string();
        engine.metrics.set_engine_info(
            engine.settings.engine_type.as_str(),
            engine.scorer.name(),
            &version,
        );
        engine.logger.log_engine_ready(
            engine.settings.engine_type.as_str(),
            engine.scorer.name(),
            &version,
        );

        engine
    }

    /// Produce one switching decision
    pub fn decide(
        &self,
        instance: &InstanceState,
        pricing: &PricingSnapshot,
        policy: &PolicyConfig,
        recent_switch_count: u32,
        last_switch_time: Option<DateTime<Utc>>,
    ) -> Decision {
        let start = Instant::now();
        let decision = self.policy.decide(
            instance,
            pricing,
            policy,
            recent_switch_count,
            last_switch_time,
        );

        self.metrics
            .observe_decision(&decision, start.elapsed().as_secs_f64());
        self.logger.log_decision(&decision, self.scorer.name());

        decision
    }

    /// Score a single pool observation without the policy gates
    pub fn score(
        &self,
        pool_id: &str,
        current_price: f64,
        guaranteed_price: f64,
    ) -> crate::models::RiskAssessment {
        let current_discount_ratio = if guaranteed_price > 0.0 {
            1.0 - current_price / guaranteed_price
        } else {
            0.0
        };
        self.scorer
            .score(pool_id, current_price, current_discount_ratio, guaranteed_price)
    }

    /// Convenience entry point for a caller-assembled request bundle
    pub fn decide_request(&self, request: &DecisionRequest) -> Decision {
        self.decide(
            &request.instance,
            &request.pricing,
            &request.policy,
            request.recent_switch_count,
            request.last_switch_time,
        )
    }

    /// Whether the underlying scorer's baselines loaded
    pub fn is_loaded(&self) -> bool {
        self.scorer.is_loaded()
    }

    pub fn engine_type(&self) -> EngineType {
        self.settings.engine_type
    }

    pub fn region(&self) -> &str {
        &self.settings.region
    }

    /// Name of the active scoring strategy (distinguishes a degraded
    /// hybrid from one running on the model)
    pub fn scorer_name(&self) -> &'static str {
        self.scorer.name()
    }

    /// The model repository, for engine types that attempt a load
    pub fn repository(&self) -> Option<&ModelRepository> {
        self.repository.as_deref()
    }

    /// Version of the loaded model bundle, if any
    pub fn model_version(&self) -> Option<&str> {
        self.repository().and_then(|r| r.version())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn settings(engine_type: EngineType) -> EngineSettings {
        EngineSettings {
            engine_type,
            model_dir: PathBuf::from("/nonexistent"),
            region: "ap-south-1".to_string(),
        }
    }

    #[test]
    fn rule_based_engine_has_no_repository() {
        let engine = DecisionEngine::new(settings(EngineType::RuleBased));
        assert!(engine.is_loaded());
        assert!(engine.repository().is_none());
        assert_eq!(engine.model_version(), None);
        assert_eq!(engine.scorer_name(), "rule_based");
    }

    #[test]
    fn model_based_engine_reports_failed_load() {
        let engine = DecisionEngine::new(settings(EngineType::ModelBased));
        assert!(!engine.is_loaded());
        assert!(engine.repository().is_some());
        assert_eq!(engine.model_version(), None);
    }

    #[test]
    fn hybrid_engine_degrades_but_stays_operational() {
        let engine = DecisionEngine::new(settings(EngineType::Hybrid));
        assert!(engine.is_loaded());
        assert_eq!(engine.scorer_name(), "hybrid(rules)");
    }
}
