//! Observability infrastructure for the decision engine
//!
//! Provides:
//! - Prometheus metrics (decision counts by action, policy blocks,
//!   stale-pool fallbacks, decision latency, engine/bundle info)
//! - Structured decision logging with tracing

use crate::models::{Decision, RecommendedAction};
use prometheus::{
    register_gauge_vec, register_histogram, register_int_gauge, GaugeVec, Histogram, IntGauge,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Histogram buckets for decision latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.000001, 0.000005, 0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.005, 0.01,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<EngineMetricsInner> = OnceLock::new();

struct EngineMetricsInner {
    decisions_total: IntGauge,
    policy_blocks_total: IntGauge,
    fallbacks_recommended_total: IntGauge,
    switches_recommended_total: IntGauge,
    stale_pool_fallbacks_total: IntGauge,
    decision_latency_seconds: Histogram,
    engine_info: GaugeVec,
}

impl EngineMetricsInner {
    fn new() -> Self {
        Self {
            decisions_total: register_int_gauge!(
                "decision_engine_decisions_total",
                "Total number of switching decisions produced"
            )
            .expect("Failed to register decisions_total"),

            policy_blocks_total: register_int_gauge!(
                "decision_engine_policy_blocks_total",
                "Decisions blocked by a policy gate before risk scoring"
            )
            .expect("Failed to register policy_blocks_total"),

            fallbacks_recommended_total: register_int_gauge!(
                "decision_engine_fallbacks_recommended_total",
                "Decisions recommending fallback to the guaranteed tier"
            )
            .expect("Failed to register fallbacks_recommended_total"),

            switches_recommended_total: register_int_gauge!(
                "decision_engine_switches_recommended_total",
                "Decisions recommending a switch to a cheaper pool"
            )
            .expect("Failed to register switches_recommended_total"),

            stale_pool_fallbacks_total: register_int_gauge!(
                "decision_engine_stale_pool_fallbacks_total",
                "Decisions where the recorded pool had no quote and the first quote was adopted"
            )
            .expect("Failed to register stale_pool_fallbacks_total"),

            decision_latency_seconds: register_histogram!(
                "decision_engine_decision_latency_seconds",
                "Time spent computing one switching decision",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register decision_latency_seconds"),

            engine_info: register_gauge_vec!(
                "decision_engine_info",
                "Information about the running engine and loaded model bundle",
                &["engine_type", "scorer", "model_version"]
            )
            .expect("Failed to register engine_info"),
        }
    }
}

/// Engine metrics for Prometheus exposition
///
/// Lightweight handle to the global metrics instance; clones share the
/// same underlying metrics.
#[derive(Clone)]
pub struct EngineMetrics {
    _private: (),
}

impl Default for EngineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(EngineMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &EngineMetricsInner {
        GLOBAL_METRICS.get().expect("Metrics not initialized")
    }

    /// Record one produced decision and its latency
    pub fn observe_decision(&self, decision: &Decision, latency_secs: f64) {
        let inner = self.inner();
        inner.decisions_total.inc();
        inner.decision_latency_seconds.observe(latency_secs);

        match decision.recommended_action {
            RecommendedAction::FallbackGuaranteed => inner.fallbacks_recommended_total.inc(),
            RecommendedAction::SwitchPool => inner.switches_recommended_total.inc(),
            RecommendedAction::Stay => {}
        }
    }

    /// Count one decision blocked by a policy gate
    pub fn inc_policy_blocks(&self) {
        self.inner().policy_blocks_total.inc();
    }

    /// Count one stale-pool synthetic price adoption
    pub fn inc_stale_pool_fallbacks(&self) {
        self.inner().stale_pool_fallbacks_total.inc();
    }

    /// Publish engine/bundle identity
    pub fn set_engine_info(&self, engine_type: &str, scorer: &str, model_version: &str) {
        self.inner().engine_info.reset();
        self.inner()
            .engine_info
            .with_label_values(&[engine_type, scorer, model_version])
            .set(1.0);
    }
}

/// Structured logger for decision events
///
/// Provides consistent JSON-formatted logging for decisions, policy
/// blocks and model lifecycle events, keyed by region.
#[derive(Clone)]
pub struct DecisionLogger {
    region: String,
}

impl DecisionLogger {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
        }
    }

    /// Log a produced decision
    pub fn log_decision(&self, decision: &Decision, scorer: &str) {
        info!(
            event = "decision_made",
            region = %self.region,
            instance_id = %decision.instance_id,
            scorer = %scorer,
            risk_score = decision.risk_score,
            action = ?decision.recommended_action,
            pool_id = %decision.recommended_pool_id,
            expected_savings_per_hour = decision.expected_savings_per_hour,
            allowed = decision.allowed,
            reason = %decision.reason,
            "Switching decision produced"
        );
    }

    /// Log a decision blocked by a policy gate
    pub fn log_policy_block(&self, instance_id: &str, gate: &str, reason: &str) {
        info!(
            event = "policy_block",
            region = %self.region,
            instance_id = %instance_id,
            gate = %gate,
            reason = %reason,
            "Decision blocked by policy gate"
        );
    }

    /// Log a stale-pool synthetic price adoption
    ///
    /// Logged distinctly because it can mask a stale pool assignment
    /// upstream.
    pub fn log_stale_pool_fallback(
        &self,
        instance_id: &str,
        recorded_pool: Option<&str>,
        adopted_pool: &str,
    ) {
        warn!(
            event = "stale_pool_fallback",
            region = %self.region,
            instance_id = %instance_id,
            recorded_pool = recorded_pool.unwrap_or("none"),
            adopted_pool = %adopted_pool,
            "Recorded pool has no quote, adopting first available quote"
        );
    }

    /// Log engine startup
    pub fn log_engine_ready(&self, engine_type: &str, scorer: &str, model_version: &str) {
        info!(
            event = "engine_ready",
            region = %self.region,
            engine_type = %engine_type,
            scorer = %scorer,
            model_version = %model_version,
            "Decision engine ready"
        );
    }
}
