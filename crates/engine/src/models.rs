//! Core data models for the decision engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Pricing tier an instance runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceMode {
    /// Interruptible low-cost tier (pool-priced)
    Discounted,
    /// Non-interruptible standard tier
    Guaranteed,
}

/// Action recommended by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendedAction {
    Stay,
    SwitchPool,
    FallbackGuaranteed,
}

/// Qualitative risk state derived from the current price ratio
///
/// Re-derived fresh on every call; there is no persisted prior state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RiskState {
    Normal,
    HighRisk,
    Event,
    SafeToReturn,
}

/// Scorer output for one price observation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub score: f64,
    pub state: RiskState,
    pub reason: String,
}

/// One discounted-pool price quote
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolQuote {
    pub pool_id: String,
    pub price: f64,
}

/// Current price observation for one instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingSnapshot {
    /// Guaranteed-tier price in currency per hour
    pub guaranteed_price: f64,
    /// Alternative-pool quotes, at most one per pool_id
    pub pools: Vec<PoolQuote>,
}

/// Per-agent tunable policy limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    pub auto_switch_enabled: bool,
    pub min_savings_percent: f64,
    pub risk_threshold: f64,
    pub max_switches_per_week: u32,
    pub min_pool_duration_hours: f64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            auto_switch_enabled: true,
            min_savings_percent: 5.0,
            risk_threshold: 0.7,
            max_switches_per_week: 10,
            min_pool_duration_hours: 2.0,
        }
    }
}

/// Current pricing-tier assignment of one instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceState {
    pub instance_id: String,
    pub current_mode: InstanceMode,
    pub current_pool_id: Option<String>,
}

/// Recommendation produced by one `decide` call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub instance_id: String,
    pub risk_score: f64,
    pub recommended_action: RecommendedAction,
    pub recommended_mode: InstanceMode,
    /// Target pool, or "n/a" when the recommendation has no pool
    pub recommended_pool_id: String,
    /// Negative when the recommendation costs money (guaranteed fallback)
    pub expected_savings_per_hour: f64,
    pub allowed: bool,
    pub reason: String,
}

/// Full input bundle for one decision, as assembled by the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionRequest {
    pub instance: InstanceState,
    pub pricing: PricingSnapshot,
    #[serde(default)]
    pub policy: PolicyConfig,
    /// Switches executed in the trailing 7 days
    #[serde(default)]
    pub recent_switch_count: u32,
    #[serde(default)]
    pub last_switch_time: Option<DateTime<Utc>>,
}
