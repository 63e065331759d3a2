//! Switching decision engine for pricing-tier optimization
//!
//! This crate provides the core functionality for:
//! - Risk scoring of discounted-pool price observations
//! - Policy-limit enforcement (switch frequency, cooldown)
//! - Stay / switch-pool / fallback-to-guaranteed recommendations
//! - Loading of versioned statistical model bundles

pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod observability;
pub mod policy;
pub mod repository;
pub mod scorer;

pub use config::{EngineSettings, EngineType};
pub use engine::DecisionEngine;
pub use error::{EngineError, ModelLoadError};
pub use models::*;
pub use observability::{DecisionLogger, EngineMetrics};
pub use repository::{AnomalyThresholds, ModelRepository, PoolContext};
pub use scorer::{HybridScorer, ModelBasedScorer, RiskScorer, RuleBasedScorer};
