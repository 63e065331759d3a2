//! Engine configuration

use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Scoring strategy selected at process startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineType {
    RuleBased,
    ModelBased,
    Hybrid,
}

impl EngineType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineType::RuleBased => "rule_based",
            EngineType::ModelBased => "model_based",
            EngineType::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for EngineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EngineType {
    type Err = EngineError;

    /// Rejects unknown strings so the process cannot start with an
    /// invalid engine selection.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rule_based" => Ok(EngineType::RuleBased),
            "model_based" => Ok(EngineType::ModelBased),
            "hybrid" => Ok(EngineType::Hybrid),
            other => Err(EngineError::UnknownEngineType(other.to_string())),
        }
    }
}

/// Engine settings, resolved once at construction
#[derive(Debug, Clone, Deserialize)]
pub struct EngineSettings {
    /// Scoring strategy: rule_based, model_based or hybrid
    #[serde(default = "default_engine_type")]
    pub engine_type: EngineType,

    /// Directory holding the model-artifact bundle
    #[serde(default = "default_model_dir")]
    pub model_dir: PathBuf,

    /// Region key selecting the bundle's per-region artifacts
    #[serde(default = "default_region")]
    pub region: String,
}

fn default_engine_type() -> EngineType {
    EngineType::Hybrid
}

fn default_model_dir() -> PathBuf {
    PathBuf::from("./models")
}

fn default_region() -> String {
    "ap-south-1".to_string()
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            engine_type: default_engine_type(),
            model_dir: default_model_dir(),
            region: default_region(),
        }
    }
}

impl EngineSettings {
    /// Load settings from the environment (prefix `SWOPT`)
    ///
    /// Malformed values, including an unknown engine type, are fatal here
    /// rather than at decision time.
    pub fn load() -> Result<Self, EngineError> {
        let settings = config::Config::builder()
            .add_source(config::Environment::with_prefix("SWOPT"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
