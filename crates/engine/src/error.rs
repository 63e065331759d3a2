//! Error types for the decision engine

use thiserror::Error;

/// Fatal configuration errors, surfaced before any traffic is accepted
#[derive(Debug, Error)]
pub enum EngineError {
    /// Unrecognized `engine_type` string; valid values are
    /// `rule_based`, `model_based` and `hybrid`
    #[error("unknown engine type: {0:?} (expected rule_based, model_based or hybrid)")]
    UnknownEngineType(String),

    #[error("failed to load engine settings: {0}")]
    Settings(#[from] config::ConfigError),
}

/// Failures while reading the model-artifact bundle
///
/// Never fatal and never propagated to `decide` callers: the repository
/// logs the error and reports `is_loaded() == false`.
#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("manifest has no artifacts for region {0:?}")]
    RegionNotCovered(String),

    #[error("manifest has no checksum entry for {0:?}")]
    ChecksumMissing(String),

    #[error("checksum mismatch for {path}: manifest {expected}, computed {actual}")]
    ChecksumMismatch {
        path: String,
        expected: String,
        actual: String,
    },

    #[error("artifact schema validation failed: {0}")]
    Schema(String),
}

impl ModelLoadError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }

    pub(crate) fn parse(path: &std::path::Path, source: serde_json::Error) -> Self {
        Self::Parse {
            path: path.display().to_string(),
            source,
        }
    }
}
