//! Model-artifact bundle loading
//!
//! Loads the versioned statistical baselines (per-pool percentile context,
//! anomaly thresholds, per-pool price trends) produced by the offline
//! training pipeline. The bundle is read once at startup and never mutated;
//! a failed load is logged and reported via `is_loaded() == false` instead
//! of stopping the process.

use crate::error::ModelLoadError;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Engine-wide anomaly-detection thresholds, shared by all pools
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnomalyThresholds {
    /// Relative increase over the pool median that counts as a spike
    pub ratio_spike_threshold: f64,
    /// Price ratio treated as a capacity event regardless of pool history
    pub ratio_absolute_high: f64,
    /// Price ratio below which returning to the discounted tier is safe
    pub ratio_safe_return: f64,
}

/// Per-pool percentile baseline from the training data
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PoolContext {
    pub ratio_p50: f64,
    pub ratio_p92: f64,
}

/// Per-pool linear price-ratio trend
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PriceTrend {
    pub slope: f64,
    pub intercept: f64,
}

/// Bundle manifest: artifact file names per region plus their checksums
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Manifest {
    version: String,
    #[serde(default)]
    generated_at: Option<chrono::DateTime<chrono::Utc>>,
    models: HashMap<String, RegionArtifacts>,
    checksums: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RegionArtifacts {
    pool_context: String,
    price_model: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PoolContextFile {
    config: AnomalyThresholds,
    pools: HashMap<String, PoolContext>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PriceModelFile {
    models: HashMap<String, PriceTrend>,
}

#[derive(Debug)]
struct LoadedBundle {
    version: String,
    generated_at: Option<chrono::DateTime<chrono::Utc>>,
    thresholds: AnomalyThresholds,
    contexts: HashMap<String, PoolContext>,
    price_trends: HashMap<String, PriceTrend>,
}

/// Read-only holder of the loaded statistical baselines
///
/// Absence of a context entry for a pool is a valid, expected condition
/// (cold-start pool), distinct from the bundle not having loaded at all.
#[derive(Debug)]
pub struct ModelRepository {
    region: String,
    inner: Option<LoadedBundle>,
}

impl ModelRepository {
    /// Attempt to load the bundle from `model_dir` for `region`
    ///
    /// Failure is recovered locally: the cause is logged once and the
    /// repository reports `is_loaded() == false`.
    pub fn load(model_dir: &Path, region: &str) -> Self {
        match read_bundle(model_dir, region) {
            Ok(bundle) => {
                info!(
                    event = "model_bundle_loaded",
                    region = %region,
                    version = %bundle.version,
                    pools = bundle.contexts.len(),
                    price_models = bundle.price_trends.len(),
                    "Model bundle loaded"
                );
                Self {
                    region: region.to_string(),
                    inner: Some(bundle),
                }
            }
            Err(e) => {
                warn!(
                    event = "model_bundle_load_failed",
                    region = %region,
                    dir = %model_dir.display(),
                    error = %e,
                    "Failed to load model bundle"
                );
                Self {
                    region: region.to_string(),
                    inner: None,
                }
            }
        }
    }

    /// An empty repository, for engines that never use model baselines
    pub fn unloaded(region: &str) -> Self {
        Self {
            region: region.to_string(),
            inner: None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.inner.is_some()
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Bundle version, when loaded
    pub fn version(&self) -> Option<&str> {
        self.inner.as_ref().map(|b| b.version.as_str())
    }

    /// Training timestamp from the manifest, when present
    pub fn generated_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.inner.as_ref().and_then(|b| b.generated_at)
    }

    /// Percentile baseline for one pool; `None` for cold-start pools
    pub fn context(&self, pool_id: &str) -> Option<&PoolContext> {
        self.inner.as_ref()?.contexts.get(pool_id)
    }

    pub fn thresholds(&self) -> Option<&AnomalyThresholds> {
        self.inner.as_ref().map(|b| &b.thresholds)
    }

    pub fn pool_count(&self) -> usize {
        self.inner.as_ref().map(|b| b.contexts.len()).unwrap_or(0)
    }

    /// Pool ids covered by the loaded context, sorted for stable output
    pub fn pool_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .inner
            .as_ref()
            .map(|b| b.contexts.keys().cloned().collect())
            .unwrap_or_default();
        ids.sort();
        ids
    }

    pub fn price_model_count(&self) -> usize {
        self.inner.as_ref().map(|b| b.price_trends.len()).unwrap_or(0)
    }

    /// Projected price ratio for a pool `hours_ahead` from the trend fit
    ///
    /// Not part of risk scoring; surfaced on status views.
    pub fn expected_ratio(&self, pool_id: &str, hours_ahead: f64) -> Option<f64> {
        let trend = self.inner.as_ref()?.price_trends.get(pool_id)?;
        Some(trend.intercept + trend.slope * hours_ahead)
    }
}

fn read_bundle(model_dir: &Path, region: &str) -> Result<LoadedBundle, ModelLoadError> {
    let manifest_path = model_dir.join("manifest.json");
    let manifest: Manifest = read_json(&manifest_path)?;

    let artifacts = manifest
        .models
        .get(region)
        .ok_or_else(|| ModelLoadError::RegionNotCovered(region.to_string()))?;

    let context_path = model_dir.join(&artifacts.pool_context);
    let price_path = model_dir.join(&artifacts.price_model);

    verify_checksum(&manifest, &artifacts.pool_context, &context_path)?;
    verify_checksum(&manifest, &artifacts.price_model, &price_path)?;

    let context_file: PoolContextFile = read_json(&context_path)?;
    let price_file: PriceModelFile = read_json(&price_path)?;

    validate_thresholds(&context_file.config)?;
    validate_contexts(&context_file.pools)?;

    Ok(LoadedBundle {
        version: manifest.version,
        generated_at: manifest.generated_at,
        thresholds: context_file.config,
        contexts: context_file.pools,
        price_trends: price_file.models,
    })
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ModelLoadError> {
    let raw = fs::read_to_string(path).map_err(|e| ModelLoadError::io(path, e))?;
    serde_json::from_str(&raw).map_err(|e| ModelLoadError::parse(path, e))
}

fn verify_checksum(manifest: &Manifest, name: &str, path: &Path) -> Result<(), ModelLoadError> {
    let expected = manifest
        .checksums
        .get(name)
        .ok_or_else(|| ModelLoadError::ChecksumMissing(name.to_string()))?;

    let data = fs::read(path).map_err(|e| ModelLoadError::io(path, e))?;
    let actual = compute_checksum(&data);

    if &actual != expected {
        return Err(ModelLoadError::ChecksumMismatch {
            path: path.display().to_string(),
            expected: expected.clone(),
            actual,
        });
    }

    Ok(())
}

fn validate_thresholds(thresholds: &AnomalyThresholds) -> Result<(), ModelLoadError> {
    for (name, value) in [
        ("ratio_spike_threshold", thresholds.ratio_spike_threshold),
        ("ratio_absolute_high", thresholds.ratio_absolute_high),
        ("ratio_safe_return", thresholds.ratio_safe_return),
    ] {
        if !value.is_finite() || value <= 0.0 {
            return Err(ModelLoadError::Schema(format!(
                "{} must be finite and positive, got {}",
                name, value
            )));
        }
    }
    Ok(())
}

fn validate_contexts(pools: &HashMap<String, PoolContext>) -> Result<(), ModelLoadError> {
    for (pool_id, ctx) in pools {
        if !ctx.ratio_p50.is_finite() || ctx.ratio_p50 <= 0.0 {
            return Err(ModelLoadError::Schema(format!(
                "pool {}: ratio_p50 must be finite and positive, got {}",
                pool_id, ctx.ratio_p50
            )));
        }
        if !ctx.ratio_p92.is_finite() || ctx.ratio_p92 < ctx.ratio_p50 {
            return Err(ModelLoadError::Schema(format!(
                "pool {}: ratio_p92 must be finite and >= ratio_p50, got {}",
                pool_id, ctx.ratio_p92
            )));
        }
    }
    Ok(())
}

/// Compute SHA256 checksum of data
pub fn compute_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
