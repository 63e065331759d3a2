//! Model bundle inspection

use crate::output::{print_success, print_warning, OutputFormat};
use anyhow::Result;
use decision_engine::{EngineSettings, ModelRepository};
use tabled::{settings::Style, Table, Tabled};

/// Row for the per-pool baseline table
#[derive(Tabled)]
struct PoolRow {
    #[tabled(rename = "Pool")]
    pool: String,
    #[tabled(rename = "p50")]
    p50: String,
    #[tabled(rename = "p92")]
    p92: String,
    #[tabled(rename = "Trend (24h)")]
    trend: String,
}

pub fn status(settings: &EngineSettings, format: OutputFormat) -> Result<()> {
    let repository = ModelRepository::load(&settings.model_dir, &settings.region);

    if !repository.is_loaded() {
        match format {
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "loaded": false,
                        "region": &settings.region,
                        "model_dir": settings.model_dir.display().to_string(),
                    }))?
                );
            }
            OutputFormat::Table => {
                print_warning(&format!(
                    "No model bundle loaded from {} for region {} (engine degrades to rules)",
                    settings.model_dir.display(),
                    settings.region
                ));
            }
        }
        return Ok(());
    }

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "loaded": true,
                    "region": &settings.region,
                    "version": repository.version(),
                    "generated_at": repository.generated_at(),
                    "pools": repository.pool_count(),
                    "price_models": repository.price_model_count(),
                }))?
            );
        }
        OutputFormat::Table => {
            print_success(&format!(
                "Bundle {} for region {}: {} pools, {} price models",
                repository.version().unwrap_or("unknown"),
                settings.region,
                repository.pool_count(),
                repository.price_model_count()
            ));
            if let Some(generated_at) = repository.generated_at() {
                println!("Trained at: {}", generated_at.to_rfc3339());
            }

            let mut rows: Vec<PoolRow> = Vec::new();
            if let Some(thresholds) = repository.thresholds() {
                println!(
                    "Thresholds: spike +{:.0}% over p50, absolute high {}, safe return {}",
                    thresholds.ratio_spike_threshold * 100.0,
                    thresholds.ratio_absolute_high,
                    thresholds.ratio_safe_return
                );
            }
            for pool_id in repository.pool_ids() {
                if let Some(ctx) = repository.context(&pool_id) {
                    rows.push(PoolRow {
                        pool: pool_id.clone(),
                        p50: format!("{:.3}", ctx.ratio_p50),
                        p92: format!("{:.3}", ctx.ratio_p92),
                        trend: repository
                            .expected_ratio(&pool_id, 24.0)
                            .map(|r| format!("{:.3}", r))
                            .unwrap_or_else(|| "-".to_string()),
                    });
                }
            }
            if !rows.is_empty() {
                let table = Table::new(rows).with(Style::rounded()).to_string();
                println!("{}", table);
            }
        }
    }

    Ok(())
}
