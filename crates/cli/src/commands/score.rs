//! Score a single pool observation

use crate::output::{color_risk, color_state, OutputFormat};
use anyhow::Result;
use decision_engine::{DecisionEngine, EngineSettings};
use tabled::{settings::Style, Table, Tabled};

/// Row for the risk assessment table
#[derive(Tabled)]
struct ScoreRow {
    #[tabled(rename = "Pool")]
    pool: String,
    #[tabled(rename = "Ratio")]
    ratio: String,
    #[tabled(rename = "Risk")]
    risk: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Scorer")]
    scorer: String,
}

pub fn run(
    settings: EngineSettings,
    pool_id: &str,
    price: f64,
    guaranteed: f64,
    format: OutputFormat,
) -> Result<()> {
    let engine = DecisionEngine::new(settings);
    let assessment = engine.score(pool_id, price, guaranteed);

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&assessment)?);
        }
        OutputFormat::Table => {
            let ratio = if guaranteed > 0.0 { price / guaranteed } else { 1.0 };
            let row = ScoreRow {
                pool: pool_id.to_string(),
                ratio: format!("{:.3}", ratio),
                risk: color_risk(assessment.score),
                state: color_state(assessment.state),
                scorer: engine.scorer_name().to_string(),
            };
            let table = Table::new([row]).with(Style::rounded()).to_string();
            println!("{}", table);
            println!("Reason: {}", assessment.reason);
        }
    }
    Ok(())
}
