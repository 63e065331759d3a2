//! Evaluate a switching decision from a request file

use crate::output::{color_action, color_risk, format_hourly, OutputFormat};
use anyhow::{Context, Result};
use decision_engine::{Decision, DecisionEngine, DecisionRequest, EngineSettings};
use std::fs;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

/// Row for the decision table
#[derive(Tabled)]
struct DecisionRow {
    #[tabled(rename = "Instance")]
    instance: String,
    #[tabled(rename = "Risk")]
    risk: String,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Mode")]
    mode: String,
    #[tabled(rename = "Pool")]
    pool: String,
    #[tabled(rename = "Savings")]
    savings: String,
    #[tabled(rename = "Allowed")]
    allowed: String,
}

pub fn run(settings: EngineSettings, request_path: &Path, format: OutputFormat) -> Result<()> {
    let raw = fs::read_to_string(request_path)
        .with_context(|| format!("Failed to read request file {}", request_path.display()))?;
    let request: DecisionRequest = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse request file {}", request_path.display()))?;

    let engine = DecisionEngine::new(settings);
    let decision = engine.decide_request(&request);

    print_decision(&decision, format)
}

fn print_decision(decision: &Decision, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(decision)?);
        }
        OutputFormat::Table => {
            let row = DecisionRow {
                instance: decision.instance_id.clone(),
                risk: color_risk(decision.risk_score),
                action: color_action(decision.recommended_action),
                mode: format!("{:?}", decision.recommended_mode).to_lowercase(),
                pool: decision.recommended_pool_id.clone(),
                savings: format_hourly(decision.expected_savings_per_hour),
                allowed: decision.allowed.to_string(),
            };
            let table = Table::new([row]).with(Style::rounded()).to_string();
            println!("{}", table);
            println!("Reason: {}", decision.reason);
        }
    }
    Ok(())
}
