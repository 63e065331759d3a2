//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;
use decision_engine::{RecommendedAction, RiskState};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Format currency per hour
pub fn format_hourly(amount: f64) -> String {
    format!("${:.4}/h", amount)
}

/// Color a risk score based on value
pub fn color_risk(risk: f64) -> String {
    let formatted = format!("{:.2}", risk);
    if risk >= 0.7 {
        formatted.red().to_string()
    } else if risk >= 0.4 {
        formatted.yellow().to_string()
    } else {
        formatted.green().to_string()
    }
}

/// Color a recommended action
pub fn color_action(action: RecommendedAction) -> String {
    match action {
        RecommendedAction::Stay => "stay".to_string(),
        RecommendedAction::SwitchPool => "switch_pool".blue().to_string(),
        RecommendedAction::FallbackGuaranteed => "fallback_guaranteed".red().to_string(),
    }
}

/// Color a risk state
pub fn color_state(state: RiskState) -> String {
    match state {
        RiskState::Normal => "normal".green().to_string(),
        RiskState::SafeToReturn => "safe-to-return".green().to_string(),
        RiskState::HighRisk => "high-risk".yellow().to_string(),
        RiskState::Event => "event".red().to_string(),
    }
}
