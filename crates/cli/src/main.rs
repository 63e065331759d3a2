//! Switch Optimizer CLI
//!
//! A command-line tool for evaluating switching decisions offline,
//! scoring individual pool observations and inspecting the model bundle.

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{decide, models, score};
use decision_engine::EngineSettings;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Switch Optimizer CLI
#[derive(Parser)]
#[command(name = "swopt")]
#[command(author, version, about = "CLI for the switching decision engine", long_about = None)]
pub struct Cli {
    /// Scoring strategy: rule_based, model_based or hybrid
    #[arg(long, env = "SWOPT_ENGINE_TYPE", default_value = "hybrid")]
    pub engine_type: String,

    /// Directory holding the model-artifact bundle
    #[arg(long, env = "SWOPT_MODEL_DIR", default_value = "./models")]
    pub model_dir: PathBuf,

    /// Region key selecting the bundle's per-region artifacts
    #[arg(long, env = "SWOPT_REGION", default_value = "ap-south-1")]
    pub region: String,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Evaluate a switching decision from a JSON request file
    Decide {
        /// Path to the decision request (instance, pricing, policy,
        /// switch history)
        #[arg(long, short)]
        request: PathBuf,
    },

    /// Score a single pool observation without the policy gates
    Score {
        /// Pool identifier
        #[arg(long)]
        pool_id: String,

        /// Current discounted price (currency per hour)
        #[arg(long)]
        price: f64,

        /// Guaranteed-tier price (currency per hour)
        #[arg(long)]
        guaranteed: f64,
    },

    /// Model bundle commands
    #[command(subcommand)]
    Models(ModelsCommands),
}

#[derive(Subcommand)]
pub enum ModelsCommands {
    /// Show bundle status and per-pool baselines
    Status,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "info" } else { "warn" };
    // Keep stdout clean for table/JSON output
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let settings = EngineSettings {
        engine_type: cli.engine_type.parse()?,
        model_dir: cli.model_dir,
        region: cli.region,
    };

    match cli.command {
        Commands::Decide { request } => {
            decide::run(settings, &request, cli.format)?;
        }
        Commands::Score {
            pool_id,
            price,
            guaranteed,
        } => {
            score::run(settings, &pool_id, price, guaranteed, cli.format)?;
        }
        Commands::Models(models_cmd) => match models_cmd {
            ModelsCommands::Status => {
                models::status(&settings, cli.format)?;
            }
        },
    }

    Ok(())
}
