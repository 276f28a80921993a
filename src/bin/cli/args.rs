//! CLI Argument Structures

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Project activity aggregation
#[derive(Parser)]
#[command(name = "activity")]
#[command(version = VERSION)]
#[command(about = "Render project activity graphs, variations and quality gate history")]
#[command(long_about = "
Aggregate a snapshot of measure history, analyses and metric definitions into
the view model behind an activity panel.

Common Usage:

  # Issues graph with the default limits
  activity render snapshot.json

  # Coverage graph with a leak period marker
  activity render snapshot.json --graph coverage --leak-period 2024-01-01

  # Custom graph
  activity render snapshot.json --graph custom --custom-metric bugs --custom-metric code_smells

  # Print and customize the default limits
  activity print-default-config > activity.yml
  activity render snapshot.json --config activity.yml
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the activity view model for a snapshot and print it as JSON
    Render(RenderArgs),

    /// Print default configuration in YAML format
    #[command(name = "print-default-config")]
    PrintDefaultConfig,

    /// Validate a configuration file
    #[command(name = "validate-config")]
    ValidateConfig(ValidateConfigArgs),

    /// List available graph types
    #[command(name = "list-graphs")]
    ListGraphs,
}

#[derive(Args)]
pub struct RenderArgs {
    /// JSON snapshot with measuresHistory, analyses and metrics
    pub snapshot: PathBuf,

    /// Graph type (issues, coverage, duplications, custom)
    #[arg(short, long)]
    pub graph: Option<String>,

    /// Start of the new code period (YYYY-MM-DD or ISO-8601 date-time)
    #[arg(long)]
    pub leak_period: Option<String>,

    /// Metric shown on the custom graph (repeatable)
    #[arg(long = "custom-metric")]
    pub custom_metrics: Vec<String>,

    /// Configuration file
    #[arg(short, long, env = "ACTIVITY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}

#[derive(Args)]
pub struct ValidateConfigArgs {
    /// Configuration file to validate
    pub config: PathBuf,
}
