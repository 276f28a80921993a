//! Configuration management commands.

use owo_colors::OwoColorize;

use activity_graphs::{ActivityConfig, GraphType};

use crate::cli::args::ValidateConfigArgs;

/// Print default configuration in YAML format
pub fn print_default_config() -> anyhow::Result<()> {
    println!("# Default activity configuration");
    println!("# Usage: activity render snapshot.json --config your-config.yml");

    let config = ActivityConfig::default();
    let yaml_output = serde_yaml::to_string(&config)?;
    print!("{}", yaml_output);

    Ok(())
}

/// Validate a configuration file
pub fn validate_config(args: ValidateConfigArgs) -> anyhow::Result<()> {
    let config = ActivityConfig::from_yaml_file(&args.config).map_err(|e| {
        anyhow::anyhow!(
            "Invalid configuration {}: {}",
            args.config.display(),
            e
        )
    })?;

    println!(
        "{} {}",
        "✅ Configuration is valid:".bright_green().bold(),
        args.config.display().to_string().cyan()
    );
    println!("   max_analyses:         {}", config.max_analyses);
    println!("   max_graphs:           {}", config.max_graphs);
    println!("   max_series_per_graph: {}", config.max_series_per_graph);
    println!("   default_graph:        {}", config.default_graph);

    Ok(())
}

/// List available graph types
pub fn list_graphs() {
    for graph in GraphType::all(true) {
        let metrics = graph.default_metrics();
        if metrics.is_empty() {
            println!("{:<14} {}", graph, "(user-selected metrics)".dimmed());
        } else {
            println!("{:<14} {}", graph, metrics.join(", "));
        }
    }
}
