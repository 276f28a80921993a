//! View model rendering command.

use anyhow::Context;
use tracing::info;

use activity_graphs::core::dates::parse_date;
use activity_graphs::{
    ActivityAggregator, ActivityConfig, ActivityQuery, ActivitySnapshot, GraphType, MetricCatalog,
};

use crate::cli::args::RenderArgs;

/// Build the view model for a snapshot and print it as JSON
pub fn render_command(args: RenderArgs) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => ActivityConfig::from_yaml_file(path)
            .with_context(|| format!("Failed to load configuration {}", path.display()))?,
        None => ActivityConfig::default(),
    };

    let mut snapshot = ActivitySnapshot::from_json_file(&args.snapshot)
        .with_context(|| format!("Failed to load snapshot {}", args.snapshot.display()))?;
    if snapshot.metrics.is_empty() {
        info!("Snapshot carries no metric definitions, using the built-in catalog");
        snapshot.metrics = MetricCatalog::builtin().metrics().cloned().collect();
    }

    let graph = args
        .graph
        .as_deref()
        .map(|name| GraphType::parse_or_default(name, config.default_graph))
        .unwrap_or(config.default_graph);

    let leak_period_date = args
        .leak_period
        .as_deref()
        .map(parse_date)
        .transpose()
        .context("Invalid --leak-period")?;

    let query = ActivityQuery {
        graph,
        custom_metrics: args.custom_metrics,
        leak_period_date,
    };

    let model = ActivityAggregator::new(config).build_from_snapshot(&snapshot, &query);

    let output = if args.pretty {
        serde_json::to_string_pretty(&model)?
    } else {
        serde_json::to_string(&model)?
    };
    println!("{output}");

    Ok(())
}
