//! Configuration for the activity aggregation pipeline.
//!
//! The defaults reproduce the overview activity panel: five analyses listed,
//! at most two graphs of three series each.

pub mod validation;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::activity::types::GraphType;
use crate::core::errors::{ActivityError, Result};
use validation::{validate_bounded_u32, validate_positive_usize};

/// Number of analyses listed under the activity graphs
pub const DEFAULT_MAX_ANALYSES: usize = 5;
/// Number of graphs drawn side by side
pub const DEFAULT_MAX_GRAPHS: usize = 2;
/// Number of series sharing one graph
pub const DEFAULT_MAX_SERIES_PER_GRAPH: usize = 3;
/// Number of metrics a custom graph may display
pub const DEFAULT_MAX_CUSTOM_METRICS: usize = 6;
/// Working hours in one day of technical debt
pub const DEFAULT_HOURS_PER_DAY: u32 = 8;

/// Main configuration for activity aggregation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityConfig {
    /// Analyses shown in the activity list
    pub max_analyses: usize,

    /// Graphs produced for the chart payload
    pub max_graphs: usize,

    /// Series packed into a single graph
    pub max_series_per_graph: usize,

    /// Metrics a custom graph may display
    pub max_custom_metrics: usize,

    /// Hours in a working day, used by the duration grammar
    pub hours_per_day: u32,

    /// Graph used when none (or an unknown one) is requested
    pub default_graph: GraphType,
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            max_analyses: DEFAULT_MAX_ANALYSES,
            max_graphs: DEFAULT_MAX_GRAPHS,
            max_series_per_graph: DEFAULT_MAX_SERIES_PER_GRAPH,
            max_custom_metrics: DEFAULT_MAX_CUSTOM_METRICS,
            hours_per_day: DEFAULT_HOURS_PER_DAY,
            default_graph: GraphType::default(),
        }
    }
}

impl ActivityConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| {
            ActivityError::io(format!("Failed to read config file: {}", path.display()), e)
        })?;

        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn to_yaml_file(&self, path: impl Into<PathBuf>) -> Result<()> {
        let path = path.into();
        let content = serde_yaml::to_string(self)?;
        std::fs::write(&path, content).map_err(|e| {
            ActivityError::io(
                format!("Failed to write config file: {}", path.display()),
                e,
            )
        })
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<()> {
        validate_positive_usize(self.max_analyses, "max_analyses")?;
        validate_positive_usize(self.max_graphs, "max_graphs")?;
        validate_positive_usize(self.max_series_per_graph, "max_series_per_graph")?;
        validate_positive_usize(self.max_custom_metrics, "max_custom_metrics")?;
        validate_bounded_u32(self.hours_per_day, 1, 24, "hours_per_day")?;
        Ok(())
    }

    /// Builder: override the number of listed analyses
    pub fn with_max_analyses(mut self, max_analyses: usize) -> Self {
        self.max_analyses = max_analyses;
        self
    }

    /// Builder: override graph capacity
    pub fn with_graph_capacity(mut self, max_graphs: usize, max_series_per_graph: usize) -> Self {
        self.max_graphs = max_graphs;
        self.max_series_per_graph = max_series_per_graph;
        self
    }
}
