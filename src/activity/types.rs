//! Input records consumed by the activity pipeline.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use crate::core::dates::parse_date;
use crate::core::errors::{ActivityError, Result};
use crate::metrics::catalog::{keys, Metric};

/// One recorded value of a metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryItem {
    /// Analysis date as reported by the server
    pub date: String,
    /// Raw value; absent when the metric was not computed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl HistoryItem {
    /// Create an item carrying a value.
    pub fn new(date: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            value: Some(value.into()),
        }
    }

    /// Create an item without a value.
    pub fn empty(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            value: None,
        }
    }
}

/// Chronological values of a single metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasureHistory {
    /// Metric key
    #[serde(alias = "metric")]
    pub metric_key: String,
    /// Values, oldest first
    #[serde(default)]
    pub history: Vec<HistoryItem>,
}

impl MeasureHistory {
    /// Create a history for a metric.
    pub fn new(metric_key: impl Into<String>, history: Vec<HistoryItem>) -> Self {
        Self {
            metric_key: metric_key.into(),
            history,
        }
    }
}

/// Category of an analysis event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventCategory {
    /// Project version tag
    Version,
    /// Quality gate status change
    QualityGate,
    /// Quality profile change
    QualityProfile,
    /// Change in an external definition
    DefinitionChange,
    /// User defined or unrecognized events
    #[serde(other)]
    Other,
}

/// Event attached to an analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisEvent {
    /// Category
    pub category: EventCategory,
    /// Event label
    pub name: String,
    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One completed scan of the project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    /// Unique analysis key
    pub key: String,
    /// Analysis date as reported by the server
    pub date: String,
    /// Events attached to the analysis
    #[serde(default)]
    pub events: Vec<AnalysisEvent>,
    /// Build identifier supplied by the scanner
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_string: Option<String>,
}

impl Analysis {
    /// Create an analysis without events.
    pub fn new(key: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            date: date.into(),
            events: Vec::new(),
            build_string: None,
        }
    }

    /// Builder: attach an event.
    pub fn with_event(mut self, category: EventCategory, name: impl Into<String>) -> Self {
        self.events.push(AnalysisEvent {
            category,
            name: name.into(),
            description: None,
        });
        self
    }

    /// Parsed analysis date.
    pub fn parsed_date(&self) -> Result<DateTime<Utc>> {
        parse_date(&self.date)
    }

    /// Version tag of this analysis, if one was recorded.
    pub fn version(&self) -> Option<&str> {
        self.events
            .iter()
            .find(|e| e.category == EventCategory::Version)
            .map(|e| e.name.as_str())
    }
}

/// Predefined chart layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GraphType {
    /// Issue counts
    #[default]
    Issues,
    /// Coverage
    Coverage,
    /// Duplications
    Duplications,
    /// Caller-selected metrics
    Custom,
}

impl GraphType {
    const BUILT_IN: [GraphType; 3] = [
        GraphType::Issues,
        GraphType::Coverage,
        GraphType::Duplications,
    ];

    /// Selectable graph types; `custom` only when the caller supports it.
    pub fn all(include_custom: bool) -> Vec<GraphType> {
        let mut types = Self::BUILT_IN.to_vec();
        if include_custom {
            types.push(GraphType::Custom);
        }
        types
    }

    /// Whether the graph displays caller-selected metrics.
    pub fn is_custom(self) -> bool {
        self == GraphType::Custom
    }

    /// Parse a graph name, falling back to `default` on unknown input.
    pub fn parse_or_default(input: &str, default: GraphType) -> GraphType {
        match input.parse() {
            Ok(graph) => graph,
            Err(err) => {
                warn!(graph = input, fallback = %default, "{err}");
                default
            }
        }
    }

    /// Metrics drawn for a built-in graph.
    pub fn default_metrics(self) -> &'static [&'static str] {
        match self {
            GraphType::Issues => &[keys::VIOLATIONS],
            GraphType::Coverage => &[keys::LINES_TO_COVER, keys::UNCOVERED_LINES],
            GraphType::Duplications => &[keys::NCLOC, keys::DUPLICATED_LINES],
            GraphType::Custom => &[],
        }
    }

    /// Companion metrics fetched alongside the drawn ones.
    pub fn companion_metrics(self) -> &'static [&'static str] {
        match self {
            GraphType::Issues => &[
                keys::RELIABILITY_RATING,
                keys::SECURITY_RATING,
                keys::SQALE_RATING,
            ],
            GraphType::Coverage => &[keys::COVERAGE],
            GraphType::Duplications => &[keys::DUPLICATED_LINES_DENSITY],
            GraphType::Custom => &[],
        }
    }
}

impl FromStr for GraphType {
    type Err = ActivityError;

    fn from_str(input: &str) -> Result<Self> {
        match input {
            "issues" => Ok(GraphType::Issues),
            "coverage" => Ok(GraphType::Coverage),
            "duplications" => Ok(GraphType::Duplications),
            "custom" => Ok(GraphType::Custom),
            _ => Err(ActivityError::configuration_field(
                format!("Unknown graph type '{input}'"),
                "graph",
            )),
        }
    }
}

impl fmt::Display for GraphType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GraphType::Issues => "issues",
            GraphType::Coverage => "coverage",
            GraphType::Duplications => "duplications",
            GraphType::Custom => "custom",
        };
        f.pad(name)
    }
}

/// Metric keys drawn for a graph.
///
/// Built-in graphs draw a fixed list; the custom graph draws the caller's
/// selection, capped at `max_custom_metrics`.
pub fn displayed_history_metrics(
    graph: GraphType,
    custom_metrics: &[String],
    max_custom_metrics: usize,
) -> Vec<String> {
    if graph.is_custom() {
        custom_metrics
            .iter()
            .take(max_custom_metrics)
            .cloned()
            .collect()
    } else {
        graph.default_metrics().iter().map(|k| (*k).to_string()).collect()
    }
}

/// Metric keys whose history must be fetched to render a graph.
pub fn history_metrics(
    graph: GraphType,
    custom_metrics: &[String],
    max_custom_metrics: usize,
) -> Vec<String> {
    let mut metrics = displayed_history_metrics(graph, custom_metrics, max_custom_metrics);
    metrics.extend(graph.companion_metrics().iter().map(|k| (*k).to_string()));
    metrics
}

/// A consistent fetch result handed to the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySnapshot {
    /// Measure history per metric
    #[serde(default)]
    pub measures_history: Vec<MeasureHistory>,
    /// Analyses, most recent first
    #[serde(default)]
    pub analyses: Vec<Analysis>,
    /// Metric definitions the pipeline can type
    #[serde(default, deserialize_with = "deserialize_known_metrics")]
    pub metrics: Vec<Metric>,
}

/// Metric definitions, skipping entries with an unsupported type or direction.
fn deserialize_known_metrics<'de, D>(deserializer: D) -> std::result::Result<Vec<Metric>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|value| {
            let key = value
                .get("key")
                .and_then(serde_json::Value::as_str)
                .unwrap_or_default()
                .to_string();
            match serde_json::from_value::<Metric>(value) {
                Ok(metric) => Some(metric),
                Err(err) => {
                    warn!(metric = %key, "Skipping metric definition: {err}");
                    None
                }
            }
        })
        .collect())
}

impl ActivitySnapshot {
    /// Parse a snapshot from JSON text.
    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(Into::into)
    }

    /// Load a snapshot from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ActivityError::io(format!("Failed to read snapshot: {}", path.display()), e)
        })?;
        Self::from_json_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::catalog::Direction;

    #[test]
    fn graph_type_parsing() {
        assert_eq!("coverage".parse::<GraphType>().unwrap(), GraphType::Coverage);
        let err = "treemap".parse::<GraphType>().unwrap_err();
        assert!(matches!(err, ActivityError::Configuration { .. }));
    }

    #[test]
    fn unknown_graph_falls_back_to_default() {
        assert_eq!(
            GraphType::parse_or_default("treemap", GraphType::Issues),
            GraphType::Issues
        );
        assert_eq!(
            GraphType::parse_or_default("custom", GraphType::Issues),
            GraphType::Custom
        );
    }

    #[test]
    fn graph_listing_honours_custom_flag() {
        assert_eq!(GraphType::all(false).len(), 3);
        assert_eq!(GraphType::all(true).last(), Some(&GraphType::Custom));
    }

    #[test]
    fn displayed_metrics_per_graph() {
        assert_eq!(
            displayed_history_metrics(GraphType::Coverage, &[], 6),
            vec!["lines_to_cover", "uncovered_lines"]
        );

        let custom: Vec<String> = (0..8).map(|i| format!("m{i}")).collect();
        let displayed = displayed_history_metrics(GraphType::Custom, &custom, 6);
        assert_eq!(displayed.len(), 6);
        assert_eq!(displayed[0], "m0");

        // Custom selections are ignored by built-in graphs.
        assert_eq!(
            displayed_history_metrics(GraphType::Issues, &custom, 6),
            vec!["violations"]
        );
    }

    #[test]
    fn history_metrics_include_companions() {
        let metrics = history_metrics(GraphType::Issues, &[], 6);
        assert_eq!(
            metrics,
            vec!["violations", "reliability_rating", "security_rating", "sqale_rating"]
        );
    }

    #[test]
    fn snapshot_accepts_server_field_names() {
        let snapshot = ActivitySnapshot::from_json_str(
            r#"{
                "measuresHistory": [
                    {"metric": "bugs", "history": [
                        {"date": "2024-01-01", "value": "10"},
                        {"date": "2024-02-01"}
                    ]}
                ],
                "analyses": [
                    {"key": "A1", "date": "2024-02-01T10:00:00+0100",
                     "events": [
                        {"category": "VERSION", "name": "1.2"},
                        {"category": "SQ_UPGRADE", "name": "x"}
                     ]}
                ],
                "metrics": [{"key": "bugs", "type": "INT"}]
            }"#,
        )
        .unwrap();

        assert_eq!(snapshot.measures_history[0].metric_key, "bugs");
        assert_eq!(snapshot.measures_history[0].history[1].value, None);
        assert_eq!(snapshot.analyses[0].version(), Some("1.2"));
        assert_eq!(snapshot.analyses[0].events[1].category, EventCategory::Other);
        assert!(snapshot.analyses[0].parsed_date().is_ok());
    }

    #[test]
    fn snapshot_skips_unsupported_metric_definitions() {
        let snapshot = ActivitySnapshot::from_json_str(
            r#"{
                "metrics": [
                    {"key": "ncloc_language_distribution", "type": "DATA"},
                    {"key": "violations", "type": "INT", "direction": -1},
                    {"key": "quality_profiles", "type": "STRING"},
                    {"key": "coverage", "type": "PERCENT", "direction": 1},
                    {"key": "new_thing", "type": "BOOL", "direction": 0}
                ]
            }"#,
        )
        .unwrap();

        let keys: Vec<&str> = snapshot.metrics.iter().map(|m| m.key.as_str()).collect();
        assert_eq!(keys, vec!["violations", "coverage"]);
        assert_eq!(snapshot.metrics[0].direction, Direction::LowerBetter);
        assert_eq!(snapshot.metrics[1].direction, Direction::HigherBetter);
    }

    #[test]
    fn analysis_builder_attaches_events() {
        let analysis = Analysis::new("A1", "2024-01-01")
            .with_event(EventCategory::QualityGate, "Red")
            .with_event(EventCategory::Version, "3.1");
        assert_eq!(analysis.events.len(), 2);
        assert_eq!(analysis.version(), Some("3.1"));
    }
}
