//! Assembly of the render-ready activity view model.
//!
//! The aggregator is a pure function of its inputs: it owns no state between
//! calls and never fails. Malformed points are absorbed by the stages it
//! composes, so the caller always receives a structurally valid model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::activity::graphs::{split_series_in_graphs, Graph};
use crate::activity::series::{has_history_data, Series, SeriesBuilder};
use crate::activity::types::{
    displayed_history_metrics, ActivitySnapshot, Analysis, GraphType, MeasureHistory,
};
use crate::activity::variations::{AnalysisVariation, VariationComputer};
use crate::core::config::ActivityConfig;
use crate::core::dates::parse_date;
use crate::metrics::catalog::{keys, Metric, MetricCatalog};
use crate::metrics::values::Level;

/// Quality gate status recorded at one analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityGateStatus {
    /// Analysis date, absent when malformed
    pub date: Option<DateTime<Utc>>,
    /// Gate level, absent when missing or malformed
    pub level: Option<Level>,
}

/// Everything the activity panel needs to render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityViewModel {
    /// Graph layout used
    pub graph: GraphType,
    /// Metric keys drawn
    pub displayed_metrics: Vec<String>,
    /// All series, before capacity limits
    pub series: Vec<Series>,
    /// Series packed into graphs
    pub graphs: Vec<Graph>,
    /// Whether any series has enough points to draw a line
    pub has_history_data: bool,
    /// Most recent analyses, most recent first
    pub displayed_analyses: Vec<Analysis>,
    /// Number of analyses supplied, before capping
    pub total_analyses: usize,
    /// Leak period marker, clamped to the first data point
    pub shown_leak_period_date: Option<DateTime<Utc>>,
    /// Variations aligned with `displayed_analyses`, most recent first
    pub analysis_variations: Vec<AnalysisVariation>,
    /// Quality gate statuses, most recent first
    pub quality_gate_timeline: Vec<QualityGateStatus>,
}

/// One row of the analysis list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisRow<'a> {
    /// The analysis
    pub analysis: &'a Analysis,
    /// Deltas against the previous analysis
    pub variation: Option<&'a AnalysisVariation>,
    /// Quality gate status at this analysis
    pub quality_gate_status: Option<Level>,
    /// Whether this is the project's first analysis
    pub is_first_analysis: bool,
}

impl ActivityViewModel {
    /// Zip displayed analyses with their variations and gate statuses.
    pub fn rows(&self) -> Vec<AnalysisRow<'_>> {
        self.displayed_analyses
            .iter()
            .enumerate()
            .map(|(index, analysis)| AnalysisRow {
                analysis,
                variation: self.analysis_variations.get(index),
                quality_gate_status: self
                    .quality_gate_timeline
                    .get(index)
                    .and_then(|status| status.level),
                is_first_analysis: index + 1 == self.total_analyses,
            })
            .collect()
    }
}

/// Parameters chosen by the user rather than fetched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityQuery {
    /// Graph layout
    pub graph: GraphType,
    /// Metrics of the custom graph
    pub custom_metrics: Vec<String>,
    /// Start of the new code period
    pub leak_period_date: Option<DateTime<Utc>>,
}

impl ActivityQuery {
    /// Query for a graph layout.
    pub fn new(graph: GraphType) -> Self {
        Self {
            graph,
            ..Self::default()
        }
    }

    /// Builder: set the leak period.
    pub fn with_leak_period(mut self, date: DateTime<Utc>) -> Self {
        self.leak_period_date = Some(date);
        self
    }

    /// Builder: set the custom graph metrics.
    pub fn with_custom_metrics(mut self, metrics: Vec<String>) -> Self {
        self.custom_metrics = metrics;
        self
    }
}

/// Composes series, graphs and variations into an [`ActivityViewModel`].
#[derive(Debug, Clone, Default)]
pub struct ActivityAggregator {
    config: ActivityConfig,
}

impl ActivityAggregator {
    /// Aggregator with the given limits.
    pub fn new(config: ActivityConfig) -> Self {
        Self { config }
    }

    /// Configuration in use.
    pub fn config(&self) -> &ActivityConfig {
        &self.config
    }

    /// Build the view model for a snapshot.
    pub fn build_from_snapshot(
        &self,
        snapshot: &ActivitySnapshot,
        query: &ActivityQuery,
    ) -> ActivityViewModel {
        self.build(
            &snapshot.measures_history,
            &snapshot.analyses,
            &snapshot.metrics,
            query,
        )
    }

    /// Build the view model.
    ///
    /// `analyses` must be sorted most recent first, as the server returns
    /// them; `histories` oldest first.
    pub fn build(
        &self,
        histories: &[MeasureHistory],
        analyses: &[Analysis],
        metrics: &[Metric],
        query: &ActivityQuery,
    ) -> ActivityViewModel {
        let max_analyses = self.config.max_analyses;
        let displayed_metrics = displayed_history_metrics(
            query.graph,
            &query.custom_metrics,
            self.config.max_custom_metrics,
        );

        let series = SeriesBuilder::new(metrics)
            .hours_per_day(self.config.hours_per_day)
            .build(histories, query.graph, &displayed_metrics);
        let graphs = split_series_in_graphs(
            &series,
            self.config.max_graphs,
            self.config.max_series_per_graph,
        );

        let shown_leak_period_date = query
            .leak_period_date
            .map(|leak| match earliest_history_date(histories) {
                Some(earliest) if earliest > leak => earliest,
                _ => leak,
            });

        let displayed_analyses: Vec<Analysis> =
            analyses.iter().take(max_analyses).cloned().collect();

        // One extra point gives the oldest displayed analysis a predecessor.
        let variation_count = analyses.len().min(max_analyses + 1);
        let mut analysis_variations =
            VariationComputer::new(MetricCatalog::builtin_with(metrics.iter().cloned()))
                .hours_per_day(self.config.hours_per_day)
                .compute(histories, variation_count);
        analysis_variations.reverse();

        let quality_gate_timeline = quality_gate_timeline(histories, max_analyses);

        debug!(
            graph = %query.graph,
            series = series.len(),
            graphs = graphs.len(),
            analyses = displayed_analyses.len(),
            "Built activity view model"
        );

        ActivityViewModel {
            graph: query.graph,
            displayed_metrics,
            has_history_data: has_history_data(&series),
            series,
            graphs,
            displayed_analyses,
            total_analyses: analyses.len(),
            shown_leak_period_date,
            analysis_variations,
            quality_gate_timeline,
        }
    }
}

/// Earliest parseable date across all histories.
fn earliest_history_date(histories: &[MeasureHistory]) -> Option<DateTime<Utc>> {
    histories
        .iter()
        .flat_map(|h| h.history.iter())
        .filter_map(|item| parse_date(&item.date).ok())
        .min()
}

/// Latest `limit` quality gate statuses, most recent first.
fn quality_gate_timeline(histories: &[MeasureHistory], limit: usize) -> Vec<QualityGateStatus> {
    let Some(alert_status) = histories
        .iter()
        .find(|h| h.metric_key == keys::ALERT_STATUS)
    else {
        return Vec::new();
    };

    let items = &alert_status.history;
    items[items.len().saturating_sub(limit)..]
        .iter()
        .rev()
        .map(|item| {
            let level = item.value.as_deref().and_then(|raw| match raw.parse::<Level>() {
                Ok(level) => Some(level),
                Err(err) => {
                    warn!(date = %item.date, "Ignoring quality gate status: {err}");
                    None
                }
            });
            QualityGateStatus {
                date: parse_date(&item.date).ok(),
                level,
            }
        })
        .collect()
}

/// Build the activity view model with default limits, except for the number
/// of listed analyses.
pub fn build_activity_view_model(
    histories: &[MeasureHistory],
    analyses: &[Analysis],
    metrics: &[Metric],
    graph: GraphType,
    leak_period_date: Option<DateTime<Utc>>,
    max_analyses: usize,
) -> ActivityViewModel {
    let aggregator =
        ActivityAggregator::new(ActivityConfig::default().with_max_analyses(max_analyses));
    let query = ActivityQuery {
        graph,
        custom_metrics: Vec::new(),
        leak_period_date,
    };
    aggregator.build(histories, analyses, metrics, &query)
}
