//! Conversion of raw measure history into typed, chronological series.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::activity::types::{GraphType, HistoryItem, MeasureHistory};
use crate::core::config::DEFAULT_HOURS_PER_DAY;
use crate::core::dates::parse_date;
use crate::core::errors::{ActivityError, Result};
use crate::metrics::catalog::{Metric, MetricCatalog, MetricType};

/// One point of a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    /// Analysis date
    pub date: DateTime<Utc>,
    /// Raw value, absent for gaps
    pub value: Option<String>,
    /// Numeric projection of the value, absent for gaps
    pub numeric_value: Option<f64>,
}

impl SeriesPoint {
    /// Whether the point carries a usable value.
    pub fn has_value(&self) -> bool {
        self.numeric_value.is_some()
    }
}

/// A metric's value trajectory, ready for charting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    /// Metric key
    pub metric_key: String,
    /// Label shown in legends
    pub name: String,
    /// Value type of the metric
    #[serde(rename = "type")]
    pub metric_type: MetricType,
    /// Points, ascending by date
    pub points: Vec<SeriesPoint>,
}

impl Series {
    /// Most recent point carrying a value.
    pub fn latest_value(&self) -> Option<&SeriesPoint> {
        self.points.iter().rev().find(|p| p.has_value())
    }

    /// Number of points carrying a value.
    pub fn value_count(&self) -> usize {
        self.points.iter().filter(|p| p.has_value()).count()
    }
}

/// Builds [`Series`] from measure history against a set of metric definitions.
#[derive(Debug, Clone)]
pub struct SeriesBuilder {
    catalog: MetricCatalog,
    hours_per_day: u32,
}

impl SeriesBuilder {
    /// Builder resolving metric keys against exactly `metrics`.
    pub fn new(metrics: &[Metric]) -> Self {
        Self::with_catalog(MetricCatalog::from_metrics(metrics.iter().cloned()))
    }

    /// Builder resolving metric keys against an existing catalog.
    pub fn with_catalog(catalog: MetricCatalog) -> Self {
        Self {
            catalog,
            hours_per_day: DEFAULT_HOURS_PER_DAY,
        }
    }

    /// Override the working-day length used for durations.
    pub fn hours_per_day(mut self, hours_per_day: u32) -> Self {
        self.hours_per_day = hours_per_day;
        self
    }

    /// Build series, absorbing malformed entries.
    ///
    /// An entry with an unparseable date is dropped; an entry with an
    /// unparseable value becomes a gap.
    pub fn build(
        &self,
        histories: &[MeasureHistory],
        graph: GraphType,
        displayed_metrics: &[String],
    ) -> Vec<Series> {
        self.build_with(histories, graph, displayed_metrics, |metric_key, item, outcome| {
            match outcome {
                PointOutcome::Point(point) => Some(point),
                PointOutcome::Gap { point, error } => {
                    warn!(
                        metric = metric_key,
                        date = %item.date,
                        "Treating value as a gap: {error}"
                    );
                    Some(point)
                }
                PointOutcome::Invalid(error) => {
                    warn!(
                        metric = metric_key,
                        date = %item.date,
                        "Skipping history entry: {error}"
                    );
                    None
                }
            }
        })
    }

    /// Build series, failing on the first malformed date or value.
    ///
    /// Histories for unknown metrics are still skipped: a retired metric is
    /// not an error.
    pub fn try_build(
        &self,
        histories: &[MeasureHistory],
        graph: GraphType,
        displayed_metrics: &[String],
    ) -> Result<Vec<Series>> {
        let mut first_error = None;
        let series = self.build_with(histories, graph, displayed_metrics, |_, _, outcome| {
            match outcome {
                PointOutcome::Point(point) => Some(point),
                PointOutcome::Gap { error, .. } | PointOutcome::Invalid(error) => {
                    first_error.get_or_insert(error);
                    None
                }
            }
        });
        match first_error {
            Some(err) => Err(err),
            None => Ok(series),
        }
    }

    fn build_with<F>(
        &self,
        histories: &[MeasureHistory],
        graph: GraphType,
        displayed_metrics: &[String],
        mut on_point: F,
    ) -> Vec<Series>
    where
        F: FnMut(&str, &HistoryItem, PointOutcome) -> Option<SeriesPoint>,
    {
        let mut ranked: Vec<(usize, Series)> = Vec::new();

        for history in histories {
            let Some(rank) = displayed_metrics
                .iter()
                .position(|key| *key == history.metric_key)
            else {
                continue;
            };
            let Some(metric) = self.catalog.resolve(&history.metric_key) else {
                debug!(metric = %history.metric_key, "Dropping history of unknown metric");
                continue;
            };

            let mut points: Vec<SeriesPoint> = history
                .history
                .iter()
                .filter_map(|item| {
                    let outcome = self.convert_point(item, metric.metric_type);
                    on_point(&history.metric_key, item, outcome)
                })
                .collect();
            // Stable: points sharing a date keep their input order.
            points.sort_by_key(|p| p.date);

            let name = if graph.is_custom() {
                metric.display_name().to_string()
            } else {
                metric.key.clone()
            };

            ranked.push((
                rank,
                Series {
                    metric_key: metric.key.clone(),
                    name,
                    metric_type: metric.metric_type,
                    points,
                },
            ));
        }

        ranked.sort_by_key(|(rank, _)| *rank);
        ranked.into_iter().map(|(_, series)| series).collect()
    }

    fn convert_point(&self, item: &HistoryItem, metric_type: MetricType) -> PointOutcome {
        let date = match parse_date(&item.date) {
            Ok(date) => date,
            Err(error) => return PointOutcome::Invalid(error),
        };
        let gap = SeriesPoint {
            date,
            value: None,
            numeric_value: None,
        };
        let Some(raw) = item.value.as_deref() else {
            return PointOutcome::Point(gap);
        };

        match metric_type.parse_value(raw, self.hours_per_day) {
            Ok(value) => PointOutcome::Point(SeriesPoint {
                date,
                value: Some(raw.to_string()),
                numeric_value: Some(value.as_f64()),
            }),
            Err(error) => PointOutcome::Gap { point: gap, error },
        }
    }
}

enum PointOutcome {
    Point(SeriesPoint),
    /// Value could not be parsed; the point keeps its date.
    Gap {
        point: SeriesPoint,
        error: ActivityError,
    },
    /// Date could not be parsed.
    Invalid(ActivityError),
}

/// Build series for the displayed metrics, absorbing malformed entries.
pub fn generate_series(
    histories: &[MeasureHistory],
    graph: GraphType,
    metrics: &[Metric],
    displayed_metrics: &[String],
) -> Vec<Series> {
    SeriesBuilder::new(metrics).build(histories, graph, displayed_metrics)
}

/// True when any series has at least two points with values.
pub fn has_history_data(series: &[Series]) -> bool {
    series.iter().any(|s| s.value_count() > 1)
}

/// Type of the first series, numeric when there is none.
pub fn series_metric_type(series: &[Series]) -> MetricType {
    series.first().map(|s| s.metric_type).unwrap_or_default()
}

/// Types a custom graph may still accept given its current series.
///
/// Empty means any type is allowed.
pub fn custom_metric_type_filter(series: &[Series]) -> Vec<MetricType> {
    series.first().map(|s| vec![s.metric_type]).unwrap_or_default()
}
