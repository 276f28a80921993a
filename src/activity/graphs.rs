//! Packing series into a bounded number of graphs.
//!
//! Series are grouped by metric type, each group is chunked into graphs of at
//! most `max_series_per_graph` series, and the resulting list is cut at
//! `max_graphs`. Groups that come later in the input lose their slots first.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::activity::series::Series;
use crate::core::errors::{ActivityError, Result};
use crate::metrics::catalog::MetricType;

/// Series sharing one Y axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Graph {
    /// Common metric type of the series
    #[serde(rename = "type")]
    pub metric_type: MetricType,
    /// Lower Y bound fixed by the type
    pub axis_min: Option<f64>,
    /// Upper Y bound fixed by the type
    pub axis_max: Option<f64>,
    /// Series drawn on this graph
    pub series: Vec<Series>,
}

impl Graph {
    fn new(metric_type: MetricType, series: Vec<Series>) -> Self {
        let profile = metric_type.profile();
        Self {
            metric_type,
            axis_min: profile.axis_min,
            axis_max: profile.axis_max,
            series,
        }
    }

    /// Metric keys drawn on this graph.
    pub fn metric_keys(&self) -> Vec<&str> {
        self.series.iter().map(|s| s.metric_key.as_str()).collect()
    }
}

/// Graphs produced by a split, plus what did not fit.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphSplit {
    /// Graphs kept, in input order
    pub graphs: Vec<Graph>,
    /// Number of graphs the input would have produced
    pub requested: usize,
    /// Metric keys of series left out by the capacity limit
    pub dropped: Vec<String>,
}

impl GraphSplit {
    /// Whether the capacity limit removed anything.
    pub fn is_truncated(&self) -> bool {
        self.requested > self.graphs.len()
    }

    /// Turn a truncation into [`ActivityError::CapacityExceeded`].
    pub fn into_result(self) -> Result<Vec<Graph>> {
        if self.is_truncated() {
            return Err(ActivityError::capacity(
                self.requested,
                self.graphs.len(),
                self.dropped,
            ));
        }
        Ok(self.graphs)
    }
}

/// Group, chunk and cap series; see the module documentation.
pub fn split_graphs(
    series: &[Series],
    max_graphs: usize,
    max_series_per_graph: usize,
) -> GraphSplit {
    let mut groups: IndexMap<MetricType, Vec<&Series>> = IndexMap::new();
    for s in series {
        groups.entry(s.metric_type).or_default().push(s);
    }

    let mut graphs: Vec<Graph> = Vec::new();
    if max_series_per_graph > 0 {
        for (metric_type, members) in &groups {
            for chunk in members.chunks(max_series_per_graph) {
                graphs.push(Graph::new(
                    *metric_type,
                    chunk.iter().map(|s| (*s).clone()).collect(),
                ));
            }
        }
    }

    let requested = graphs.len();
    let dropped: Vec<String> = graphs
        .iter()
        .skip(max_graphs)
        .flat_map(|g| g.series.iter().map(|s| s.metric_key.clone()))
        .collect();
    graphs.truncate(max_graphs);

    GraphSplit {
        graphs,
        requested,
        dropped,
    }
}

/// Split series into at most `max_graphs` graphs, dropping what does not fit.
pub fn split_series_in_graphs(
    series: &[Series],
    max_graphs: usize,
    max_series_per_graph: usize,
) -> Vec<Graph> {
    let split = split_graphs(series, max_graphs, max_series_per_graph);
    if split.is_truncated() {
        warn!(
            requested = split.requested,
            capacity = max_graphs,
            dropped = ?split.dropped,
            "Graph capacity exceeded, dropping later series groups"
        );
    }
    split.graphs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(key: &str, metric_type: MetricType) -> Series {
        Series {
            metric_key: key.to_string(),
            name: key.to_string(),
            metric_type,
            points: Vec::new(),
        }
    }

    fn sizes(graphs: &[Graph]) -> Vec<usize> {
        graphs.iter().map(|g| g.series.len()).collect()
    }

    #[test]
    fn seven_percent_series_fill_two_graphs() {
        let input: Vec<Series> = (0..7)
            .map(|i| series(&format!("p{i}"), MetricType::Percent))
            .collect();

        let graphs = split_series_in_graphs(&input, 2, 3);
        assert_eq!(sizes(&graphs), vec![3, 3]);
        assert_eq!(graphs[1].metric_keys(), vec!["p3", "p4", "p5"]);
    }

    #[test]
    fn truncation_is_reported_by_split() {
        let input: Vec<Series> = (0..7)
            .map(|i| series(&format!("p{i}"), MetricType::Percent))
            .collect();

        let split = split_graphs(&input, 2, 3);
        assert!(split.is_truncated());
        assert_eq!(split.requested, 3);
        assert_eq!(split.dropped, vec!["p6"]);

        let err = split.into_result().unwrap_err();
        assert!(matches!(
            err,
            ActivityError::CapacityExceeded {
                requested: 3,
                capacity: 2,
                ..
            }
        ));
    }

    #[test]
    fn incompatible_types_never_share_a_graph() {
        let input = vec![
            series("sqale_rating", MetricType::Rating),
            series("sqale_index", MetricType::Duration),
            series("security_rating", MetricType::Rating),
        ];

        let graphs = split_series_in_graphs(&input, 5, 3);
        assert_eq!(graphs.len(), 2);
        assert_eq!(graphs[0].metric_type, MetricType::Rating);
        assert_eq!(graphs[0].metric_keys(), vec!["sqale_rating", "security_rating"]);
        assert_eq!(graphs[1].metric_keys(), vec!["sqale_index"]);
        for graph in &graphs {
            assert!(graph
                .series
                .iter()
                .all(|s| s.metric_type.is_graph_compatible(graph.metric_type)));
        }
    }

    #[test]
    fn later_groups_are_dropped_first() {
        let input = vec![
            series("bugs", MetricType::Numeric),
            series("coverage", MetricType::Percent),
            series("sqale_index", MetricType::Duration),
        ];

        let graphs = split_series_in_graphs(&input, 2, 3);
        let types: Vec<MetricType> = graphs.iter().map(|g| g.metric_type).collect();
        assert_eq!(types, vec![MetricType::Numeric, MetricType::Percent]);
    }

    #[test]
    fn empty_input_produces_no_graphs() {
        assert!(split_series_in_graphs(&[], 2, 3).is_empty());
        let split = split_graphs(&[], 2, 3);
        assert!(!split.is_truncated());
        assert!(split.into_result().unwrap().is_empty());
    }

    #[test]
    fn zero_capacity_produces_no_graphs() {
        let input = vec![series("bugs", MetricType::Numeric)];
        assert!(split_series_in_graphs(&input, 0, 3).is_empty());
        assert!(split_series_in_graphs(&input, 2, 0).is_empty());
    }

    #[test]
    fn graphs_carry_axis_bounds() {
        let graphs = split_series_in_graphs(&[series("coverage", MetricType::Percent)], 1, 1);
        assert_eq!(graphs[0].axis_min, Some(0.0));
        assert_eq!(graphs[0].axis_max, Some(100.0));
    }
}
