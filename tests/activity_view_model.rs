//! End-to-end tests of the activity aggregation pipeline.

use activity_graphs::activity::aggregator::QualityGateStatus;
use activity_graphs::activity::types::{Analysis, EventCategory, HistoryItem, MeasureHistory};
use activity_graphs::core::dates::parse_date;
use activity_graphs::metrics::catalog::Direction;
use activity_graphs::metrics::values::Level;
use activity_graphs::{
    analysis_variations, build_activity_view_model, generate_series, split_series_in_graphs,
    ActivityAggregator, ActivityQuery, ActivitySnapshot, GraphType, Metric, MetricType, Series,
};
use approx::assert_relative_eq;
use proptest::prelude::*;

const SNAPSHOT: &str = include_str!("fixtures/snapshot.json");
const SERVER_METRICS: &str = include_str!("fixtures/server_metrics.json");

fn bugs_history() -> Vec<MeasureHistory> {
    vec![MeasureHistory::new(
        "bugs",
        vec![
            HistoryItem::new("2024-01-01", "10"),
            HistoryItem::new("2024-02-01", "7"),
        ],
    )]
}

fn bugs_metric() -> Vec<Metric> {
    vec![Metric::new("bugs", MetricType::Numeric, Direction::LowerBetter)]
}

#[test]
fn bugs_scenario_yields_one_graph_and_a_negative_variation() {
    let histories = bugs_history();
    let metrics = bugs_metric();
    let displayed = vec!["bugs".to_string()];

    let series = generate_series(&histories, GraphType::Issues, &metrics, &displayed);
    let graphs = split_series_in_graphs(&series, 2, 3);
    assert_eq!(graphs.len(), 1);
    assert_eq!(graphs[0].series.len(), 1);

    let values: Vec<Option<f64>> = graphs[0].series[0]
        .points
        .iter()
        .map(|p| p.numeric_value)
        .collect();
    assert_eq!(values, vec![Some(10.0), Some(7.0)]);

    let variations = analysis_variations(&histories, 2);
    let deltas: Vec<Option<f64>> = variations.iter().map(|v| v.delta("bugs")).collect();
    assert_eq!(deltas, vec![None, Some(-3.0)]);
}

#[test]
fn seven_percentage_series_are_capped_at_two_graphs() {
    let series: Vec<Series> = (0..7)
        .map(|i| Series {
            metric_key: format!("density_{i}"),
            name: format!("density_{i}"),
            metric_type: MetricType::Percent,
            points: Vec::new(),
        })
        .collect();

    let graphs = split_series_in_graphs(&series, 2, 3);
    let sizes: Vec<usize> = graphs.iter().map(|g| g.series.len()).collect();
    assert_eq!(sizes, vec![3, 3]);
}

#[test]
fn missing_values_become_gaps_not_zero() {
    let histories = vec![MeasureHistory::new(
        "bugs",
        vec![
            HistoryItem::new("2024-01-01", "10"),
            HistoryItem::empty("2024-02-01"),
            HistoryItem::new("2024-03-01", "8"),
        ],
    )];

    let series = generate_series(
        &histories,
        GraphType::Issues,
        &bugs_metric(),
        &["bugs".to_string()],
    );
    assert_eq!(series[0].points[1].numeric_value, None);

    let deltas: Vec<Option<f64>> = analysis_variations(&histories, 3)
        .iter()
        .map(|v| v.delta("bugs"))
        .collect();
    assert_eq!(deltas, vec![None, None, None]);
}

#[test]
fn snapshot_issues_view_model() {
    let snapshot = ActivitySnapshot::from_json_str(SNAPSHOT).expect("fixture parses");
    let query = ActivityQuery::new(GraphType::Issues)
        .with_leak_period(parse_date("2023-06-01").unwrap());

    let model = ActivityAggregator::default().build_from_snapshot(&snapshot, &query);

    assert_eq!(model.displayed_metrics, vec!["violations"]);
    assert_eq!(model.graphs.len(), 1);
    assert!(model.has_history_data);
    assert_eq!(
        model.shown_leak_period_date,
        Some(parse_date("2024-01-01T10:00:00+0000").unwrap())
    );

    assert_eq!(model.displayed_analyses.len(), 4);
    assert_eq!(model.analysis_variations.len(), 4);
    assert_relative_eq!(model.analysis_variations[0].delta("violations").unwrap(), 2.0);
    assert_relative_eq!(model.analysis_variations[1].delta("violations").unwrap(), -15.0);
    assert_relative_eq!(model.analysis_variations[0].delta("sqale_rating").unwrap(), -1.0);
    assert!(model.analysis_variations[3].is_empty());

    let rows = model.rows();
    assert_eq!(rows[0].analysis.version(), Some("2.1"));
    assert_eq!(rows[0].quality_gate_status, Some(Level::Ok));
    assert_eq!(rows[3].quality_gate_status, Some(Level::Error));
    assert!(rows[3].is_first_analysis);
    assert_eq!(
        model.quality_gate_timeline.first(),
        Some(&QualityGateStatus {
            date: Some(parse_date("2024-04-01T10:00:00+0000").unwrap()),
            level: Some(Level::Ok),
        })
    );
}

#[test]
fn snapshot_coverage_view_model_absorbs_bad_points() {
    let snapshot = ActivitySnapshot::from_json_str(SNAPSHOT).expect("fixture parses");
    let model = ActivityAggregator::default()
        .build_from_snapshot(&snapshot, &ActivityQuery::new(GraphType::Coverage));

    assert_eq!(model.series.len(), 2);
    assert_eq!(model.graphs.len(), 1);
    assert_eq!(model.graphs[0].metric_keys(), vec!["lines_to_cover", "uncovered_lines"]);

    let lines_to_cover: Vec<Option<f64>> =
        model.series[0].points.iter().map(|p| p.numeric_value).collect();
    assert_eq!(lines_to_cover, vec![Some(1000.0), Some(1100.0), None, Some(1250.0)]);

    // The broken point leaves its neighbours without a variation.
    assert_eq!(model.analysis_variations[0].delta("lines_to_cover"), None);
    assert_eq!(model.analysis_variations[2].delta("lines_to_cover"), Some(100.0));
}

#[test]
fn free_function_honours_max_analyses() {
    let snapshot = ActivitySnapshot::from_json_str(SNAPSHOT).expect("fixture parses");
    let model = build_activity_view_model(
        &snapshot.measures_history,
        &snapshot.analyses,
        &snapshot.metrics,
        GraphType::Issues,
        None,
        2,
    );

    assert_eq!(model.displayed_analyses.len(), 2);
    assert_eq!(model.analysis_variations.len(), 3);
    assert_eq!(model.quality_gate_timeline.len(), 2);
    assert_eq!(model.shown_leak_period_date, None);
}

#[test]
fn view_model_serializes_for_renderers() {
    let snapshot = ActivitySnapshot::from_json_str(SNAPSHOT).expect("fixture parses");
    let model = ActivityAggregator::default()
        .build_from_snapshot(&snapshot, &ActivityQuery::new(GraphType::Issues));

    let json = serde_json::to_value(&model).expect("serializes");
    assert_eq!(json["graph"], "issues");
    assert_eq!(json["graphs"][0]["type"], "numeric");
    assert_eq!(json["analysisVariations"][0]["violations"]["kind"], "delta");
    assert_eq!(json["qualityGateTimeline"][0]["level"], "OK");
}

#[test]
fn snapshot_with_unsupported_metric_types_still_renders() {
    let snapshot = ActivitySnapshot::from_json_str(SERVER_METRICS).expect("fixture parses");

    let keys: Vec<&str> = snapshot.metrics.iter().map(|m| m.key.as_str()).collect();
    assert_eq!(keys, vec!["violations", "coverage", "alert_status"]);
    assert_eq!(snapshot.metrics[0].direction, Direction::LowerBetter);
    assert_eq!(snapshot.metrics[1].direction, Direction::HigherBetter);

    let model = ActivityAggregator::default()
        .build_from_snapshot(&snapshot, &ActivityQuery::new(GraphType::Issues));
    assert_eq!(model.graphs.len(), 1);
    assert_eq!(model.graphs[0].metric_keys(), vec!["violations"]);
    assert_eq!(model.analysis_variations[0].delta("violations"), Some(-5.0));
    assert_eq!(model.analysis_variations[0].get("ncloc_language_distribution"), None);
}

#[test]
fn entry_with_bad_date_is_neither_charted_nor_compared() {
    let histories = vec![MeasureHistory::new(
        "bugs",
        vec![
            HistoryItem::new("2024-01-01", "10"),
            HistoryItem::new("not-a-date", "50"),
            HistoryItem::new("2024-03-01", "12"),
        ],
    )];
    let analyses: Vec<Analysis> = ["2024-03-01", "2024-02-01", "2024-01-01"]
        .iter()
        .enumerate()
        .map(|(i, date)| Analysis::new(format!("A{i}"), *date))
        .collect();
    let query = ActivityQuery::new(GraphType::Custom).with_custom_metrics(vec!["bugs".into()]);

    let model = ActivityAggregator::default().build(&histories, &analyses, &bugs_metric(), &query);
    assert_eq!(model.series[0].points.len(), 2);
    assert!(model.analysis_variations.iter().all(|v| v.delta("bugs").is_none()));
}

fn arb_histories() -> impl Strategy<Value = Vec<MeasureHistory>> {
    let item = (1u32..=28, 1u32..=12, prop::option::of(0u32..500)).prop_map(|(day, month, value)| {
        HistoryItem {
            date: format!("2024-{month:02}-{day:02}"),
            value: value.map(|v| v.to_string()),
        }
    });
    let keys = prop::sample::select(vec!["violations", "bugs", "code_smells"]);
    prop::collection::vec(
        (keys, prop::collection::vec(item, 0..12))
            .prop_map(|(key, history)| MeasureHistory::new(key, history)),
        0..4,
    )
}

fn arb_analyses() -> impl Strategy<Value = Vec<Analysis>> {
    prop::collection::vec((1u32..=28, 1u32..=12, any::<bool>()), 0..10).prop_map(|entries| {
        let mut analyses: Vec<Analysis> = entries
            .into_iter()
            .enumerate()
            .map(|(i, (day, month, tagged))| {
                let analysis = Analysis::new(format!("A{i}"), format!("2024-{month:02}-{day:02}"));
                if tagged {
                    analysis.with_event(EventCategory::Version, format!("1.{i}"))
                } else {
                    analysis
                }
            })
            .collect();
        analyses.sort_by(|a, b| b.date.cmp(&a.date));
        analyses
    })
}

fn arb_alert_status() -> impl Strategy<Value = MeasureHistory> {
    let level = prop::sample::select(vec!["OK", "WARN", "ERROR", "bogus"]);
    prop::collection::vec((1u32..=28, level), 0..8).prop_map(|entries| {
        let history = entries
            .into_iter()
            .map(|(day, level)| HistoryItem::new(format!("2024-06-{day:02}"), level))
            .collect();
        MeasureHistory::new("alert_status", history)
    })
}

fn all_metrics() -> Vec<Metric> {
    ["violations", "bugs", "code_smells"]
        .iter()
        .map(|key| Metric::new(*key, MetricType::Numeric, Direction::LowerBetter))
        .collect()
}

proptest! {
    #[test]
    fn prop_series_points_are_chronological(histories in arb_histories()) {
        let displayed: Vec<String> =
            ["violations", "bugs", "code_smells"].iter().map(|k| k.to_string()).collect();
        let series = generate_series(&histories, GraphType::Custom, &all_metrics(), &displayed);

        for s in &series {
            for pair in s.points.windows(2) {
                prop_assert!(pair[0].date <= pair[1].date);
            }
        }
        let total_points: usize = series.iter().map(|s| s.points.len()).sum();
        let total_items: usize = histories.iter().map(|h| h.history.len()).sum();
        prop_assert_eq!(total_points, total_items);
    }

    #[test]
    fn prop_aggregation_is_deterministic(
        mut histories in arb_histories(),
        alert_status in arb_alert_status(),
        analyses in arb_analyses(),
        leak_day in prop::option::of(1u32..=28),
        max_analyses in 1usize..8,
    ) {
        histories.push(alert_status);
        let leak_period_date =
            leak_day.map(|day| parse_date(&format!("2024-03-{day:02}")).expect("valid date"));
        let build = || {
            build_activity_view_model(
                &histories,
                &analyses,
                &all_metrics(),
                GraphType::Issues,
                leak_period_date,
                max_analyses,
            )
        };

        let first = build();
        let second = build();
        prop_assert_eq!(first.shown_leak_period_date.is_some(), leak_period_date.is_some());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_graphs_respect_capacity(
        types in prop::collection::vec(0usize..5, 0..20),
        max_graphs in 0usize..4,
        max_series in 0usize..4,
    ) {
        let all_types = [
            MetricType::Numeric,
            MetricType::Rating,
            MetricType::Percent,
            MetricType::Duration,
            MetricType::Level,
        ];
        let series: Vec<Series> = types
            .iter()
            .enumerate()
            .map(|(i, t)| Series {
                metric_key: format!("m{i}"),
                name: format!("m{i}"),
                metric_type: all_types[*t],
                points: Vec::new(),
            })
            .collect();

        let graphs = split_series_in_graphs(&series, max_graphs, max_series);
        prop_assert!(graphs.len() <= max_graphs);
        for graph in &graphs {
            prop_assert!(!graph.series.is_empty());
            prop_assert!(graph.series.len() <= max_series);
            prop_assert!(graph.series.iter().all(|s| s.metric_type == graph.metric_type));
        }
    }
}
