//! # activity-graphs: Project Activity Aggregation
//!
//! Turns the measure history and analyses of a project into the data behind
//! an activity panel:
//!
//! - **Series**: typed, chronological value trajectories per metric
//! - **Graphs**: series packed by metric type under a capacity limit
//! - **Variations**: deltas between consecutive analyses
//! - **View model**: displayed analyses, leak period marker and quality gate
//!   timeline
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  ActivityAggregator                      │
//! ├────────────────┬────────────────┬────────────────────────┤
//! │ SeriesBuilder  │ GraphSplitter  │ VariationComputer      │
//! ├────────────────┴────────────────┴────────────────────────┤
//! │          MetricCatalog  •  values  •  dates              │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Every stage is a pure function of its inputs. Malformed points degrade to
//! gaps instead of failing the whole aggregation.
//!
//! ## Quick Start
//!
//! ```rust
//! use activity_graphs::{ActivityAggregator, ActivityQuery, GraphType, MetricCatalog};
//! use activity_graphs::activity::types::{HistoryItem, MeasureHistory};
//!
//! let metrics: Vec<_> = MetricCatalog::builtin().metrics().cloned().collect();
//! let histories = vec![MeasureHistory::new(
//!     "violations",
//!     vec![HistoryItem::new("2024-01-01", "10"), HistoryItem::new("2024-02-01", "7")],
//! )];
//!
//! let model = ActivityAggregator::default().build(
//!     &histories,
//!     &[],
//!     &metrics,
//!     &ActivityQuery::new(GraphType::Issues),
//! );
//! assert_eq!(model.graphs.len(), 1);
//! ```

#![warn(missing_docs)]
#![warn(unsafe_code)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Shared infrastructure
pub mod core {
    //! Errors, configuration and date handling.

    pub mod config;
    pub mod dates;
    pub mod errors;
}

// Metric definitions and value parsing
pub mod metrics {
    //! Metric catalog and typed measure values.

    pub mod catalog;
    pub mod values;
}

// Aggregation pipeline
pub mod activity {
    //! Series generation, graph splitting, variations and the view model.

    pub mod aggregator;
    pub mod graphs;
    pub mod series;
    pub mod types;
    pub mod variations;
}

// Re-export primary types for convenience
pub use activity::aggregator::{
    build_activity_view_model, ActivityAggregator, ActivityQuery, ActivityViewModel,
};
pub use activity::graphs::{split_series_in_graphs, Graph};
pub use activity::series::{generate_series, Series, SeriesBuilder};
pub use activity::types::{ActivitySnapshot, GraphType};
pub use activity::variations::{analysis_variations, AnalysisVariation, VariationComputer};
pub use core::config::ActivityConfig;
pub use core::errors::{ActivityError, Result};
pub use metrics::catalog::{Metric, MetricCatalog, MetricType};
