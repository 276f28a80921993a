//! Period-over-period deltas between consecutive analyses.
//!
//! Histories are aligned on their most recent entry: position `count - 1` of
//! the result is the latest analysis, position 0 the oldest one considered.
//! The oldest position never has a variation because its predecessor lies
//! outside the window. Gaps on either side of a pair leave the variation
//! undefined rather than zero.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::activity::types::{HistoryItem, MeasureHistory};
use crate::core::config::DEFAULT_HOURS_PER_DAY;
use crate::core::dates::parse_date;
use crate::metrics::catalog::{MetricCatalog, MetricType};
use crate::metrics::values::{Level, MeasureValue, Rating};

/// Change of one metric between two consecutive analyses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Variation {
    /// Signed difference of numeric values
    Delta {
        /// Current minus previous
        value: f64,
    },
    /// Rating transition
    Rating {
        /// Previous rating
        from: Rating,
        /// Current rating
        to: Rating,
    },
    /// Quality gate level transition
    Level {
        /// Previous level
        from: Level,
        /// Current level
        to: Level,
    },
}

impl Variation {
    /// Numeric delta; rating and level transitions report the rank change.
    pub fn delta(&self) -> f64 {
        match self {
            Variation::Delta { value } => *value,
            Variation::Rating { from, to } => f64::from(to.rank()) - f64::from(from.rank()),
            Variation::Level { from, to } => f64::from(to.rank()) - f64::from(from.rank()),
        }
    }

    /// Whether the value moved at all.
    pub fn is_change(&self) -> bool {
        match self {
            Variation::Delta { value } => *value != 0.0,
            Variation::Rating { from, to } => from != to,
            Variation::Level { from, to } => from != to,
        }
    }
}

/// Variations of every metric at one analysis position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisVariation {
    /// Metric key to variation; absent keys have no defined variation
    #[serde(flatten)]
    pub variations: IndexMap<String, Variation>,
}

impl AnalysisVariation {
    /// Variation of a metric, if defined.
    pub fn get(&self, metric_key: &str) -> Option<&Variation> {
        self.variations.get(metric_key)
    }

    /// Numeric delta of a metric, if defined.
    pub fn delta(&self, metric_key: &str) -> Option<f64> {
        self.get(metric_key).map(Variation::delta)
    }

    /// Whether no metric has a defined variation.
    pub fn is_empty(&self) -> bool {
        self.variations.is_empty()
    }
}

/// Computes [`AnalysisVariation`]s from measure history.
#[derive(Debug, Clone)]
pub struct VariationComputer {
    catalog: MetricCatalog,
    hours_per_day: u32,
}

impl Default for VariationComputer {
    fn default() -> Self {
        Self::new(MetricCatalog::builtin().clone())
    }
}

impl VariationComputer {
    /// Computer typing values through `catalog`.
    pub fn new(catalog: MetricCatalog) -> Self {
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

    /// Variations over the latest `count` points, oldest first.
    ///
    /// The result always has `count` entries; reverse it to align with a
    /// most-recent-first analysis list.
    pub fn compute(&self, histories: &[MeasureHistory], count: usize) -> Vec<AnalysisVariation> {
        let mut result = vec![AnalysisVariation::default(); count];

        for history in histories {
            let items = &history.history;
            let metric_type = self.metric_type(history);

            // Position 0 has no predecessor inside the window.
            for (position, slot) in result.iter_mut().enumerate().skip(1) {
                let Some(index) = (items.len() + position).checked_sub(count) else {
                    continue;
                };
                let Some(previous_index) = index.checked_sub(1) else {
                    continue;
                };
                let current = self.value_at(&items[index], metric_type);
                let previous = self.value_at(&items[previous_index], metric_type);

                if let Some(variation) = current.zip(previous).and_then(|(c, p)| between(p, c)) {
                    slot.variations.insert(history.metric_key.clone(), variation);
                }
            }
        }

        result
    }

    fn metric_type(&self, history: &MeasureHistory) -> MetricType {
        if let Some(metric_type) = self.catalog.metric_type(&history.metric_key) {
            return metric_type;
        }
        let looks_like_level = history
            .history
            .iter()
            .filter_map(|item| item.value.as_deref())
            .any(|raw| raw.parse::<Level>().is_ok());
        if looks_like_level {
            MetricType::Level
        } else {
            MetricType::Numeric
        }
    }

    fn value_at(&self, item: &HistoryItem, metric_type: MetricType) -> Option<MeasureValue> {
        let raw = item.value.as_deref()?;
        // Entries without a usable date are not charted either.
        if let Err(err) = parse_date(&item.date) {
            debug!(date = %item.date, "Ignoring entry in variation: {err}");
            return None;
        }
        match metric_type.parse_value(raw, self.hours_per_day) {
            Ok(value) => Some(value),
            Err(err) => {
                debug!(date = %item.date, "Ignoring value in variation: {err}");
                None
            }
        }
    }
}

fn between(previous: MeasureValue, current: MeasureValue) -> Option<Variation> {
    match (previous, current) {
        (MeasureValue::Number(p), MeasureValue::Number(c)) => {
            Some(Variation::Delta { value: c - p })
        }
        (MeasureValue::Rating(from), MeasureValue::Rating(to)) => {
            Some(Variation::Rating { from, to })
        }
        (MeasureValue::Level(from), MeasureValue::Level(to)) => {
            Some(Variation::Level { from, to })
        }
        _ => None,
    }
}

/// Variations over the latest `count` points using the built-in catalog.
pub fn analysis_variations(histories: &[MeasureHistory], count: usize) -> Vec<AnalysisVariation> {
    VariationComputer::default().compute(histories, count)
}
