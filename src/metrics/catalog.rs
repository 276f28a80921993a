//! Metric definitions and the catalog that resolves metric keys to types.
//!
//! Per-type behaviour (value parsing, axis bounds, labels) lives in a table
//! indexed by [`MetricType`] rather than in string comparisons scattered
//! through the pipeline.

use std::fmt;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::core::errors::Result;
use crate::metrics::values::{
    parse_number, parse_percent, Level, MeasureValue, Rating, WorkDuration,
};

/// Well-known metric keys
pub mod keys {
    /// Total issues
    pub const VIOLATIONS: &str = "violations";
    /// Reliability issues
    pub const BUGS: &str = "bugs";
    /// Security issues
    pub const VULNERABILITIES: &str = "vulnerabilities";
    /// Maintainability issues
    pub const CODE_SMELLS: &str = "code_smells";
    /// Reliability rating
    pub const RELIABILITY_RATING: &str = "reliability_rating";
    /// Security rating
    pub const SECURITY_RATING: &str = "security_rating";
    /// Maintainability rating
    pub const SQALE_RATING: &str = "sqale_rating";
    /// Technical debt
    pub const SQALE_INDEX: &str = "sqale_index";
    /// Line and condition coverage
    pub const COVERAGE: &str = "coverage";
    /// Coverable lines
    pub const LINES_TO_COVER: &str = "lines_to_cover";
    /// Coverable lines without coverage
    pub const UNCOVERED_LINES: &str = "uncovered_lines";
    /// Lines of code
    pub const NCLOC: &str = "ncloc";
    /// Duplicated lines
    pub const DUPLICATED_LINES: &str = "duplicated_lines";
    /// Duplicated lines ratio
    pub const DUPLICATED_LINES_DENSITY: &str = "duplicated_lines_density";
    /// Quality gate status
    pub const ALERT_STATUS: &str = "alert_status";
}

/// Value type of a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MetricType {
    /// Counts and plain decimals
    #[default]
    #[serde(alias = "INT", alias = "FLOAT", alias = "MILLISEC")]
    Numeric,
    /// A to E ratings
    #[serde(alias = "RATING")]
    Rating,
    /// Percentages
    #[serde(alias = "PERCENT")]
    Percent,
    /// Work durations in minutes
    #[serde(alias = "WORK_DUR")]
    Duration,
    /// Quality gate levels
    #[serde(alias = "LEVEL")]
    Level,
}

/// Per-type properties consulted by the pipeline.
#[derive(Debug)]
pub struct TypeProfile {
    /// Lowercase type name
    pub name: &'static str,
    /// Name used by the server
    pub server_name: &'static str,
    /// Fixed lower bound of the Y axis, if any
    pub axis_min: Option<f64>,
    /// Fixed upper bound of the Y axis, if any
    pub axis_max: Option<f64>,
}

static TYPE_PROFILES: [TypeProfile; 5] = [
    TypeProfile {
        name: "numeric",
        server_name: "INT",
        axis_min: Some(0.0),
        axis_max: None,
    },
    TypeProfile {
        name: "rating",
        server_name: "RATING",
        axis_min: Some(1.0),
        axis_max: Some(5.0),
    },
    TypeProfile {
        name: "percent",
        server_name: "PERCENT",
        axis_min: Some(0.0),
        axis_max: Some(100.0),
    },
    TypeProfile {
        name: "duration",
        server_name: "WORK_DUR",
        axis_min: Some(0.0),
        axis_max: None,
    },
    TypeProfile {
        name: "level",
        server_name: "LEVEL",
        axis_min: Some(1.0),
        axis_max: Some(3.0),
    },
];

impl MetricType {
    fn index(self) -> usize {
        match self {
            MetricType::Numeric => 0,
            MetricType::Rating => 1,
            MetricType::Percent => 2,
            MetricType::Duration => 3,
            MetricType::Level => 4,
        }
    }

    /// Static properties of this type.
    pub fn profile(self) -> &'static TypeProfile {
        &TYPE_PROFILES[self.index()]
    }

    /// Two series can share a Y axis exactly when their types match.
    pub fn is_graph_compatible(self, other: MetricType) -> bool {
        self == other
    }

    /// Parse a raw measure string according to this type.
    pub fn parse_value(self, raw: &str, hours_per_day: u32) -> Result<MeasureValue> {
        match self {
            MetricType::Numeric => parse_number(raw).map(MeasureValue::Number),
            MetricType::Percent => parse_percent(raw).map(MeasureValue::Number),
            MetricType::Duration => WorkDuration::parse(raw, hours_per_day)
                .map(|d| MeasureValue::Number(d.minutes() as f64)),
            MetricType::Rating => raw.parse::<Rating>().map(MeasureValue::Rating),
            MetricType::Level => raw.parse::<Level>().map(MeasureValue::Level),
        }
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.profile().name)
    }
}

/// Whether higher values are improvements.
///
/// Deserializes from the kebab-case names or from the server's integer
/// codes (`1`, `-1`, `0`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    /// Larger is better (coverage)
    HigherBetter,
    /// Smaller is better (issues, debt)
    LowerBetter,
    /// No preference (size)
    #[default]
    Neutral,
}

impl Direction {
    const NAMES: &'static [&'static str] = &["higher-better", "lower-better", "neutral"];

    /// Direction for a server code: positive is higher-better.
    pub fn from_code(code: i64) -> Self {
        match code.signum() {
            1 => Direction::HigherBetter,
            -1 => Direction::LowerBetter,
            _ => Direction::Neutral,
        }
    }
}

impl<'de> Deserialize<'de> for Direction {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Code(i64),
            Name(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Code(code) => Ok(Direction::from_code(code)),
            Raw::Name(name) => match name.as_str() {
                "higher-better" => Ok(Direction::HigherBetter),
                "lower-better" => Ok(Direction::LowerBetter),
                "neutral" => Ok(Direction::Neutral),
                other => Err(de::Error::unknown_variant(other, Self::NAMES)),
            },
        }
    }
}

/// A metric definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metric {
    /// Unique metric key
    pub key: String,
    /// Value type
    #[serde(rename = "type")]
    pub metric_type: MetricType,
    /// Improvement direction
    #[serde(default)]
    pub direction: Direction,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Metric {
    /// Create a metric without a display name.
    pub fn new(key: impl Into<String>, metric_type: MetricType, direction: Direction) -> Self {
        Self {
            key: key.into(),
            metric_type,
            direction,
            name: None,
        }
    }

    /// Builder: attach a display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Display name, falling back to the key.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.key)
    }
}

static BUILTIN_CATALOG: Lazy<MetricCatalog> = Lazy::new(|| {
    use Direction::{HigherBetter, LowerBetter, Neutral};
    use MetricType::{Duration, Level, Numeric, Percent, Rating};

    let definitions = [
        (keys::VIOLATIONS, Numeric, LowerBetter, "Issues"),
        (keys::BUGS, Numeric, LowerBetter, "Bugs"),
        (keys::VULNERABILITIES, Numeric, LowerBetter, "Vulnerabilities"),
        (keys::CODE_SMELLS, Numeric, LowerBetter, "Code Smells"),
        (keys::RELIABILITY_RATING, Rating, LowerBetter, "Reliability Rating"),
        (keys::SECURITY_RATING, Rating, LowerBetter, "Security Rating"),
        (keys::SQALE_RATING, Rating, LowerBetter, "Maintainability Rating"),
        (keys::SQALE_INDEX, Duration, LowerBetter, "Technical Debt"),
        (keys::COVERAGE, Percent, HigherBetter, "Coverage"),
        (keys::LINES_TO_COVER, Numeric, Neutral, "Lines to Cover"),
        (keys::UNCOVERED_LINES, Numeric, LowerBetter, "Uncovered Lines"),
        (keys::NCLOC, Numeric, Neutral, "Lines of Code"),
        (keys::DUPLICATED_LINES, Numeric, LowerBetter, "Duplicated Lines"),
        (keys::DUPLICATED_LINES_DENSITY, Percent, LowerBetter, "Duplicated Lines (%)"),
        (keys::ALERT_STATUS, Level, Neutral, "Quality Gate Status"),
    ];

    MetricCatalog::from_metrics(
        definitions
            .into_iter()
            .map(|(key, ty, dir, name)| Metric::new(key, ty, dir).with_name(name)),
    )
});

/// Lookup table from metric key to definition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricCatalog {
    metrics: IndexMap<String, Metric>,
}

impl MetricCatalog {
    /// Catalog of the well-known metrics.
    pub fn builtin() -> &'static MetricCatalog {
        &BUILTIN_CATALOG
    }

    /// Catalog holding exactly the given metrics; later duplicates win.
    pub fn from_metrics(metrics: impl IntoIterator<Item = Metric>) -> Self {
        Self {
            metrics: metrics.into_iter().map(|m| (m.key.clone(), m)).collect(),
        }
    }

    /// Built-in metrics overridden and extended by the given ones.
    pub fn builtin_with(metrics: impl IntoIterator<Item = Metric>) -> Self {
        let mut catalog = Self::builtin().clone();
        for metric in metrics {
            catalog.metrics.insert(metric.key.clone(), metric);
        }
        catalog
    }

    /// Resolve a metric key.
    pub fn resolve(&self, key: &str) -> Option<&Metric> {
        self.metrics.get(key)
    }

    /// Type of a metric key, if known.
    pub fn metric_type(&self, key: &str) -> Option<MetricType> {
        self.resolve(key).map(|m| m.metric_type)
    }

    /// All metrics, in insertion order.
    pub fn metrics(&self) -> impl Iterator<Item = &Metric> {
        self.metrics.values()
    }

    /// Number of metrics.
    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}
