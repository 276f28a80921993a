//! Typed measure values.
//!
//! The server reports every measure as a string. The parsers here turn those
//! strings into ratings, quality gate levels, work durations and plain
//! numbers, each with a numeric projection usable on a chart axis.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::errors::{ActivityError, Result};

/// Maintainability/reliability/security rating, A (best) to E (worst).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rating {
    /// 1
    A = 1,
    /// 2
    B = 2,
    /// 3
    C = 3,
    /// 4
    D = 4,
    /// 5
    E = 5,
}

impl Rating {
    const ALL: [Rating; 5] = [Rating::A, Rating::B, Rating::C, Rating::D, Rating::E];

    /// Numeric rank, 1 for A through 5 for E.
    pub fn rank(self) -> u8 {
        self as u8
    }

    /// Rating for a numeric rank in 1..=5.
    pub fn from_rank(rank: u8) -> Option<Self> {
        Self::ALL.get(usize::from(rank).checked_sub(1)?).copied()
    }

    /// Letter shown to users.
    pub fn letter(self) -> char {
        match self {
            Rating::A => 'A',
            Rating::B => 'B',
            Rating::C => 'C',
            Rating::D => 'D',
            Rating::E => 'E',
        }
    }
}

impl FromStr for Rating {
    type Err = ActivityError;

    /// Accepts a letter (`"B"`) or the server's numeric encoding (`"2"`, `"2.0"`).
    fn from_str(input: &str) -> Result<Self> {
        let by_letter = match input {
            "A" => Some(Rating::A),
            "B" => Some(Rating::B),
            "C" => Some(Rating::C),
            "D" => Some(Rating::D),
            "E" => Some(Rating::E),
            _ => None,
        };
        if let Some(rating) = by_letter {
            return Ok(rating);
        }

        input
            .parse::<f64>()
            .ok()
            .filter(|n| n.fract() == 0.0 && (1.0..=5.0).contains(n))
            .and_then(|n| Rating::from_rank(n as u8))
            .ok_or_else(|| ActivityError::parse_expecting(input, "invalid rating", "A-E or 1-5"))
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Quality gate status level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    /// Gate passed
    Ok,
    /// Gate passed with warnings (legacy servers)
    Warn,
    /// Gate failed
    Error,
}

impl Level {
    /// Numeric rank on a chart axis, OK lowest.
    pub fn rank(self) -> u8 {
        match self {
            Level::Ok => 1,
            Level::Warn => 2,
            Level::Error => 3,
        }
    }

    /// Whether the gate passed at this level.
    pub fn is_passing(self) -> bool {
        !matches!(self, Level::Error)
    }
}

impl FromStr for Level {
    type Err = ActivityError;

    fn from_str(input: &str) -> Result<Self> {
        match input {
            "OK" => Ok(Level::Ok),
            "WARN" => Ok(Level::Warn),
            "ERROR" => Ok(Level::Error),
            _ => Err(ActivityError::parse_expecting(
                input,
                "invalid quality gate level",
                "OK, WARN or ERROR",
            )),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Level::Ok => "OK",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        };
        f.write_str(label)
    }
}

/// Technical debt expressed in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WorkDuration {
    minutes: i64,
}

const DURATION_GRAMMAR: &str = "[Nd][Nh][Nm] or a number of minutes";

impl WorkDuration {
    /// Wrap a number of minutes.
    pub fn from_minutes(minutes: i64) -> Self {
        Self { minutes }
    }

    /// Total minutes.
    pub fn minutes(self) -> i64 {
        self.minutes
    }

    /// Parse `2d3h15m`-style input (each component optional, in that order)
    /// or a bare integer number of minutes.
    pub fn parse(input: &str, hours_per_day: u32) -> Result<Self> {
        let invalid =
            || ActivityError::parse_expecting(input, "invalid duration", DURATION_GRAMMAR);

        if let Ok(minutes) = input.parse::<i64>() {
            return Ok(Self::from_minutes(minutes));
        }

        let minutes_per_unit = |unit: char| match unit {
            'd' => Some(i64::from(hours_per_day) * 60),
            'h' => Some(60),
            'm' => Some(1),
            _ => None,
        };

        let mut total: i64 = 0;
        let mut digits = String::new();
        // Units must appear in d, h, m order and at most once.
        let mut last_unit_rank = 0;

        for c in input.chars() {
            if c.is_ascii_digit() {
                digits.push(c);
                continue;
            }
            let per_unit = minutes_per_unit(c).ok_or_else(invalid)?;
            let rank = match c {
                'd' => 1,
                'h' => 2,
                _ => 3,
            };
            if digits.is_empty() || rank <= last_unit_rank {
                return Err(invalid());
            }
            let amount: i64 = digits.parse().map_err(|_| invalid())?;
            total = amount
                .checked_mul(per_unit)
                .and_then(|m| total.checked_add(m))
                .ok_or_else(invalid)?;
            digits.clear();
            last_unit_rank = rank;
        }

        if !digits.is_empty() || last_unit_rank == 0 {
            return Err(invalid());
        }

        Ok(Self::from_minutes(total))
    }

    /// Render back into the `NdNhNm` grammar, omitting zero components.
    pub fn format(self, hours_per_day: u32) -> String {
        let minutes_per_day = i64::from(hours_per_day.max(1)) * 60;
        let sign = if self.minutes < 0 { "-" } else { "" };
        let mut remaining = self.minutes.abs();

        let days = remaining / minutes_per_day;
        remaining %= minutes_per_day;
        let hours = remaining / 60;
        let minutes = remaining % 60;

        let mut out = String::from(sign);
        if days > 0 {
            out.push_str(&format!("{days}d"));
        }
        if hours > 0 {
            out.push_str(&format!("{hours}h"));
        }
        if minutes > 0 || (days == 0 && hours == 0) {
            out.push_str(&format!("{minutes}m"));
        }
        out
    }
}

/// A measure value after type-directed parsing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum MeasureValue {
    /// Counts, percentages and durations (in minutes)
    Number(f64),
    /// Letter rating
    Rating(Rating),
    /// Quality gate level
    Level(Level),
}

impl MeasureValue {
    /// Projection onto a chart axis.
    pub fn as_f64(&self) -> f64 {
        match self {
            MeasureValue::Number(n) => *n,
            MeasureValue::Rating(r) => f64::from(r.rank()),
            MeasureValue::Level(l) => f64::from(l.rank()),
        }
    }
}

/// Parse a decimal number, rejecting NaN and infinities.
pub fn parse_number(input: &str) -> Result<f64> {
    let value: f64 = input
        .parse()
        .map_err(|_| ActivityError::parse_expecting(input, "invalid number", "decimal number"))?;
    if !value.is_finite() {
        return Err(ActivityError::parse_expecting(
            input,
            "number is not finite",
            "decimal number",
        ));
    }
    Ok(value)
}

/// Parse a percentage, with or without a trailing `%`.
pub fn parse_percent(input: &str) -> Result<f64> {
    parse_number(input.strip_suffix('%').unwrap_or(input))
}
