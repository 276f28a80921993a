//! Error types for the activity-graphs library.
//!
//! Errors raised while shaping measure history are almost always absorbed
//! locally: a malformed point becomes a gap, an unresolvable metric is skipped
//! and excess graphs are truncated. The variants below exist so that the
//! strict entry points and the configuration layer can report precisely what
//! went wrong.

use std::io;
use std::num::ParseFloatError;

use thiserror::Error;

/// Main result type for activity-graphs operations.
pub type Result<T> = std::result::Result<T, ActivityError>;

/// Error type for all activity-graphs operations.
#[derive(Error, Debug)]
pub enum ActivityError {
    /// Malformed date or measure value
    #[error("Parse error: {message} (input: {input:?})")]
    Parse {
        /// Raw input that failed to parse
        input: String,
        /// Error description
        message: String,
        /// Expected format, when one applies
        expected: Option<String>,
    },

    /// Unknown graph type, unresolvable metric, or bad configuration value
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error description
        message: String,
        /// Configuration field or metric key that caused the error
        field: Option<String>,
    },

    /// More compatible series than graph slots
    #[error("Capacity exceeded: {requested} graphs requested, {capacity} available")]
    CapacityExceeded {
        /// Number of graphs the input would produce
        requested: usize,
        /// Maximum number of graphs allowed
        capacity: usize,
        /// Metric keys that did not fit
        dropped: Vec<String>,
    },

    /// I/O related errors (config and snapshot files)
    #[error("I/O error: {message}")]
    Io {
        /// Human-readable error message
        message: String,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error description
        message: String,
        /// Data format being (de)serialized
        data_type: Option<String>,
        /// Underlying serialization error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Validation errors for configuration values
    #[error("Validation error: {message}")]
    Validation {
        /// Error description
        message: String,
        /// Field that failed validation
        field: Option<String>,
    },
}

impl ActivityError {
    /// Create a new parse error
    pub fn parse(input: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            input: input.into(),
            message: message.into(),
            expected: None,
        }
    }

    /// Create a new parse error naming the expected format
    pub fn parse_expecting(
        input: impl Into<String>,
        message: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::Parse {
            input: input.into(),
            message: message.into(),
            expected: Some(expected.into()),
        }
    }

    /// Create a new configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            field: None,
        }
    }

    /// Create a new configuration error with field context
    pub fn configuration_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a new capacity error
    pub fn capacity(requested: usize, capacity: usize, dropped: Vec<String>) -> Self {
        Self::CapacityExceeded {
            requested,
            capacity,
            dropped,
        }
    }

    /// Create a new I/O error with context
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a new validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: None,
        }
    }

    /// Create a new validation error with field context
    pub fn validation_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Whether the error is absorbed by the aggregation pipeline.
    ///
    /// Parse, configuration and capacity errors are recovered locally; the
    /// remaining variants only come out of file handling.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Parse { .. } | Self::Configuration { .. } | Self::CapacityExceeded { .. }
        )
    }
}

impl From<io::Error> for ActivityError {
    fn from(err: io::Error) -> Self {
        Self::io("I/O operation failed", err)
    }
}

impl From<serde_json::Error> for ActivityError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: format!("JSON serialization failed: {err}"),
            data_type: Some("JSON".to_string()),
            source: Some(Box::new(err)),
        }
    }
}

impl From<serde_yaml::Error> for ActivityError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization {
            message: format!("YAML serialization failed: {err}"),
            data_type: Some("YAML".to_string()),
            source: Some(Box::new(err)),
        }
    }
}

impl From<ParseFloatError> for ActivityError {
    fn from(err: ParseFloatError) -> Self {
        Self::parse_expecting("", format!("Invalid float: {err}"), "decimal number")
    }
}
