//! Validation helper functions for configuration types.

use crate::core::errors::{ActivityError, Result};

/// Validate that a usize value is greater than zero.
pub fn validate_positive_usize(value: usize, field: &str) -> Result<()> {
    if value == 0 {
        return Err(ActivityError::validation_field(
            format!("{} must be greater than 0", field),
            field,
        ));
    }
    Ok(())
}

/// Validate that a u32 value is within a bounded range (inclusive).
pub fn validate_bounded_u32(value: u32, min: u32, max: u32, field: &str) -> Result<()> {
    if value < min || value > max {
        return Err(ActivityError::validation_field(
            format!("{} must be between {} and {}", field, min, max),
            field,
        ));
    }
    Ok(())
}
