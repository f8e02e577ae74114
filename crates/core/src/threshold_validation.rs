//! Range checks for configuration values. Each returns
//! `CoreError::Validation` with a message naming the offending field.

use crate::error::CoreError;

/// Ratios and smoothing factors: `[0.0, 1.0]`.
pub fn validate_unit_range(value: f64, name: &str) -> Result<(), CoreError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(CoreError::Validation(format!(
            "{name} must be a ratio in [0, 1], got {value}"
        )));
    }
    Ok(())
}

/// Validate that an angle threshold lies within `[0.0, 180.0]` degrees.
pub fn validate_degrees(value: f64, name: &str) -> Result<(), CoreError> {
    if !(0.0..=180.0).contains(&value) {
        return Err(CoreError::Validation(format!(
            "{name} must be between 0 and 180 degrees, got {value}"
        )));
    }
    Ok(())
}

/// Validate that a value is finite and strictly positive.
pub fn validate_positive(value: f64, name: &str) -> Result<(), CoreError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(CoreError::Validation(format!(
            "{name} must be > 0, got {value}"
        )));
    }
    Ok(())
}
