//! Tolerant parsing of free-form percentage input

use crate::error::{Result, ValuationError};

/// Parse a percentage typed by a user.
///
/// Thousands separators and surrounding whitespace are ignored, and a blank
/// field reads as zero. Anything that is not a finite number is rejected.
pub fn parse_percentage(input: &str) -> Result<f64> {
    let cleaned: String = input.trim().chars().filter(|&c| c != ',').collect();

    if cleaned.is_empty() {
        return Ok(0.0);
    }

    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ValuationError::InvalidNumber {
            input: input.to_string(),
        }),
    }
}
