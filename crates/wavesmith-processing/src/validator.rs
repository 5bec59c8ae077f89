/// Validation errors raised before any temp file exists.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid value for '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Invalid reverb options: {0}")]
    InvalidFilter(String),

    #[error("{operation} requires {expected} input file(s), got {actual}")]
    InputCount {
        operation: &'static str,
        expected: usize,
        actual: usize,
    },
}

impl ValidationError {
    pub(crate) fn parameter(name: &'static str, reason: impl Into<String>) -> Self {
        ValidationError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Require a finite number inside `[min, max]`.
pub(crate) fn require_range(
    name: &'static str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::parameter(name, "must be a finite number"));
    }
    if value < min || value > max {
        return Err(ValidationError::parameter(
            name,
            format!("must be between {} and {}", min, max),
        ));
    }
    Ok(())
}
