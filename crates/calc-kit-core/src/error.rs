use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CalcError {
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Mismatched series: {left} has {left_len} points, {right} has {right_len}")]
    MismatchedSeries {
        left: String,
        left_len: usize,
        right: String,
        right_len: usize,
    },

    #[error("Value {value} matched no band in threshold table '{table}'")]
    UnclassifiedValue { table: String, value: Decimal },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl CalcError {
    /// Shorthand for the most common validation failure.
    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Arithmetic on `field` left the representable decimal range.
    pub fn overflow(field: &str, operation: &str) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            reason: format!("{operation} overflows decimal range"),
        }
    }
}

impl From<serde_json::Error> for CalcError {
    fn from(e: serde_json::Error) -> Self {
        CalcError::SerializationError(e.to_string())
    }
}
