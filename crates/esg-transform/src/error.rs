//! Error types for table transforms.

use esg_model::ModelError;
use thiserror::Error;

/// Errors raised by the transform stages.
#[derive(Debug, Error)]
pub enum TransformError {
    // === Schema Errors ===
    /// An expected column (identifier, cycle marker, indicator code) is absent.
    ///
    /// Non-fatal by policy: callers log it and skip the affected step.
    #[error("column '{expected}' not found ({context})")]
    SchemaMismatch { expected: String, context: String },

    /// The table does not have the structure the positional rules assume.
    #[error("unexpected table layout: {0}")]
    Layout(String),

    /// The join key column is missing from one of the merged tables.
    #[error("join key '{key}' missing from the {year} table")]
    MissingKey { key: String, year: String },

    /// A column name given by the caller does not exist.
    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    // === Model Errors ===
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("statistics failed: {0}")]
    Stats(#[from] polars::error::PolarsError),
}

/// Result type for transform operations.
pub type Result<T> = std::result::Result<T, TransformError>;

impl TransformError {
    pub fn schema_mismatch(expected: impl Into<String>, context: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            expected: expected.into(),
            context: context.into(),
        }
    }

    /// True for conditions the pipelines downgrade to a warning.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::SchemaMismatch { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_mismatch_display() {
        let err = TransformError::schema_mismatch("Q36", "ratio of promoted managers");
        assert_eq!(
            err.to_string(),
            "column 'Q36' not found (ratio of promoted managers)"
        );
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_layout_is_fatal() {
        let err = TransformError::Layout("5 columns".to_string());
        assert!(!err.is_recoverable());
    }
}
