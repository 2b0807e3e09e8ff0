//! Error types for sorm

use std::num::ParseIntError;
use thiserror::Error;

/// Result type alias for sorm operations
pub type SormResult<T> = Result<T, SormError>;

/// Error types for statement compilation and execution
#[derive(Debug, Error)]
pub enum SormError {
    /// Builder state is incomplete (empty table, field list or payload).
    ///
    /// Raised before any I/O is attempted.
    #[error("Validation error: {0}")]
    Validation(String),

    /// An aggregate result cell could not be parsed as an integer
    #[error("Type conversion error on column '{column}': cannot parse '{value}' as integer")]
    TypeConversion {
        column: String,
        value: String,
        #[source]
        source: ParseIntError,
    },

    /// A single result row could not be materialized
    #[error("Scan error: {0}")]
    Scan(String),

    /// Error reported by the execution layer, passed through untouched
    #[error("{0}")]
    Driver(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl SormError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a scan error
    pub fn scan(message: impl Into<String>) -> Self {
        Self::Scan(message.into())
    }

    /// Wrap an execution-layer error without altering it
    pub fn driver(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Driver(err.into())
    }

    pub(crate) fn type_conversion(
        column: impl Into<String>,
        value: impl Into<String>,
        source: ParseIntError,
    ) -> Self {
        Self::TypeConversion {
            column: column.into(),
            value: value.into(),
            source,
        }
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is a type conversion error
    pub fn is_type_conversion(&self) -> bool {
        matches!(self, Self::TypeConversion { .. })
    }

    /// Check if this error came from the execution layer
    pub fn is_driver(&self) -> bool {
        matches!(self, Self::Driver(_))
    }
}
