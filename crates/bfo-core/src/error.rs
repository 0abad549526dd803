//! Error types for report operations.
//!
//! This module defines [`BfoError`] which covers all error cases that can occur
//! when searching, fetching or extracting BFO financial reports.

use thiserror::Error;

/// Errors that can occur during report operations.
#[derive(Error, Debug)]
pub enum BfoError {
    /// Network or HTTP-level failure (non-2xx status, timeout, connection failure).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The identifier or query is unknown to the remote service.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A search matched several organizations and none of them exactly.
    #[error("Ambiguous search: {0}")]
    Ambiguous(String),

    /// No recognizable row for a line item under any known taxonomy.
    #[error("Field not found in any known taxonomy: {field}")]
    FieldNotFound {
        /// The line item that could not be located (e.g. "revenue").
        field: String,
    },

    /// A matching row exists but its leading value is missing or blank.
    #[error("No data for {field} (row {code})")]
    NoData {
        /// The line item that was located.
        field: String,
        /// Row code of the matched row.
        code: String,
    },

    /// The payload did not match the expected shape.
    #[error("Parse error: {0}")]
    Parse(String),

    /// An invalid parameter was provided.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

impl BfoError {
    /// Shorthand for [`BfoError::FieldNotFound`].
    pub fn field_not_found(field: impl Into<String>) -> Self {
        Self::FieldNotFound {
            field: field.into(),
        }
    }

    /// Shorthand for [`BfoError::NoData`].
    pub fn no_data(field: impl Into<String>, code: impl Into<String>) -> Self {
        Self::NoData {
            field: field.into(),
            code: code.into(),
        }
    }
}

/// Result type alias using [`BfoError`].
pub type Result<T> = std::result::Result<T, BfoError>;
