//! Error types for the pure date dimension layer

use arrow::datatypes::DataType;
use arrow::error::ArrowError;
use parquet::errors::ParquetError;
use thiserror::Error;

/// Errors raised while normalizing fact timestamps or encoding the dimension
#[derive(Debug, Error)]
pub enum CoreError {
    /// The timestamp column has a type that cannot carry a date or time
    #[error("column type {data_type} cannot be read as a date/time")]
    UnsupportedType { data_type: DataType },

    /// A timezone-aware timestamp column names a zone we cannot resolve
    #[error("invalid timezone '{timezone}': {reason}")]
    InvalidTimezone { timezone: String, reason: String },

    #[error("arrow error: {0}")]
    Arrow(#[from] ArrowError),

    #[error("parquet error: {0}")]
    Parquet(#[from] ParquetError),
}

/// Result type alias for CoreError
pub type Result<T> = std::result::Result<T, CoreError>;
