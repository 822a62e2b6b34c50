//! Error types for the date dimension job.

use arrow::datatypes::DataType;
use dimdate_core::CoreError;
use thiserror::Error;

/// Error codes for programmatic handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// E001: No source objects matched the prefix and suffix
    E001NotFound,
    /// E002: A source file lacks the timestamp column
    E002Schema,
    /// E003: Timestamp column has a type we cannot interpret
    E003UnsupportedType,
    /// E004: Object storage operation failed
    E004Storage,
    /// E005: Source file could not be decoded
    E005Decode,
    /// E006: Dimension table could not be encoded
    E006Encode,
    /// E007: Configuration missing or invalid
    E007InvalidConfig,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::E001NotFound => "E001",
            Self::E002Schema => "E002",
            Self::E003UnsupportedType => "E003",
            Self::E004Storage => "E004",
            Self::E005Decode => "E005",
            Self::E006Encode => "E006",
            Self::E007InvalidConfig => "E007",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that abort a dimension build. None are retried.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("[E001] No source files matching '*{suffix}' under '{prefix}'")]
    NotFound { prefix: String, suffix: String },

    #[error("[E002] Source file '{path}' has no '{column}' column")]
    Schema { path: String, column: String },

    #[error("[E003] Column '{column}' in '{path}' has type {data_type}, which is not a date/time")]
    UnsupportedType {
        path: String,
        column: String,
        data_type: DataType,
    },

    #[error("[E004] Storage {operation} failed for '{path}': {reason}")]
    Storage {
        operation: &'static str,
        path: String,
        reason: String,
    },

    #[error("[E005] Failed to decode '{path}': {reason}")]
    Decode { path: String, reason: String },

    #[error("[E006] Failed to encode date dimension: {reason}")]
    Encode { reason: String },

    #[error("[E007] Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl JobError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound { .. } => ErrorCode::E001NotFound,
            Self::Schema { .. } => ErrorCode::E002Schema,
            Self::UnsupportedType { .. } => ErrorCode::E003UnsupportedType,
            Self::Storage { .. } => ErrorCode::E004Storage,
            Self::Decode { .. } => ErrorCode::E005Decode,
            Self::Encode { .. } => ErrorCode::E006Encode,
            Self::InvalidConfig { .. } => ErrorCode::E007InvalidConfig,
        }
    }

    pub(crate) fn storage(operation: &'static str, path: &str, err: opendal::Error) -> Self {
        Self::Storage {
            operation,
            path: path.to_string(),
            reason: err.to_string(),
        }
    }

    pub(crate) fn decode(path: &str, err: impl std::fmt::Display) -> Self {
        Self::Decode {
            path: path.to_string(),
            reason: err.to_string(),
        }
    }

    /// Attach the file and column a core failure happened on.
    pub(crate) fn from_core(err: CoreError, path: &str, column: &str) -> Self {
        match err {
            CoreError::UnsupportedType { data_type } => Self::UnsupportedType {
                path: path.to_string(),
                column: column.to_string(),
                data_type,
            },
            other => Self::decode(path, other),
        }
    }
}

impl From<CoreError> for JobError {
    fn from(err: CoreError) -> Self {
        Self::Encode {
            reason: err.to_string(),
        }
    }
}

/// Result type alias for JobError
pub type Result<T> = std::result::Result<T, JobError>;
