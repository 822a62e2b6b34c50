//! Storage operator construction.
//!
//! The operator is built once by the caller and handed to the job inside a
//! [`JobContext`](crate::JobContext); nothing here is global.

use dimdate_config::{StorageBackend, StorageConfig};
use opendal::Operator;

use crate::error::{JobError, Result};

/// Build an opendal operator for the configured backend.
///
/// S3 credentials come from the standard AWS chain (env vars, profile,
/// instance metadata); they are never part of the config.
pub fn build_operator(config: &StorageConfig) -> Result<Operator> {
    let operator = match config.backend {
        StorageBackend::Fs => {
            let fs = config.fs.as_ref().ok_or_else(|| JobError::InvalidConfig {
                message: "fs config required for filesystem backend".to_string(),
            })?;

            let fs_builder = opendal::services::Fs::default().root(&fs.path);
            Operator::new(fs_builder)
                .map_err(|e| JobError::InvalidConfig {
                    message: format!("Failed to create filesystem operator: {}", e),
                })?
                .finish()
        }
        StorageBackend::S3 => {
            let s3 = config.s3.as_ref().ok_or_else(|| JobError::InvalidConfig {
                message: "s3 config required for S3 backend".to_string(),
            })?;

            let mut s3_builder = opendal::services::S3::default()
                .bucket(&s3.bucket)
                .region(&s3.region);

            if let Some(endpoint) = &s3.endpoint {
                s3_builder = s3_builder.endpoint(endpoint);
            }

            Operator::new(s3_builder)
                .map_err(|e| JobError::InvalidConfig {
                    message: format!("Failed to create S3 operator: {}", e),
                })?
                .finish()
        }
    };

    tracing::debug!(backend = %config.backend, "Storage operator initialized");
    Ok(operator)
}
