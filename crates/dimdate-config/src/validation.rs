// Configuration validation
//
// Validates that required fields are present and values are sensible

use super::*;
use anyhow::{bail, Result};
use tracing::warn;

pub fn validate_config(config: &RuntimeConfig) -> Result<()> {
    validate_storage_config(&config.storage)?;
    validate_source_config(&config.source)?;
    validate_output_config(&config.output)?;
    Ok(())
}

fn validate_storage_config(config: &StorageConfig) -> Result<()> {
    match config.backend {
        StorageBackend::Fs => {
            let fs = config
                .fs
                .as_ref()
                .ok_or_else(|| anyhow::anyhow!("fs storage backend requires 'fs' configuration"))?;

            if fs.path.is_empty() {
                bail!(
                    "Filesystem path is required\n\n\
                    How to fix:\n\
                      • Environment: export {}STORAGE_PATH=/data/lake\n\
                      • TOML: [storage.fs]\n              path = \"/data/lake\"\n",
                    ENV_PREFIX
                );
            }
        }
        StorageBackend::S3 => {
            let s3 = config
                .s3
                .as_ref()
                .ok_or_else(|| anyhow::anyhow!("s3 storage backend requires 's3' configuration"))?;

            if s3.bucket.is_empty() {
                bail!(
                    "S3 bucket name is required\n\n\
                    How to fix:\n\
                      • Environment: export {}S3_BUCKET=my-bucket\n\
                      • TOML: [storage.s3]\n              bucket = \"my-bucket\"\n",
                    ENV_PREFIX
                );
            }

            if s3.region.is_empty() {
                bail!(
                    "S3 region is required\n\n\
                    How to fix:\n\
                      • Environment: export {}S3_REGION=us-east-1\n\
                      • TOML: [storage.s3]\n              region = \"us-east-1\"\n",
                    ENV_PREFIX
                );
            }
        }
    }

    Ok(())
}

fn validate_source_config(config: &SourceConfig) -> Result<()> {
    if config.suffix.is_empty() {
        bail!("source.suffix must not be empty");
    }

    if config.timestamp_column.trim().is_empty() {
        bail!("source.timestamp_column must not be empty");
    }

    if config.format == SourceFormat::Parquet && !config.suffix.ends_with(".parquet") {
        warn!(
            suffix = %config.suffix,
            "source.format is parquet but source.suffix does not end in .parquet"
        );
    }

    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> Result<()> {
    if config.row_group_size == 0 {
        bail!("output.row_group_size must be greater than 0");
    }

    if let Some(name) = &config.file_name {
        if name.is_empty() || name.contains('/') {
            bail!(
                "output.file_name must be a plain object name without '/', got '{}'",
                name
            );
        }
    }

    Ok(())
}
