use super::{
    FsConfig, LogFormat, OutputCompression, RuntimeConfig, S3Config, SourceFormat,
    StorageBackend,
};
use anyhow::{anyhow, Context, Result};
use std::collections::HashMap;

pub const ENV_PREFIX: &str = "DIMDATE_";

/// Abstraction over environment-variable lookups so tests can supply their own
/// source of overrides. Keys are given without the `DIMDATE_` prefix.
pub trait EnvSource {
    fn get(&self, key: &str) -> Option<String>;
}

/// In-memory source keyed without the prefix, e.g. `"S3_BUCKET"`.
impl EnvSource for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

/// Apply environment-variable overrides (highest priority) to the runtime config.
pub fn apply_env_overrides<E: EnvSource>(config: &mut RuntimeConfig, env: &E) -> Result<()> {
    // Storage backend
    if let Some(backend) = get_env_string(env, "STORAGE_BACKEND") {
        config.storage.backend = backend
            .parse::<StorageBackend>()
            .context("Invalid DIMDATE_STORAGE_BACKEND value")?;
    }
    // Filesystem storage
    if let Some(path) = get_env_string(env, "STORAGE_PATH") {
        config.storage.fs.get_or_insert_with(FsConfig::default).path = path;
    }

    // S3 storage
    if let Some(bucket) = get_env_string(env, "S3_BUCKET") {
        ensure_s3(config).bucket = bucket;
    }
    if let Some(region) = get_env_string(env, "S3_REGION") {
        ensure_s3(config).region = region;
    }
    if let Some(endpoint) = get_env_string(env, "S3_ENDPOINT") {
        ensure_s3(config).endpoint = Some(endpoint);
    }

    // Source files
    if let Some(prefix) = get_env_string(env, "SOURCE_PREFIX") {
        config.source.prefix = prefix;
    }
    if let Some(suffix) = get_env_string(env, "SOURCE_SUFFIX") {
        config.source.suffix = suffix;
    }
    if let Some(format) = get_env_string(env, "SOURCE_FORMAT") {
        config.source.format = format
            .parse::<SourceFormat>()
            .context("Invalid DIMDATE_SOURCE_FORMAT value")?;
    }
    if let Some(column) = get_env_string(env, "TIMESTAMP_COLUMN") {
        config.source.timestamp_column = column;
    }

    // Output
    if let Some(prefix) = get_env_string(env, "OUTPUT_PREFIX") {
        config.output.prefix = prefix;
    }
    if let Some(name) = get_env_string(env, "OUTPUT_FILE_NAME") {
        config.output.file_name = Some(name);
    }
    if let Some(compression) = get_env_string(env, "OUTPUT_COMPRESSION") {
        config.output.compression = compression
            .parse::<OutputCompression>()
            .context("Invalid DIMDATE_OUTPUT_COMPRESSION value")?;
    }
    if let Some(val) = get_env_usize(env, "ROW_GROUP_SIZE")? {
        config.output.row_group_size = val;
    }

    // Logging
    if let Some(level) = get_env_string(env, "LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(format) = get_env_string(env, "LOG_FORMAT") {
        config.logging.format = format
            .parse::<LogFormat>()
            .context("Invalid DIMDATE_LOG_FORMAT value")?;
    }

    Ok(())
}

fn ensure_s3(config: &mut RuntimeConfig) -> &mut S3Config {
    config.storage.s3.get_or_insert_with(|| S3Config {
        bucket: String::new(),
        region: String::new(),
        endpoint: None,
    })
}

fn get_env_string<E: EnvSource>(env: &E, key: &str) -> Option<String> {
    env.get(key).filter(|v| !v.trim().is_empty())
}

fn get_env_usize<E: EnvSource>(env: &E, key: &str) -> Result<Option<usize>> {
    match get_env_string(env, key) {
        Some(val) => {
            let parsed = val
                .trim()
                .parse::<usize>()
                .map_err(|e| anyhow!("Failed to parse {}{}: {}", ENV_PREFIX, key, e))?;
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}
