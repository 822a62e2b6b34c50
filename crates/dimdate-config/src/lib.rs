// dimdate-config - Configuration for the date dimension job
//
// Supports configuration from multiple sources:
// 1. Environment variables (highest priority)
// 2. Config file path from DIMDATE_CONFIG env var
// 3. Config file contents from DIMDATE_CONFIG_CONTENT env var
// 4. Default config file locations (./dimdate.toml, ./.dimdate.toml)
// 5. Built-in defaults (lowest priority)
//
// Command-line flags are applied by the binary on top of all of these.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

mod env_overrides;
mod sources;
mod validation;

pub use env_overrides::{EnvSource, ENV_PREFIX};

/// Main runtime configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub storage: StorageConfig,
    pub source: SourceConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

/// Storage backend configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub s3: Option<S3Config>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fs: Option<FsConfig>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::S3,
            s3: Some(S3Config::default()),
            fs: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    S3,
    Fs,
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackend::S3 => write!(f, "s3"),
            StorageBackend::Fs => write!(f, "fs"),
        }
    }
}

impl std::str::FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "s3" | "aws" => Ok(StorageBackend::S3),
            "fs" | "filesystem" => Ok(StorageBackend::Fs),
            _ => anyhow::bail!("Unsupported storage backend: {}. Supported: s3, fs", s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    /// Custom endpoint for S3-compatible stores (MinIO, R2, LocalStack)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            bucket: "s3-parcial2".to_string(),
            region: "us-east-1".to_string(),
            endpoint: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FsConfig {
    pub path: String,
}

impl Default for FsConfig {
    fn default() -> Self {
        Self {
            path: "./data".to_string(),
        }
    }
}

/// Where the fact files live and how to read them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub prefix: String,
    pub suffix: String,
    pub format: SourceFormat,
    pub timestamp_column: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            prefix: "fact_rental/".to_string(),
            suffix: ".parquet".to_string(),
            format: SourceFormat::Parquet,
            timestamp_column: "rental_date".to_string(),
        }
    }
}

/// Columnar decoding used for source objects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFormat {
    Parquet,
    ArrowIpc,
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceFormat::Parquet => write!(f, "parquet"),
            SourceFormat::ArrowIpc => write!(f, "arrow_ipc"),
        }
    }
}

impl std::str::FromStr for SourceFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "parquet" => Ok(SourceFormat::Parquet),
            "arrow_ipc" | "arrow-ipc" | "ipc" | "arrow" => Ok(SourceFormat::ArrowIpc),
            _ => anyhow::bail!("Unsupported source format: {}. Supported: parquet, arrow_ipc", s),
        }
    }
}

/// Where and how the dimension table is written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub prefix: String,
    /// Object name under `prefix`; derived from the codec when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    pub compression: OutputCompression,
    pub row_group_size: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            prefix: "dim_date/".to_string(),
            file_name: None,
            compression: OutputCompression::Snappy,
            row_group_size: 32 * 1024,
        }
    }
}

impl OutputConfig {
    /// Object name, e.g. `dim_date.snappy.parquet`
    pub fn file_name(&self) -> String {
        self.file_name
            .clone()
            .unwrap_or_else(|| format!("dim_date.{}.parquet", self.compression))
    }

    /// Full destination key, e.g. `dim_date/dim_date.snappy.parquet`
    pub fn object_key(&self) -> String {
        format!("{}{}", normalize_prefix(&self.prefix), self.file_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputCompression {
    Snappy,
    Zstd,
    Uncompressed,
}

impl std::fmt::Display for OutputCompression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputCompression::Snappy => write!(f, "snappy"),
            OutputCompression::Zstd => write!(f, "zstd"),
            OutputCompression::Uncompressed => write!(f, "uncompressed"),
        }
    }
}

impl std::str::FromStr for OutputCompression {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "snappy" => Ok(OutputCompression::Snappy),
            "zstd" => Ok(OutputCompression::Zstd),
            "uncompressed" | "none" => Ok(OutputCompression::Uncompressed),
            _ => anyhow::bail!(
                "Unsupported output compression: {}. Supported: snappy, zstd, uncompressed",
                s
            ),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => anyhow::bail!("Unsupported log format: {}. Supported: text, json", s),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from all sources with priority
    pub fn load() -> Result<Self> {
        sources::load_config()
    }

    /// Load configuration from a specific file path (for CLI usage).
    pub fn load_from_path(path: impl AsRef<std::path::Path>) -> Result<Self> {
        sources::load_from_file_path(path)
    }

    /// Parse TOML content on top of the built-in defaults, without consulting
    /// the environment.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut config: RuntimeConfig =
            toml::from_str(content).context("Failed to parse config content")?;
        config.normalize();
        Ok(config)
    }

    /// Apply environment overrides from a custom source.
    pub fn apply_env_overrides_from<E: EnvSource>(&mut self, env: &E) -> Result<()> {
        env_overrides::apply_env_overrides(self, env)?;
        self.normalize();
        Ok(())
    }

    /// Canonicalize prefixes so keys can be built by concatenation.
    pub fn normalize(&mut self) {
        self.source.prefix = normalize_prefix(&self.source.prefix);
        self.output.prefix = normalize_prefix(&self.output.prefix);
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }
}

/// `""` stays the bucket root; anything else gains a trailing `/` and loses a
/// leading one.
pub fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_start_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{}/", trimmed)
    }
}
