// dimdate - Derive a date dimension from fact tables in object storage
//
// One linear pass per invocation:
//   list sources → load + normalize timestamps → build dimension → encode → upload
//
// The pure derivation lives in dimdate-core; this crate owns the I/O around it.

use arrow::array::AsArray;
use arrow::datatypes::TimestampMicrosecondType;
use dimdate_config::RuntimeConfig;
use dimdate_core::DateDimension;
use opendal::Operator;

mod error;
mod init;
pub mod loader;
pub mod source;
pub mod storage;
pub mod writer;

pub use error::{ErrorCode, JobError, Result};
pub use init::init_tracing;
pub use loader::{load_facts, load_file, FactTable, LoadedFile};
pub use source::list_sources;
pub use storage::build_operator;
pub use writer::{encode_dimension, write_table, EncodedTable};

/// Everything a run needs: where to read and write, and how.
#[derive(Debug, Clone)]
pub struct JobContext {
    pub operator: Operator,
    pub config: RuntimeConfig,
    /// Build and encode the dimension but skip the upload
    pub dry_run: bool,
}

impl JobContext {
    pub fn new(operator: Operator, config: RuntimeConfig) -> Self {
        Self {
            operator,
            config,
            dry_run: false,
        }
    }

    /// Build the storage operator described by `config.storage`.
    pub fn from_config(config: RuntimeConfig) -> Result<Self> {
        let operator = build_operator(&config.storage)?;
        Ok(Self::new(operator, config))
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// What a run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSummary {
    pub files_read: usize,
    pub rows_loaded: usize,
    pub rows_dropped: usize,
    pub distinct_dates: usize,
    pub output_path: String,
    /// Size of the encoded table; nothing is uploaded on a dry run
    pub bytes_written: usize,
    pub dry_run: bool,
}

/// Run the full job once.
///
/// Aborts on the first unrecoverable error; the upload happens only after the
/// whole dimension has been built and encoded.
pub async fn run_job(ctx: &JobContext) -> Result<JobSummary> {
    let source = &ctx.config.source;
    let op = &ctx.operator;

    let paths = list_sources(op, &source.prefix, &source.suffix).await?;
    let facts = load_facts(op, &paths, source).await?;

    let timestamps = facts
        .batch
        .column(0)
        .as_primitive_opt::<TimestampMicrosecondType>()
        .ok_or_else(|| JobError::Decode {
            path: source.prefix.clone(),
            reason: "combined fact column is not a microsecond timestamp".to_string(),
        })?;
    let dimension = DateDimension::from_timestamp_array(timestamps);
    tracing::info!(distinct_dates = dimension.len(), "Built date dimension");

    let batch = dimension.to_record_batch()?;
    let encoded = encode_dimension(&batch, &ctx.config.output, &source.prefix)?;
    let output_path = encoded.path.clone();

    let bytes_written = if ctx.dry_run {
        let size = encoded.bytes.len();
        tracing::info!(path = %output_path, bytes = size, "Dry run, skipping upload");
        size
    } else {
        write_table(op, encoded).await?
    };

    Ok(JobSummary {
        files_read: facts.files_read,
        rows_loaded: facts.rows_read,
        rows_dropped: facts.rows_dropped,
        distinct_dates: dimension.len(),
        output_path,
        bytes_written,
        dry_run: ctx.dry_run,
    })
}
