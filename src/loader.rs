//! Table loading: fetch fact files and reduce them to one timestamp column.

use std::io::Cursor;
use std::sync::Arc;

use arrow::array::{ArrayRef, RecordBatch, TimestampMicrosecondArray};
use arrow::compute::concat_batches;
use arrow::datatypes::{Schema, SchemaRef};
use arrow::ipc::reader::FileReader;
use bytes::Bytes;
use dimdate_config::{SourceConfig, SourceFormat};
use dimdate_core::{fact_schema, normalize_timestamps};
use opendal::Operator;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ProjectionMask;

use crate::error::{JobError, Result};

/// The timestamps of a single source file, nulls and unparseable values removed.
#[derive(Debug)]
pub struct LoadedFile {
    pub path: String,
    pub batch: RecordBatch,
    /// Rows present in the file
    pub rows_read: usize,
    /// Rows excluded because the timestamp was missing or unparseable
    pub rows_dropped: usize,
    /// The subset of `rows_dropped` that held a value which could not be read
    pub rows_unparseable: usize,
}

/// All fact files concatenated into the single-column fact table.
#[derive(Debug)]
pub struct FactTable {
    pub batch: RecordBatch,
    pub files_read: usize,
    pub rows_read: usize,
    pub rows_dropped: usize,
    pub rows_unparseable: usize,
}

/// Read and concatenate every file in `paths`, in order.
///
/// The first failing file aborts the load.
pub async fn load_facts(
    op: &Operator,
    paths: &[String],
    source: &SourceConfig,
) -> Result<FactTable> {
    let schema: SchemaRef = Arc::new(fact_schema(&source.timestamp_column));
    let mut batches = Vec::with_capacity(paths.len());
    let mut rows_read = 0;
    let mut rows_dropped = 0;
    let mut rows_unparseable = 0;

    for path in paths {
        let loaded = load_file(op, path, source).await?;
        rows_read += loaded.rows_read;
        rows_dropped += loaded.rows_dropped;
        rows_unparseable += loaded.rows_unparseable;
        batches.push(loaded.batch);
    }

    let batch = concat_batches(&schema, &batches).map_err(|e| JobError::Decode {
        path: source.prefix.clone(),
        reason: format!("failed to concatenate fact tables: {}", e),
    })?;

    tracing::info!(
        files = paths.len(),
        rows = batch.num_rows(),
        dropped = rows_dropped,
        unparseable = rows_unparseable,
        "Loaded fact records"
    );

    Ok(FactTable {
        batch,
        files_read: paths.len(),
        rows_read,
        rows_dropped,
        rows_unparseable,
    })
}

/// Fetch one object and extract its normalized timestamp column.
pub async fn load_file(op: &Operator, path: &str, source: &SourceConfig) -> Result<LoadedFile> {
    tracing::info!(path, "Reading source file");

    let data = op
        .read(path)
        .await
        .map_err(|e| JobError::storage("read", path, e))?;
    let bytes = data.to_bytes();

    let column = source.timestamp_column.as_str();
    let columns = match source.format {
        SourceFormat::Parquet => decode_parquet(path, bytes, column)?,
        SourceFormat::ArrowIpc => decode_ipc(path, bytes, column)?,
    };

    let mut rows_read = 0;
    let mut rows_dropped = 0;
    let mut rows_unparseable = 0;
    let mut kept: Vec<i64> = Vec::new();
    for array in &columns {
        let normalized =
            normalize_timestamps(array).map_err(|e| JobError::from_core(e, path, column))?;
        rows_read += array.len();
        rows_dropped += array.len() - normalized.valid_count();
        rows_unparseable += normalized.coerced;
        kept.extend(normalized.values.iter().flatten());
    }

    let values = TimestampMicrosecondArray::from(kept);
    let batch = RecordBatch::try_new(Arc::new(fact_schema(column)), vec![Arc::new(values)])
        .map_err(|e| JobError::decode(path, e))?;

    tracing::info!(
        path,
        rows = rows_read,
        dropped = rows_dropped,
        unparseable = rows_unparseable,
        "Loaded source file"
    );

    Ok(LoadedFile {
        path: path.to_string(),
        batch,
        rows_read,
        rows_dropped,
        rows_unparseable,
    })
}

fn decode_parquet(path: &str, bytes: Bytes, column: &str) -> Result<Vec<ArrayRef>> {
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(bytes).map_err(|e| JobError::decode(path, e))?;

    let index = column_index(path, builder.schema(), column)?;
    let mask = ProjectionMask::roots(builder.parquet_schema(), [index]);
    let reader = builder
        .with_projection(mask)
        .build()
        .map_err(|e| JobError::decode(path, e))?;

    reader
        .map(|batch| {
            let batch = batch.map_err(|e| JobError::decode(path, e))?;
            projected_column(path, &batch, column)
        })
        .collect()
}

fn decode_ipc(path: &str, bytes: Bytes, column: &str) -> Result<Vec<ArrayRef>> {
    let reader =
        FileReader::try_new(Cursor::new(bytes), None).map_err(|e| JobError::decode(path, e))?;

    column_index(path, &reader.schema(), column)?;

    reader
        .map(|batch| {
            let batch = batch.map_err(|e| JobError::decode(path, e))?;
            projected_column(path, &batch, column)
        })
        .collect()
}

fn column_index(path: &str, schema: &Schema, column: &str) -> Result<usize> {
    schema.index_of(column).map_err(|_| JobError::Schema {
        path: path.to_string(),
        column: column.to_string(),
    })
}

fn projected_column(path: &str, batch: &RecordBatch, column: &str) -> Result<ArrayRef> {
    batch
        .column_by_name(column)
        .cloned()
        .ok_or_else(|| JobError::Schema {
            path: path.to_string(),
            column: column.to_string(),
        })
}
