// Parquet writer for the dimension table
//
// Dictionary encoding and page statistics stay on; the codec is chosen by the
// caller (Snappy unless configured otherwise).

use arrow::array::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::{EnabledStatistics, WriterProperties};
use parquet::format::KeyValue;
use std::io::Write;

use crate::error::Result;

pub const DEFAULT_ROW_GROUP_SIZE: usize = 32 * 1024;

/// Knobs for one Parquet encoding pass
#[derive(Debug, Clone)]
pub struct ParquetOptions {
    pub compression: Compression,
    pub row_group_size: usize,
    /// Extra key/value pairs stored in the file footer
    pub metadata: Vec<(String, String)>,
}

impl Default for ParquetOptions {
    fn default() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
            metadata: Vec::new(),
        }
    }
}

pub fn writer_properties(options: &ParquetOptions) -> WriterProperties {
    let mut metadata = vec![KeyValue {
        key: "dimdate.version".to_string(),
        value: Some(env!("CARGO_PKG_VERSION").to_string()),
    }];
    metadata.extend(options.metadata.iter().map(|(key, value)| KeyValue {
        key: key.clone(),
        value: Some(value.clone()),
    }));

    WriterProperties::builder()
        .set_dictionary_enabled(true)
        .set_statistics_enabled(EnabledStatistics::Page)
        .set_compression(options.compression)
        .set_max_row_group_size(options.row_group_size.max(1))
        .set_key_value_metadata(Some(metadata))
        .build()
}

/// Write Arrow `RecordBatch` into an arbitrary `Write` sink.
pub fn write_parquet_into<W>(
    batch: &RecordBatch,
    writer: &mut W,
    options: &ParquetOptions,
) -> Result<()>
where
    W: Write + Send,
{
    let props = writer_properties(options);
    let mut arrow_writer = ArrowWriter::try_new(writer, batch.schema(), Some(props))?;

    arrow_writer.write(batch)?;
    arrow_writer.close()?;

    Ok(())
}

/// Write Arrow RecordBatch to Parquet format (in-memory buffer)
pub fn write_parquet(batch: &RecordBatch, options: &ParquetOptions) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    write_parquet_into(batch, &mut buffer, options)?;
    Ok(buffer)
}
