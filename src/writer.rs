//! Table writer: encode the dimension and upload it to its fixed key.

use arrow::array::RecordBatch;
use dimdate_config::{OutputCompression, OutputConfig};
use dimdate_core::parquet::{write_parquet, ParquetOptions};
use opendal::Operator;
use parquet::basic::{Compression, ZstdLevel};

use crate::error::{JobError, Result};

/// An encoded dimension table ready for upload.
#[derive(Debug)]
pub struct EncodedTable {
    pub path: String,
    pub bytes: Vec<u8>,
    pub rows: usize,
}

pub fn parquet_compression(compression: OutputCompression) -> Compression {
    match compression {
        OutputCompression::Snappy => Compression::SNAPPY,
        OutputCompression::Zstd => Compression::ZSTD(ZstdLevel::default()),
        OutputCompression::Uncompressed => Compression::UNCOMPRESSED,
    }
}

/// Encode the dimension batch as Parquet, tagging the footer with where the
/// facts came from.
pub fn encode_dimension(
    batch: &RecordBatch,
    output: &OutputConfig,
    source_prefix: &str,
) -> Result<EncodedTable> {
    let options = ParquetOptions {
        compression: parquet_compression(output.compression),
        row_group_size: output.row_group_size,
        metadata: vec![
            ("dimdate.source_prefix".to_string(), source_prefix.to_string()),
            ("dimdate.row_count".to_string(), batch.num_rows().to_string()),
        ],
    };

    let bytes = write_parquet(batch, &options).map_err(|e| JobError::Encode {
        reason: e.to_string(),
    })?;

    Ok(EncodedTable {
        path: output.object_key(),
        bytes,
        rows: batch.num_rows(),
    })
}

/// Upload an encoded table, replacing whatever is at its key.
pub async fn write_table(op: &Operator, table: EncodedTable) -> Result<usize> {
    let EncodedTable { path, bytes, rows } = table;
    let bytes_written = bytes.len();

    tracing::debug!(path = %path, "Writing date dimension");

    op.write(&path, bytes)
        .await
        .map_err(|e| JobError::storage("write", &path, e))?;

    tracing::info!(
        path = %path,
        rows,
        bytes = bytes_written,
        "Wrote date dimension"
    );

    Ok(bytes_written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use dimdate_core::DateDimension;
    use opendal::services;

    fn dimension_batch() -> RecordBatch {
        let date = NaiveDate::from_ymd_opt(2005, 5, 24).unwrap();
        DateDimension::from_dates([date]).to_record_batch().unwrap()
    }

    #[test]
    fn encodes_to_configured_key() {
        let output = OutputConfig::default();
        let table = encode_dimension(&dimension_batch(), &output, "fact_rental/").unwrap();
        assert_eq!(table.path, "dim_date/dim_date.snappy.parquet");
        assert_eq!(table.rows, 1);
        assert_eq!(&table.bytes[0..4], b"PAR1");
    }

    #[test]
    fn maps_codecs() {
        assert_eq!(
            parquet_compression(OutputCompression::Snappy),
            Compression::SNAPPY
        );
        assert_eq!(
            parquet_compression(OutputCompression::Uncompressed),
            Compression::UNCOMPRESSED
        );
        assert!(matches!(
            parquet_compression(OutputCompression::Zstd),
            Compression::ZSTD(_)
        ));
    }

    #[tokio::test]
    async fn write_overwrites_existing_object() {
        let op = Operator::new(services::Memory::default())
            .expect("Failed to create memory operator")
            .finish();
        op.write("dim_date/dim_date.snappy.parquet", b"stale".to_vec())
            .await
            .unwrap();

        let table =
            encode_dimension(&dimension_batch(), &OutputConfig::default(), "fact_rental/").unwrap();
        let expected = table.bytes.clone();
        let written = write_table(&op, table).await.unwrap();

        let stored = op
            .read("dim_date/dim_date.snappy.parquet")
            .await
            .unwrap()
            .to_vec();
        assert_eq!(written, expected.len());
        assert_eq!(stored, expected);
    }
}
