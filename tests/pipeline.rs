// End-to-end tests for the date dimension job
//
// Fact files are written to storage, the job runs against it, and the
// resulting Parquet table is read back.

use std::sync::Arc;

use arrow::array::{AsArray, RecordBatch, StringArray, TimestampMillisecondArray};
use arrow::datatypes::{DataType, Date32Type, Field, Int32Type, Int64Type, Schema, TimeUnit};
use bytes::Bytes;
use chrono::NaiveDateTime;
use dimdate::{run_job, JobContext, JobError};
use dimdate_config::{FsConfig, RuntimeConfig, StorageBackend, StorageConfig};
use opendal::{services, Operator};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;

const OUTPUT_KEY: &str = "dim_date/dim_date.snappy.parquet";

fn memory_operator() -> Operator {
    Operator::new(services::Memory::default())
        .expect("Failed to create memory operator")
        .finish()
}

fn millis(raw: &str) -> i64 {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .expect("valid test timestamp")
        .and_utc()
        .timestamp_millis()
}

/// A fact_rental-shaped file with a millisecond timestamp column
fn rental_parquet(timestamps: &[&str]) -> Vec<u8> {
    let schema = Arc::new(Schema::new(vec![
        Field::new(
            "rental_date",
            DataType::Timestamp(TimeUnit::Millisecond, None),
            true,
        ),
        Field::new("film", DataType::Utf8, false),
    ]));
    let dates: TimestampMillisecondArray = timestamps.iter().map(|t| Some(millis(t))).collect();
    let films = StringArray::from_iter_values(timestamps.iter().map(|_| "ACADEMY DINOSAUR"));
    let batch = RecordBatch::try_new(schema, vec![Arc::new(dates), Arc::new(films)]).unwrap();
    encode(&batch)
}

fn encode(batch: &RecordBatch) -> Vec<u8> {
    let mut buffer = Vec::new();
    let mut writer = ArrowWriter::try_new(&mut buffer, batch.schema(), None).unwrap();
    writer.write(batch).unwrap();
    writer.close().unwrap();
    buffer
}

async fn read_output(op: &Operator, path: &str) -> (RecordBatch, Vec<(String, String)>) {
    let bytes = op.read(path).await.expect("output exists").to_vec();
    let builder = ParquetRecordBatchReaderBuilder::try_new(Bytes::from(bytes)).unwrap();
    let metadata = builder
        .metadata()
        .file_metadata()
        .key_value_metadata()
        .map(|kv| {
            kv.iter()
                .map(|e| (e.key.clone(), e.value.clone().unwrap_or_default()))
                .collect()
        })
        .unwrap_or_default();
    let batches: Vec<RecordBatch> = builder.build().unwrap().map(|b| b.unwrap()).collect();
    let batch = arrow::compute::concat_batches(&batches[0].schema(), &batches).unwrap();
    (batch, metadata)
}

#[tokio::test]
async fn builds_dimension_from_rental_facts() {
    let op = memory_operator();
    op.write(
        "fact_rental/part-0.parquet",
        rental_parquet(&["2005-05-24 22:53:30", "2005-05-25 01:03:08"]),
    )
    .await
    .unwrap();
    op.write(
        "fact_rental/part-1.parquet",
        rental_parquet(&["2005-05-24 23:03:39", "2005-07-04 09:12:00"]),
    )
    .await
    .unwrap();

    let ctx = JobContext::new(op.clone(), RuntimeConfig::default());
    let summary = run_job(&ctx).await.unwrap();

    assert_eq!(summary.files_read, 2);
    assert_eq!(summary.rows_loaded, 4);
    assert_eq!(summary.rows_dropped, 0);
    assert_eq!(summary.distinct_dates, 3);
    assert_eq!(summary.output_path, OUTPUT_KEY);
    assert!(!summary.dry_run);

    let (batch, metadata) = read_output(&op, OUTPUT_KEY).await;
    let names: Vec<&str> = batch
        .schema_ref()
        .fields()
        .iter()
        .map(|f| f.name().as_str())
        .collect();
    assert_eq!(
        names,
        [
            "date_id",
            "rental_date",
            "is_weekend",
            "is_holiday",
            "day_of_week",
            "quarter"
        ]
    );
    assert_eq!(batch.num_rows(), 3);

    let ids = batch.column(0).as_primitive::<Int64Type>();
    let dates = batch.column(1).as_primitive::<Date32Type>();
    let weekend = batch.column(2).as_boolean();
    let holiday = batch.column(3).as_boolean();
    let weekday = batch.column(4).as_string::<i32>();
    let quarter = batch.column(5).as_primitive::<Int32Type>();

    assert_eq!(ids.values().to_vec(), vec![20050524, 20050525, 20050704]);
    assert_eq!(weekday.value(0), "Tuesday");
    assert_eq!(weekday.value(1), "Wednesday");
    assert_eq!(weekday.value(2), "Monday");
    assert!(!weekend.value(0) && !weekend.value(1));
    assert!(!holiday.value(0));
    assert!(holiday.value(2));
    assert_eq!(quarter.values().to_vec(), vec![2, 2, 3]);
    // 2005-05-24 is 12927 days after the Unix epoch
    assert_eq!(dates.value(0), 12927);

    assert!(metadata
        .iter()
        .any(|(k, v)| k == "dimdate.source_prefix" && v == "fact_rental/"));
    assert!(metadata
        .iter()
        .any(|(k, v)| k == "dimdate.row_count" && v == "3"));
}

#[tokio::test]
async fn unparseable_timestamps_are_dropped() {
    let op = memory_operator();
    let schema = Arc::new(Schema::new(vec![Field::new(
        "rental_date",
        DataType::Utf8,
        true,
    )]));
    let batch = RecordBatch::try_new(
        schema,
        vec![Arc::new(StringArray::from(vec![
            Some("2005-05-24 22:53:30"),
            Some("yesterday"),
            None,
            Some("2005-05-24 23:00:00"),
        ]))],
    )
    .unwrap();
    op.write("fact_rental/strings.parquet", encode(&batch))
        .await
        .unwrap();

    let ctx = JobContext::new(op.clone(), RuntimeConfig::default());
    let summary = run_job(&ctx).await.unwrap();

    assert_eq!(summary.rows_loaded, 4);
    assert_eq!(summary.rows_dropped, 2);
    assert_eq!(summary.distinct_dates, 1);

    let (batch, _) = read_output(&op, OUTPUT_KEY).await;
    assert_eq!(batch.num_rows(), 1);
}

#[tokio::test]
async fn no_source_files_is_not_found() {
    let op = memory_operator();
    op.write("fact_rental/notes.csv", b"rental_date\n".to_vec())
        .await
        .unwrap();

    let ctx = JobContext::new(op.clone(), RuntimeConfig::default());
    let err = run_job(&ctx).await.unwrap_err();

    assert!(matches!(err, JobError::NotFound { .. }));
    assert!(!op.exists(OUTPUT_KEY).await.unwrap());
}

#[tokio::test]
async fn missing_timestamp_column_aborts_before_writing() {
    let op = memory_operator();
    op.write(
        "fact_rental/part-0.parquet",
        rental_parquet(&["2005-05-24 22:53:30"]),
    )
    .await
    .unwrap();

    let schema = Arc::new(Schema::new(vec![Field::new("film", DataType::Utf8, false)]));
    let batch = RecordBatch::try_new(
        schema,
        vec![Arc::new(StringArray::from(vec!["ACE GOLDFINGER"]))],
    )
    .unwrap();
    op.write("fact_rental/part-1.parquet", encode(&batch))
        .await
        .unwrap();

    let ctx = JobContext::new(op.clone(), RuntimeConfig::default());
    let err = run_job(&ctx).await.unwrap_err();

    match err {
        JobError::Schema { path, column } => {
            assert_eq!(path, "fact_rental/part-1.parquet");
            assert_eq!(column, "rental_date");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!op.exists(OUTPUT_KEY).await.unwrap());
}

#[tokio::test]
async fn rerun_overwrites_previous_output() {
    let op = memory_operator();
    op.write(
        "fact_rental/part-0.parquet",
        rental_parquet(&["2005-05-24 22:53:30", "2005-05-28 10:00:00"]),
    )
    .await
    .unwrap();

    let ctx = JobContext::new(op.clone(), RuntimeConfig::default());
    run_job(&ctx).await.unwrap();

    op.delete("fact_rental/part-0.parquet").await.unwrap();
    op.write(
        "fact_rental/part-1.parquet",
        rental_parquet(&["2005-12-25 12:00:00"]),
    )
    .await
    .unwrap();
    let summary = run_job(&ctx).await.unwrap();
    assert_eq!(summary.distinct_dates, 1);

    let (batch, _) = read_output(&op, OUTPUT_KEY).await;
    assert_eq!(batch.num_rows(), 1);
    let ids = batch.column(0).as_primitive::<Int64Type>();
    assert_eq!(ids.value(0), 20051225);
    // Christmas 2005 fell on a Sunday
    assert!(batch.column(2).as_boolean().value(0));
    assert!(batch.column(3).as_boolean().value(0));
}

#[tokio::test]
async fn dry_run_skips_upload() {
    let op = memory_operator();
    op.write(
        "fact_rental/part-0.parquet",
        rental_parquet(&["2005-05-24 22:53:30"]),
    )
    .await
    .unwrap();

    let ctx = JobContext::new(op.clone(), RuntimeConfig::default()).with_dry_run(true);
    let summary = run_job(&ctx).await.unwrap();

    assert!(summary.dry_run);
    assert!(summary.bytes_written > 0);
    assert!(!op.exists(OUTPUT_KEY).await.unwrap());
}

#[tokio::test]
async fn filesystem_backend_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let facts_dir = dir.path().join("fact_rental");
    std::fs::create_dir_all(&facts_dir).unwrap();
    std::fs::write(
        facts_dir.join("part-0.parquet"),
        rental_parquet(&["2005-05-24 22:53:30", "2005-05-25 01:03:08"]),
    )
    .unwrap();

    let mut config = RuntimeConfig::default();
    config.storage = StorageConfig {
        backend: StorageBackend::Fs,
        s3: None,
        fs: Some(FsConfig {
            path: dir.path().to_string_lossy().to_string(),
        }),
    };
    let ctx = JobContext::from_config(config).unwrap();
    let summary = run_job(&ctx).await.unwrap();

    assert_eq!(summary.distinct_dates, 2);
    let written = dir.path().join(OUTPUT_KEY);
    assert!(written.is_file());
    assert_eq!(
        std::fs::metadata(&written).unwrap().len() as usize,
        summary.bytes_written
    );
}
