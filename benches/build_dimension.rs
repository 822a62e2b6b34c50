// Date dimension benchmark - measure fact timestamps → dimension → Parquet
//
// Runs entirely in memory; storage access is excluded.

use std::sync::Arc;

use arrow::array::{ArrayRef, StringArray, TimestampMillisecondArray};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use dimdate_core::parquet::{write_parquet, ParquetOptions};
use dimdate_core::{normalize_timestamps, DateDimension};

const START_MILLIS: i64 = 1_116_892_800_000; // 2005-05-24T00:00:00Z
const RENTAL_SPACING_MILLIS: i64 = 97_913; // ~880 rentals/day

fn rental_timestamps(rows: usize) -> ArrayRef {
    let values = (0..rows as i64).map(|i| START_MILLIS + i * RENTAL_SPACING_MILLIS);
    Arc::new(TimestampMillisecondArray::from_iter_values(values))
}

fn rental_strings(rows: usize) -> ArrayRef {
    let values = (0..rows).map(|i| {
        let day = i / 880;
        format!(
            "2005-{:02}-{:02} {:02}:{:02}:00",
            day / 28 % 12 + 1,
            day % 28 + 1,
            i % 24,
            i % 60
        )
    });
    Arc::new(StringArray::from_iter_values(values))
}

fn bench_build_dimension(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_dimension");

    for rows in [16_044usize, 160_440] {
        let column = rental_timestamps(rows);
        group.throughput(Throughput::Elements(rows as u64));

        group.bench_with_input(BenchmarkId::from_parameter(rows), &column, |b, column| {
            b.iter(|| {
                let normalized = normalize_timestamps(column).unwrap();
                let dimension = DateDimension::from_timestamp_array(&normalized.values);
                black_box(dimension.len());
            });
        });
    }

    group.finish();
}

fn bench_parse_strings(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize_strings");

    let rows = 16_044usize;
    let column = rental_strings(rows);
    group.throughput(Throughput::Elements(rows as u64));
    group.bench_function("utf8", |b| {
        b.iter(|| black_box(normalize_timestamps(&column).unwrap().valid_count()));
    });

    group.finish();
}

fn bench_encode(c: &mut Criterion) {
    let normalized = normalize_timestamps(&rental_timestamps(160_440)).unwrap();
    let batch = DateDimension::from_timestamp_array(&normalized.values)
        .to_record_batch()
        .unwrap();
    let options = ParquetOptions::default();

    c.bench_function("encode_dimension", |b| {
        b.iter(|| black_box(write_parquet(&batch, &options).unwrap().len()));
    });
}

criterion_group!(benches, bench_build_dimension, bench_parse_strings, bench_encode);
criterion_main!(benches);
