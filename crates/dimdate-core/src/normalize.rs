// Timestamp normalization
//
// Fact files carry the timestamp attribute in whatever type their producer
// chose. Everything is brought to a timezone-free microsecond timestamp (wall
// clock time in the column's own zone). Values that cannot be interpreted,
// including strings that do not parse and instants outside the supported year
// range, become null instead of failing the load.

use arrow::array::timezone::Tz;
use arrow::array::{Array, ArrayRef, AsArray, TimestampMicrosecondArray};
use arrow::datatypes::{
    ArrowPrimitiveType, DataType, Date32Type, Date64Type, TimeUnit, TimestampMicrosecondType,
    TimestampMillisecondType, TimestampNanosecondType, TimestampSecondType,
};
use arrow::temporal_conversions::{as_datetime, as_datetime_with_timezone};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};

use crate::calendar::{date32_to_date, is_supported_year};
use crate::error::{CoreError, Result};

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

/// A normalized timestamp column and how many values were coerced to null.
#[derive(Debug, Clone)]
pub struct NormalizedTimestamps {
    pub values: TimestampMicrosecondArray,
    /// Non-null inputs that could not be interpreted.
    pub coerced: usize,
}

impl NormalizedTimestamps {
    /// Number of usable (non-null) timestamps.
    pub fn valid_count(&self) -> usize {
        self.values.len() - self.values.null_count()
    }
}

/// Convert a column of dates, timestamps or strings into microsecond timestamps.
pub fn normalize_timestamps(array: &ArrayRef) -> Result<NormalizedTimestamps> {
    let parsed: Vec<Option<NaiveDateTime>> = match array.data_type() {
        DataType::Timestamp(unit, tz) => {
            let tz = tz.as_deref();
            match unit {
                TimeUnit::Second => timestamps_to_naive::<TimestampSecondType>(array, tz)?,
                TimeUnit::Millisecond => {
                    timestamps_to_naive::<TimestampMillisecondType>(array, tz)?
                }
                TimeUnit::Microsecond => {
                    timestamps_to_naive::<TimestampMicrosecondType>(array, tz)?
                }
                TimeUnit::Nanosecond => timestamps_to_naive::<TimestampNanosecondType>(array, tz)?,
            }
        }
        DataType::Date32 => array
            .as_primitive::<Date32Type>()
            .iter()
            .map(|days| days.and_then(date32_to_date).and_then(midnight))
            .collect(),
        DataType::Date64 => array
            .as_primitive::<Date64Type>()
            .iter()
            .map(|millis| {
                millis
                    .and_then(DateTime::<Utc>::from_timestamp_millis)
                    .map(|dt| dt.naive_utc())
            })
            .collect(),
        DataType::Utf8 => array
            .as_string::<i32>()
            .iter()
            .map(|s| s.and_then(parse_datetime))
            .collect(),
        DataType::LargeUtf8 => array
            .as_string::<i64>()
            .iter()
            .map(|s| s.and_then(parse_datetime))
            .collect(),
        DataType::Utf8View => array
            .as_string_view()
            .iter()
            .map(|s| s.and_then(parse_datetime))
            .collect(),
        DataType::Null => vec![None; array.len()],
        other => {
            return Err(CoreError::UnsupportedType {
                data_type: other.clone(),
            })
        }
    };

    // NullArray carries no validity buffer, so presence comes from logical nulls
    let nulls = array.logical_nulls();
    let mut coerced = 0;
    let values: TimestampMicrosecondArray = parsed
        .into_iter()
        .enumerate()
        .map(|(idx, value)| {
            let micros = value
                .filter(|dt| is_supported_year(dt.year()))
                .map(|dt| dt.and_utc().timestamp_micros());
            let present = nulls.as_ref().map_or(true, |n| n.is_valid(idx));
            if micros.is_none() && present {
                coerced += 1;
            }
            micros
        })
        .collect();

    Ok(NormalizedTimestamps { values, coerced })
}

fn timestamps_to_naive<T: ArrowPrimitiveType<Native = i64>>(
    array: &ArrayRef,
    timezone: Option<&str>,
) -> Result<Vec<Option<NaiveDateTime>>> {
    let values = array.as_primitive::<T>();
    match timezone {
        None => Ok(values.iter().map(|v| v.and_then(as_datetime::<T>)).collect()),
        Some(name) => {
            let tz: Tz = name.parse().map_err(|e: arrow::error::ArrowError| {
                CoreError::InvalidTimezone {
                    timezone: name.to_string(),
                    reason: e.to_string(),
                }
            })?;
            Ok(values
                .iter()
                .map(|v| {
                    v.and_then(|v| as_datetime_with_timezone::<T>(v, tz))
                        .map(|dt| dt.naive_local())
                })
                .collect())
        }
    }
}

/// Parse a textual timestamp; `None` when no known layout matches.
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .and_then(midnight)
        })
}

fn midnight(date: NaiveDate) -> Option<NaiveDateTime> {
    date.and_hms_opt(0, 0, 0)
}
