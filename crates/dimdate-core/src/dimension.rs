// Date Dimension Builder
//
// timestamps → calendar dates → distinct set → one enriched row per date.
// Pure and deterministic: rows come out in ascending date order, so building
// twice over the same input yields identical tables.

use arrow::array::{
    Array, ArrayRef, BooleanArray, Date32Array, Int32Array, Int64Array, RecordBatch,
    StringArray, TimestampMicrosecondArray,
};
use arrow::datatypes::TimestampMicrosecondType;
use arrow::temporal_conversions::as_datetime;
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::calendar::{date_id, date_to_date32, is_weekend, quarter, weekday_name};
use crate::error::Result;
use crate::holidays::HolidayCalendar;
use crate::schema::date_dimension_schema;

/// One row of the date dimension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateDimensionRow {
    pub date_id: i64,
    pub rental_date: NaiveDate,
    pub is_weekend: bool,
    pub is_holiday: bool,
    pub day_of_week: &'static str,
    pub quarter: i32,
}

impl DateDimensionRow {
    /// Derive every attribute of a date against a precomputed holiday calendar.
    pub fn new(date: NaiveDate, holidays: &HolidayCalendar) -> Self {
        Self {
            date_id: date_id(date),
            rental_date: date,
            is_weekend: is_weekend(date),
            is_holiday: holidays.contains(date),
            day_of_week: weekday_name(date.weekday()),
            quarter: quarter(date),
        }
    }
}

/// The deduplicated date dimension table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateDimension {
    rows: Vec<DateDimensionRow>,
}

impl DateDimension {
    /// Build from parsed timestamps; the time of day is discarded.
    pub fn build<I>(timestamps: I) -> Self
    where
        I: IntoIterator<Item = NaiveDateTime>,
    {
        Self::from_dates(timestamps.into_iter().map(|ts| ts.date()))
    }

    /// Build from calendar dates, collapsing duplicates.
    pub fn from_dates<I>(dates: I) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        let distinct: BTreeSet<NaiveDate> = dates.into_iter().collect();
        let holidays = HolidayCalendar::us_for_dates(distinct.iter());

        let rows = distinct
            .into_iter()
            .map(|date| DateDimensionRow::new(date, &holidays))
            .collect();

        Self { rows }
    }

    /// Build from a normalized fact timestamp column. Nulls are skipped.
    pub fn from_timestamp_array(array: &TimestampMicrosecondArray) -> Self {
        Self::build(
            array
                .iter()
                .flatten()
                .filter_map(as_datetime::<TimestampMicrosecondType>),
        )
    }

    pub fn rows(&self) -> &[DateDimensionRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Columnar form with the fixed dimension schema.
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let rows = &self.rows;
        let columns: Vec<ArrayRef> = vec![
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.date_id))),
            Arc::new(Date32Array::from_iter_values(
                rows.iter().map(|r| date_to_date32(r.rental_date)),
            )),
            Arc::new(BooleanArray::from(
                rows.iter().map(|r| r.is_weekend).collect::<Vec<_>>(),
            )),
            Arc::new(BooleanArray::from(
                rows.iter().map(|r| r.is_holiday).collect::<Vec<_>>(),
            )),
            Arc::new(StringArray::from_iter_values(
                rows.iter().map(|r| r.day_of_week),
            )),
            Arc::new(Int32Array::from_iter_values(rows.iter().map(|r| r.quarter))),
        ];

        let batch = RecordBatch::try_new(Arc::new(date_dimension_schema()), columns)?;
        debug_assert!(batch.columns().iter().all(|c| c.null_count() == 0));
        Ok(batch)
    }
}
