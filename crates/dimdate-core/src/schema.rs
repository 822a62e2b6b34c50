// Arrow schemas for the fact input and the date dimension output
//
// Column order of the dimension is fixed; downstream star-schema joins rely on
// `date_id` being the first column.

use arrow::datatypes::{DataType, Field, Schema, TimeUnit};

pub const DATE_ID: &str = "date_id";
pub const RENTAL_DATE: &str = "rental_date";
pub const IS_WEEKEND: &str = "is_weekend";
pub const IS_HOLIDAY: &str = "is_holiday";
pub const DAY_OF_WEEK: &str = "day_of_week";
pub const QUARTER: &str = "quarter";

/// Dimension columns, in output order.
pub const DATE_DIMENSION_COLUMNS: [&str; 6] = [
    DATE_ID,
    RENTAL_DATE,
    IS_WEEKEND,
    IS_HOLIDAY,
    DAY_OF_WEEK,
    QUARTER,
];

/// Unit of the normalized fact timestamp column.
pub const FACT_TIME_UNIT: TimeUnit = TimeUnit::Microsecond;

/// Returns the Arrow schema of the date dimension table
pub fn date_dimension_schema() -> Schema {
    Schema::new(vec![
        Field::new(DATE_ID, DataType::Int64, false),
        Field::new(RENTAL_DATE, DataType::Date32, false),
        Field::new(IS_WEEKEND, DataType::Boolean, false),
        Field::new(IS_HOLIDAY, DataType::Boolean, false),
        Field::new(DAY_OF_WEEK, DataType::Utf8, false),
        Field::new(QUARTER, DataType::Int32, false),
    ])
}

/// Returns the schema of the combined fact table: a single non-null,
/// timezone-free timestamp column named after the source attribute.
pub fn fact_schema(timestamp_column: &str) -> Schema {
    Schema::new(vec![Field::new(
        timestamp_column,
        DataType::Timestamp(FACT_TIME_UNIT, None),
        false,
    )])
}
