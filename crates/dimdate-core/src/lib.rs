// dimdate-core - Pure date dimension logic
//
// This crate contains the derivation of the date dimension table from a
// column of fact timestamps. No I/O, no async, no runtime dependencies.
//
// - Essence: timestamps → deduplicated, enriched dimension rows → Parquet bytes
// - Accident: listing, fetching and uploading objects (lives in the `dimdate` job)

pub mod calendar;
pub mod dimension;
mod error;
pub mod holidays;
pub mod normalize;
pub mod parquet;
pub mod schema;

pub use dimension::{DateDimension, DateDimensionRow};
pub use error::{CoreError, Result};
pub use holidays::HolidayCalendar;
pub use normalize::{normalize_timestamps, NormalizedTimestamps};
pub use schema::{date_dimension_schema, fact_schema};
