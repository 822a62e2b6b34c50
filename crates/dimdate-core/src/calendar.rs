//! Calendar attributes derived from a single date.

use chrono::{Datelike, NaiveDate, Weekday};

/// Days from 0001-01-01 (CE day 1) to 1970-01-01, the Arrow `Date32` epoch.
pub const UNIX_EPOCH_DAY_OFFSET: i32 = 719_163;

/// First year whose `date_id` still has eight digits.
pub const MIN_SUPPORTED_YEAR: i32 = 1000;
/// Last year whose `date_id` still has eight digits.
pub const MAX_SUPPORTED_YEAR: i32 = 9999;

/// Encode a date as `YYYYMMDD`.
pub fn date_id(date: NaiveDate) -> i64 {
    date.year() as i64 * 10_000 + date.month() as i64 * 100 + date.day() as i64
}

/// Decode a `YYYYMMDD` key; `None` if it does not name a real date.
pub fn date_from_id(id: i64) -> Option<NaiveDate> {
    let year = i32::try_from(id / 10_000).ok()?;
    let month = ((id / 100) % 100) as u32;
    let day = (id % 100) as u32;
    if !is_supported_year(year) {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Whether a year falls in the range where `date_id` is eight digits wide.
pub fn is_supported_year(year: i32) -> bool {
    (MIN_SUPPORTED_YEAR..=MAX_SUPPORTED_YEAR).contains(&year)
}

/// English weekday name ("Monday" .. "Sunday").
pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Calendar quarter, 1 through 4.
pub fn quarter(date: NaiveDate) -> i32 {
    (date.month0() / 3 + 1) as i32
}

/// Days since the Unix epoch, as stored in Arrow `Date32`.
pub fn date_to_date32(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAY_OFFSET
}

pub fn date32_to_date(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(UNIX_EPOCH_DAY_OFFSET.checked_add(days)?)
}
