//! United States federal holiday calendar.
//!
//! Holidays are generated per year with their historical rules (the 1971
//! Uniform Monday Holiday Act moves, Veterans Day's 1971-1977 October
//! placement, Juneteenth from 2021) and, from 1971 on, weekend observance:
//! a holiday on Saturday is observed on the preceding Friday, one on Sunday on
//! the following Monday. Observed days count as holidays.
//!
//! The calendar is precomputed once for the years spanned by the input so that
//! classifying a date is a set lookup.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use std::collections::HashMap;
use std::ops::RangeInclusive;

/// First year weekend observance is applied.
const OBSERVANCE_SINCE: i32 = 1971;
/// First year of the Monday-holiday rules.
const UNIFORM_MONDAY_SINCE: i32 = 1971;

/// Precomputed set of holiday dates with their names.
#[derive(Debug, Clone, Default)]
pub struct HolidayCalendar {
    days: HashMap<NaiveDate, &'static str>,
}

impl HolidayCalendar {
    /// US federal holidays for every year in `years`.
    ///
    /// Neighbouring years are generated too, since an observed day can cross a
    /// year boundary (New Year's Day on a Saturday is observed on December 31).
    pub fn us_for_years(years: RangeInclusive<i32>) -> Self {
        let mut days = HashMap::new();
        if years.is_empty() {
            return Self { days };
        }

        let first = years.start().saturating_sub(1);
        let last = years.end().saturating_add(1);
        for year in first..=last {
            for (date, name) in us_holidays_in_year(year) {
                if years.contains(&date.year()) {
                    days.entry(date).or_insert(name);
                }
            }
        }

        Self { days }
    }

    /// Calendar covering every year touched by `dates`.
    pub fn us_for_dates<'a, I>(dates: I) -> Self
    where
        I: IntoIterator<Item = &'a NaiveDate>,
    {
        let span = dates.into_iter().fold(None, |span, date| match span {
            None => Some((date.year(), date.year())),
            Some((lo, hi)) => Some((date.year().min(lo), date.year().max(hi))),
        });

        match span {
            Some((lo, hi)) => Self::us_for_years(lo..=hi),
            None => Self::default(),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.days.contains_key(&date)
    }

    /// Holiday name for a date, if it is one.
    pub fn name(&self, date: NaiveDate) -> Option<&'static str> {
        self.days.get(&date).copied()
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

/// All US federal holidays falling due in `year`, observed days included.
///
/// An observed day may land in the previous year (December 31).
pub fn us_holidays_in_year(year: i32) -> Vec<(NaiveDate, &'static str)> {
    let mut fixed: Vec<(NaiveDate, &'static str)> = Vec::with_capacity(12);
    let mut add = |date: Option<NaiveDate>, name: &'static str| {
        if let Some(date) = date {
            fixed.push((date, name));
        }
    };

    if year >= 1871 {
        add(ymd(year, 1, 1), "New Year's Day");
        add(ymd(year, 7, 4), "Independence Day");
        add(ymd(year, 12, 25), "Christmas Day");
        let thanksgiving = if year >= 1942 {
            nth_weekday(year, 11, Weekday::Thu, 4)
        } else {
            last_weekday(year, 11, Weekday::Thu)
        };
        add(thanksgiving, "Thanksgiving");
    }

    if year >= 1986 {
        add(nth_weekday(year, 1, Weekday::Mon, 3), "Martin Luther King Jr. Day");
    }

    if year >= UNIFORM_MONDAY_SINCE {
        add(nth_weekday(year, 2, Weekday::Mon, 3), "Washington's Birthday");
        add(last_weekday(year, 5, Weekday::Mon), "Memorial Day");
    } else {
        if year >= 1879 {
            add(ymd(year, 2, 22), "Washington's Birthday");
        }
        if year >= 1888 {
            add(ymd(year, 5, 30), "Memorial Day");
        }
    }

    if year >= 2021 {
        add(ymd(year, 6, 19), "Juneteenth National Independence Day");
    }

    if year >= 1894 {
        add(nth_weekday(year, 9, Weekday::Mon, 1), "Labor Day");
    }

    if year >= UNIFORM_MONDAY_SINCE {
        add(nth_weekday(year, 10, Weekday::Mon, 2), "Columbus Day");
    } else if year >= 1937 {
        add(ymd(year, 10, 12), "Columbus Day");
    }

    if (1971..=1977).contains(&year) {
        add(nth_weekday(year, 10, Weekday::Mon, 4), "Veterans Day");
    } else if year >= 1954 {
        add(ymd(year, 11, 11), "Veterans Day");
    } else if year >= 1938 {
        add(ymd(year, 11, 11), "Armistice Day");
    }

    if year < OBSERVANCE_SINCE {
        return fixed;
    }

    let mut all = fixed.clone();
    for (date, name) in fixed {
        if let Some(observed) = observed_date(date) {
            all.push((observed, name));
        }
    }
    all
}

/// Weekday substitute for a holiday falling on a weekend.
fn observed_date(date: NaiveDate) -> Option<NaiveDate> {
    match date.weekday() {
        Weekday::Sat => date.checked_sub_signed(Duration::days(1)),
        Weekday::Sun => date.checked_add_signed(Duration::days(1)),
        _ => None,
    }
}

fn ymd(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}

fn nth_weekday(year: i32, month: u32, weekday: Weekday, n: u8) -> Option<NaiveDate> {
    NaiveDate::from_weekday_of_month_opt(year, month, weekday, n)
}

fn last_weekday(year: i32, month: u32, weekday: Weekday) -> Option<NaiveDate> {
    let first_of_next = if month == 12 {
        ymd(year + 1, 1, 1)?
    } else {
        ymd(year, month + 1, 1)?
    };
    let last_of_month = first_of_next.pred_opt()?;
    let back = (7 + last_of_month.weekday().num_days_from_monday()
        - weekday.num_days_from_monday())
        % 7;
    last_of_month.checked_sub_signed(Duration::days(back as i64))
}
