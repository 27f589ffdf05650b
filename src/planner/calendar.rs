//! Calendar helpers for naming plan days.
//!
//! Weekdays come from Zeller's congruence on the (year, month, day) triple
//! so the result never depends on the host timezone or DST transitions.

use chrono::{Datelike, Days, NaiveDate};

use crate::error::{PlannerError, Result};
use crate::models::Locale;
use crate::planner::constants::{day_name, month_name};

/// Weekday index with Monday = 0 .. Sunday = 6.
pub fn weekday_index(year: i32, month: u32, day: u32) -> usize {
    // January and February count as months 13 and 14 of the previous year.
    let (y, m) = if month < 3 {
        (i64::from(year) - 1, i64::from(month) + 12)
    } else {
        (i64::from(year), i64::from(month))
    };
    let q = i64::from(day);
    let k = y.rem_euclid(100);
    let j = y.div_euclid(100);

    // h: 0 = Saturday, 1 = Sunday, 2 = Monday, ...
    let h = (q + (13 * (m + 1)) / 5 + k + k / 4 + j / 4 + 5 * j).rem_euclid(7);
    ((h + 5) % 7) as usize
}

/// Localized weekday name for a date.
pub fn day_name_for(date: NaiveDate, locale: Locale) -> &'static str {
    day_name(locale, weekday_index(date.year(), date.month(), date.day()))
}

/// Plan title derived from its start date.
pub fn plan_name(start: NaiveDate, locale: Locale) -> String {
    let month = month_name(locale, start.month());
    match locale {
        Locale::En => format!("Week of {} {} {}", start.day(), month, start.year()),
        Locale::Es => format!("Semana del {} de {} {}", start.day(), month, start.year()),
    }
}

/// `start + offset` days.
pub fn add_days(start: NaiveDate, offset: u32) -> Result<NaiveDate> {
    start
        .checked_add_days(Days::new(u64::from(offset)))
        .ok_or_else(|| {
            PlannerError::InvalidConfig(format!(
                "date {} plus {} days is out of range",
                start, offset
            ))
        })
}

pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    Ok(NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")?)
}
