// src/services/period.rs

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, Offset, Utc};

use crate::models::period::{DateRange, PeriodWindow};

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(31)
}

// Same day-of-month `months` away, clamped to the target month's length.
fn shift_months(date: NaiveDate, months: i32) -> NaiveDate {
    let total = date.year() * 12 + date.month0() as i32 + months;
    let year = total.div_euclid(12);
    let month = total.rem_euclid(12) as u32 + 1;
    let day = date.day().min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(date)
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn first_of_year(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date)
}

fn to_date(end: NaiveDate) -> DateRange {
    DateRange { start: first_of_month(end), end }
}

/// Resolves the comparison windows for a reference date. Prior periods are
/// "to date": they stop at the same day of month, clamped.
pub fn resolve(reference: NaiveDate) -> PeriodWindow {
    let prev_month_end = shift_months(reference, -1);
    let prev_year_end = shift_months(reference, -12);

    PeriodWindow {
        reference_date: reference,
        current: to_date(reference),
        prev_month: to_date(prev_month_end),
        prev_year: to_date(prev_year_end),
        ytd: DateRange { start: first_of_year(reference), end: reference },
        prev_ytd: DateRange { start: first_of_year(prev_year_end), end: prev_year_end },
        target_month: reference.format("%Y%m").to_string(),
        days_in_month: days_in_month(reference.year(), reference.month()),
        day_of_month: reference.day(),
    }
}

/// Business "today" at the configured UTC offset.
pub fn business_today(now: DateTime<Utc>, utc_offset_hours: i32) -> NaiveDate {
    let offset = FixedOffset::east_opt(utc_offset_hours * 3600)
        .unwrap_or_else(|| Utc.fix());
    now.with_timezone(&offset).date_naive()
}

/// Reporting tables load with a one-day lag, so the default report date is
/// yesterday in business time.
pub fn default_reference_date(now: DateTime<Utc>, utc_offset_hours: i32) -> NaiveDate {
    business_today(now, utc_offset_hours) - Duration::days(1)
}
