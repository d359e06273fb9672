//! Calendar arithmetic with month-length clamping.
//!
//! Every helper returns `None` instead of panicking when chrono cannot represent
//! the requested date.

use chrono::{Datelike, Duration, NaiveDate};

pub fn is_leap_year(year: i32) -> bool {
    NaiveDate::from_ymd_opt(year, 2, 29).is_some()
}

pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let first_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)?;
    let last_current = first_next - Duration::days(1);
    Some(last_current.day())
}

/// Builds `year-month-day`, pulling the day back to the last day of a short month.
pub fn clamped_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    let last = days_in_month(year, month)?;
    NaiveDate::from_ymd_opt(year, month, day.min(last))
}

/// Moves `date` by whole calendar months and lands on `day`, clamped to the target month.
pub fn shift_months(date: NaiveDate, months: i32, day: u32) -> Option<NaiveDate> {
    let index = date.year() * 12 + date.month0() as i32 + months;
    let year = index.div_euclid(12);
    let month = index.rem_euclid(12) as u32 + 1;
    clamped_date(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_lengths_follow_leap_years() {
        assert_eq!(days_in_month(2024, 2), Some(29));
        assert_eq!(days_in_month(2025, 2), Some(28));
        assert_eq!(days_in_month(1900, 2), Some(28));
        assert_eq!(days_in_month(2000, 2), Some(29));
        assert_eq!(days_in_month(2025, 4), Some(30));
        assert_eq!(days_in_month(2025, 12), Some(31));
    }

    #[test]
    fn shift_months_clamps_and_wraps_years() {
        assert_eq!(shift_months(date(2024, 1, 31), 1, 31), Some(date(2024, 2, 29)));
        assert_eq!(shift_months(date(2024, 12, 15), 1, 31), Some(date(2025, 1, 31)));
        assert_eq!(shift_months(date(2024, 3, 31), -1, 31), Some(date(2024, 2, 29)));
        assert_eq!(shift_months(date(2024, 1, 10), 14, 30), Some(date(2025, 3, 30)));
    }

    #[test]
    fn invalid_month_yields_none() {
        assert_eq!(clamped_date(2024, 13, 1), None);
        assert!(!is_leap_year(2100));
        assert!(is_leap_year(2028));
    }
}
