//! Next-occurrence computation for recurring patterns.
//!
//! Every computed date is strictly after the anchor it was computed from. Callers
//! that walk a pattern forward feed each result back in as the next anchor.

use chrono::{Datelike, Duration, NaiveDate};

use spendwise_domain::{LeapDayPolicy, RecurringPattern, Schedule};

use crate::calendar;

/// Consecutive non-leap years probed before a leap-day pattern is treated as exhausted.
pub const MAX_SKIPPED_YEARS: usize = 8;

/// Outcome of advancing a pattern by one step from an anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occurrence {
    Due(NaiveDate),
    /// February 29 anniversary whose target year has no leap day.
    Skipped { year: i32 },
    /// Past the end date, or the pattern is missing a field its frequency requires.
    Exhausted,
}

impl Occurrence {
    pub fn date(self) -> Option<NaiveDate> {
        match self {
            Occurrence::Due(date) => Some(date),
            Occurrence::Skipped { .. } | Occurrence::Exhausted => None,
        }
    }
}

/// Computes the single next candidate after `anchor` using the default leap-day policy.
pub fn next_occurrence(pattern: &RecurringPattern, anchor: NaiveDate) -> Option<NaiveDate> {
    occurrence_after(pattern, anchor, LeapDayPolicy::default()).date()
}

pub fn next_occurrence_with(
    pattern: &RecurringPattern,
    anchor: NaiveDate,
    policy: LeapDayPolicy,
) -> Option<NaiveDate> {
    occurrence_after(pattern, anchor, policy).date()
}

pub fn occurrence_after(
    pattern: &RecurringPattern,
    anchor: NaiveDate,
    policy: LeapDayPolicy,
) -> Occurrence {
    let Some(schedule) = pattern.schedule() else {
        return Occurrence::Exhausted;
    };
    let candidate = match schedule {
        Schedule::Daily => anchor.succ_opt(),
        Schedule::Weekly { weekday } => {
            let target = weekday.num_days_from_sunday() as i64;
            let current = anchor.weekday().num_days_from_sunday() as i64;
            let mut days = (target - current + 7) % 7;
            if days == 0 {
                days = 7;
            }
            anchor.checked_add_signed(Duration::days(days))
        }
        Schedule::Monthly { day } => calendar::shift_months(anchor, 1, day),
        Schedule::Yearly { month, day } => {
            // The anchor's own year counts only when its anniversary lies after the anchor.
            let mut year = anchor.year();
            if !calendar::clamped_date(year, month, day).is_some_and(|date| date > anchor) {
                year += 1;
            }
            if schedule.is_leap_day_anniversary()
                && !calendar::is_leap_year(year)
                && policy == LeapDayPolicy::Skip
            {
                return Occurrence::Skipped { year };
            }
            calendar::clamped_date(year, month, day)
        }
    };
    match candidate {
        Some(date) if pattern.end_date.map_or(true, |end| date <= end) => Occurrence::Due(date),
        _ => Occurrence::Exhausted,
    }
}

/// Like [`next_occurrence_with`], but steps over skipped leap-day years so a
/// February 29 pattern resumes on the next leap year instead of stalling.
pub fn next_due_occurrence(
    pattern: &RecurringPattern,
    anchor: NaiveDate,
    policy: LeapDayPolicy,
) -> Option<NaiveDate> {
    let mut probe = anchor;
    for _ in 0..=MAX_SKIPPED_YEARS {
        match occurrence_after(pattern, probe, policy) {
            Occurrence::Due(date) => return Some(date),
            Occurrence::Exhausted => return None,
            Occurrence::Skipped { year } => {
                probe = NaiveDate::from_ymd_opt(year, 12, 31)?;
            }
        }
    }
    None
}
