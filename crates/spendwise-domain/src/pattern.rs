//! Recurring expense patterns and their typed schedules.

use std::fmt;

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::*;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn label(&self) -> &'static str {
        match self {
            Frequency::Daily => "Daily",
            Frequency::Weekly => "Weekly",
            Frequency::Monthly => "Monthly",
            Frequency::Yearly => "Yearly",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A fully resolved schedule: every field the frequency needs is present and in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    Daily,
    Weekly { weekday: Weekday },
    Monthly { day: u32 },
    Yearly { month: u32, day: u32 },
}

impl Schedule {
    /// February 29 yearly schedules only exist in leap years.
    pub fn is_leap_day_anniversary(&self) -> bool {
        matches!(self, Schedule::Yearly { month: 2, day: 29 })
    }
}

/// User-declared rule describing a repeating expense.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecurringPattern {
    pub id: Uuid,
    pub amount: f64,
    pub category_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub frequency: Frequency,
    /// 0 = Sunday through 6 = Saturday.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_month: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month_of_year: Option<u32>,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    /// Checkpoint: the date through which occurrences have been materialized.
    #[serde(default)]
    pub last_generated_date: Option<NaiveDate>,
    #[serde(default = "RecurringPattern::default_active")]
    pub is_active: bool,
}

impl RecurringPattern {
    pub fn new(amount: f64, category_id: Uuid, frequency: Frequency, start_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            amount,
            category_id,
            note: None,
            frequency,
            day_of_week: None,
            day_of_month: None,
            month_of_year: None,
            start_date,
            end_date: None,
            last_generated_date: None,
            is_active: true,
        }
    }

    pub fn daily(amount: f64, category_id: Uuid, start_date: NaiveDate) -> Self {
        Self::new(amount, category_id, Frequency::Daily, start_date)
    }

    pub fn weekly(amount: f64, category_id: Uuid, day_of_week: u8, start_date: NaiveDate) -> Self {
        Self::new(amount, category_id, Frequency::Weekly, start_date).with_day_of_week(day_of_week)
    }

    pub fn monthly(amount: f64, category_id: Uuid, day_of_month: u32, start_date: NaiveDate) -> Self {
        Self::new(amount, category_id, Frequency::Monthly, start_date)
            .with_day_of_month(day_of_month)
    }

    pub fn yearly(
        amount: f64,
        category_id: Uuid,
        month_of_year: u32,
        day_of_month: u32,
        start_date: NaiveDate,
    ) -> Self {
        Self::new(amount, category_id, Frequency::Yearly, start_date)
            .with_month_of_year(month_of_year)
            .with_day_of_month(day_of_month)
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_day_of_week(mut self, day_of_week: u8) -> Self {
        self.day_of_week = Some(day_of_week);
        self
    }

    pub fn with_day_of_month(mut self, day_of_month: u32) -> Self {
        self.day_of_month = Some(day_of_month);
        self
    }

    pub fn with_month_of_year(mut self, month_of_year: u32) -> Self {
        self.month_of_year = Some(month_of_year);
        self
    }

    pub fn with_end_date(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    pub fn with_checkpoint(mut self, last_generated_date: NaiveDate) -> Self {
        self.last_generated_date = Some(last_generated_date);
        self
    }

    pub fn deactivated(mut self) -> Self {
        self.is_active = false;
        self
    }

    pub fn default_active() -> bool {
        true
    }

    /// Resolves the optional per-frequency fields into a typed schedule.
    ///
    /// Returns `None` when a field the frequency requires is missing or out of range;
    /// such a pattern produces no occurrences until the user corrects it.
    pub fn schedule(&self) -> Option<Schedule> {
        match self.frequency {
            Frequency::Daily => Some(Schedule::Daily),
            Frequency::Weekly => {
                let weekday = weekday_from_sunday_index(self.day_of_week?)?;
                Some(Schedule::Weekly { weekday })
            }
            Frequency::Monthly => {
                let day = self.day_of_month.filter(|day| (1..=31).contains(day))?;
                Some(Schedule::Monthly { day })
            }
            Frequency::Yearly => {
                let day = self.day_of_month.filter(|day| (1..=31).contains(day))?;
                let month = self.month_of_year.filter(|month| (1..=12).contains(month))?;
                Some(Schedule::Yearly { month, day })
            }
        }
    }

    /// Describes the first configuration problem, if any.
    pub fn configuration_issue(&self) -> Option<String> {
        if !self.amount.is_finite() {
            return Some("amount must be a finite number".into());
        }
        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Some(format!(
                    "end date {} precedes start date {}",
                    end, self.start_date
                ));
            }
        }
        if self.schedule().is_some() {
            return None;
        }
        let message = match self.frequency {
            Frequency::Daily => return None,
            Frequency::Weekly => match self.day_of_week {
                None => "weekly patterns require a day of week".to_string(),
                Some(value) => format!("day of week {} is outside 0-6", value),
            },
            Frequency::Monthly => match self.day_of_month {
                None => "monthly patterns require a day of month".to_string(),
                Some(value) => format!("day of month {} is outside 1-31", value),
            },
            Frequency::Yearly => match (self.month_of_year, self.day_of_month) {
                (None, _) => "yearly patterns require a month of year".to_string(),
                (_, None) => "yearly patterns require a day of month".to_string(),
                (Some(month), _) if !(1..=12).contains(&month) => {
                    format!("month of year {} is outside 1-12", month)
                }
                (_, Some(day)) => format!("day of month {} is outside 1-31", day),
            },
        };
        Some(message)
    }

    /// The date generation resumes from: the checkpoint, never earlier than the start date.
    pub fn anchor(&self) -> NaiveDate {
        match self.last_generated_date {
            Some(checkpoint) => checkpoint.max(self.start_date),
            None => self.start_date,
        }
    }
}

impl Identifiable for RecurringPattern {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Amounted for RecurringPattern {
    fn amount(&self) -> f64 {
        self.amount
    }
}

/// Maps a 0 = Sunday weekday index onto chrono's `Weekday`.
pub fn weekday_from_sunday_index(index: u8) -> Option<Weekday> {
    let weekday = match index {
        0 => Weekday::Sun,
        1 => Weekday::Mon,
        2 => Weekday::Tue,
        3 => Weekday::Wed,
        4 => Weekday::Thu,
        5 => Weekday::Fri,
        6 => Weekday::Sat,
        _ => return None,
    };
    Some(weekday)
}
