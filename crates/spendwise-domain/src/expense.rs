//! Expense records, including those materialized from recurring patterns.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::*;
use crate::pattern::RecurringPattern;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Expense {
    pub id: Uuid,
    pub amount: f64,
    pub category_id: Uuid,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Weak back-reference to the originating pattern; never owns the expense.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring_pattern_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Expense {
    pub fn is_generated(&self) -> bool {
        self.recurring_pattern_id.is_some()
    }
}

impl Identifiable for Expense {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Amounted for Expense {
    fn amount(&self) -> f64 {
        self.amount
    }
}

/// Payload handed to a store when creating an expense.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub amount: f64,
    pub category_id: Uuid,
    pub date: NaiveDate,
    pub note: Option<String>,
    pub recurring_pattern_id: Option<Uuid>,
}

impl NewExpense {
    pub fn new(amount: f64, category_id: Uuid, date: NaiveDate) -> Self {
        Self {
            amount,
            category_id,
            date,
            note: None,
            recurring_pattern_id: None,
        }
    }

    /// Copies the pattern payload onto a single dated occurrence.
    pub fn from_pattern(pattern: &RecurringPattern, date: NaiveDate) -> Self {
        Self {
            amount: pattern.amount,
            category_id: pattern.category_id,
            date,
            note: pattern.note.clone(),
            recurring_pattern_id: Some(pattern.id),
        }
    }

    pub fn into_expense(self, created_at: DateTime<Utc>) -> Expense {
        Expense {
            id: Uuid::new_v4(),
            amount: self.amount,
            category_id: self.category_id,
            date: self.date,
            note: self.note,
            recurring_pattern_id: self.recurring_pattern_id,
            created_at,
        }
    }
}
