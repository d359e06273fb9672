//! Catch-up generation for a single recurring pattern.

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use spendwise_domain::{Expense, LeapDayPolicy, NewExpense, RecurringPattern};

use crate::{occurrence::next_due_occurrence, CoreError, RecurringStore};

/// Upper bound on occurrences materialized for one pattern in one call.
pub const DEFAULT_SAFETY_LIMIT: usize = 365;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationOptions {
    pub safety_limit: usize,
    pub leap_day_policy: LeapDayPolicy,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            safety_limit: DEFAULT_SAFETY_LIMIT,
            leap_day_policy: LeapDayPolicy::default(),
        }
    }
}

/// Progress made for one pattern during one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatchUp {
    pub pattern_id: Uuid,
    pub generated: usize,
    pub checkpoint: Option<NaiveDate>,
    /// The safety limit stopped the loop while occurrences were still due.
    pub limit_reached: bool,
}

/// A pattern failed part-way; `generated` occurrences were committed before the failure.
#[derive(Debug, Error)]
#[error("{source}")]
pub struct CatchUpError {
    pub pattern_id: Uuid,
    pub generated: usize,
    pub source: CoreError,
}

/// Materializes every occurrence of `pattern` due on or before `as_of`.
///
/// Each occurrence is written together with its checkpoint in one store
/// transaction, so calling this again with the same `as_of` generates nothing.
pub fn generate_for_pattern(
    pattern: &RecurringPattern,
    as_of: NaiveDate,
    store: &mut dyn RecurringStore,
    options: &GenerationOptions,
) -> Result<CatchUp, CatchUpError> {
    let mut run = CatchUp {
        pattern_id: pattern.id,
        generated: 0,
        checkpoint: pattern.last_generated_date,
        limit_reached: false,
    };
    if pattern.start_date > as_of {
        debug!(pattern_id = %pattern.id, start = %pattern.start_date, "pattern not started");
        return Ok(run);
    }

    let limit = options.safety_limit.max(1);
    let policy = options.leap_day_policy;
    let mut anchor = pattern.anchor();

    while run.generated < limit {
        let Some(candidate) = next_due_occurrence(pattern, anchor, policy) else {
            break;
        };
        if candidate > as_of {
            break;
        }
        materialize(store, pattern, candidate).map_err(|source| CatchUpError {
            pattern_id: pattern.id,
            generated: run.generated,
            source,
        })?;
        debug!(pattern_id = %pattern.id, date = %candidate, "materialized occurrence");
        run.checkpoint = Some(candidate);
        run.generated += 1;
        anchor = candidate;
    }

    if run.generated >= limit
        && next_due_occurrence(pattern, anchor, policy).is_some_and(|next| next <= as_of)
    {
        run.limit_reached = true;
        warn!(
            pattern_id = %pattern.id,
            limit,
            checkpoint = %anchor,
            "safety limit reached; remaining backlog deferred to next run"
        );
    }

    Ok(run)
}

fn materialize(
    store: &mut dyn RecurringStore,
    pattern: &RecurringPattern,
    date: NaiveDate,
) -> Result<Expense, CoreError> {
    store.begin()?;
    let written = store
        .create_expense(NewExpense::from_pattern(pattern, date))
        .and_then(|expense| {
            store.set_checkpoint(pattern.id, date)?;
            Ok(expense)
        });
    let expense = match written {
        Ok(expense) => expense,
        Err(err) => {
            store.rollback();
            return Err(err);
        }
    };
    if let Err(err) = store.commit() {
        store.rollback();
        return Err(err);
    }
    Ok(expense)
}
