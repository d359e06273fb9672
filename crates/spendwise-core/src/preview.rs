//! Read-only views over patterns: next occurrence previews and derived state.

use chrono::NaiveDate;
use uuid::Uuid;

use spendwise_domain::{LeapDayPolicy, RecurringPattern};

use crate::occurrence::next_due_occurrence;

/// Lifecycle stage derived from dates on every call; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternState {
    Dormant,
    Active,
    Exhausted,
    Paused,
}

impl PatternState {
    pub fn label(&self) -> &'static str {
        match self {
            PatternState::Dormant => "Dormant",
            PatternState::Active => "Active",
            PatternState::Exhausted => "Exhausted",
            PatternState::Paused => "Paused",
        }
    }
}

#[derive(Debug, Clone)]
pub struct PatternSnapshot {
    pub pattern_id: Uuid,
    pub frequency_label: &'static str,
    pub amount: f64,
    pub note: Option<String>,
    pub state: PatternState,
    pub checkpoint: Option<NaiveDate>,
    pub next_due: Option<NaiveDate>,
}

/// Date to show as "next" for a pattern. Performs no writes.
pub fn preview_next(
    pattern: &RecurringPattern,
    today: NaiveDate,
    policy: LeapDayPolicy,
) -> Option<NaiveDate> {
    if pattern.start_date > today {
        return Some(pattern.start_date);
    }
    next_due_occurrence(pattern, pattern.anchor(), policy)
}

pub fn pattern_state(
    pattern: &RecurringPattern,
    today: NaiveDate,
    policy: LeapDayPolicy,
) -> PatternState {
    if !pattern.is_active {
        return PatternState::Paused;
    }
    if pattern.start_date > today {
        return PatternState::Dormant;
    }
    match next_due_occurrence(pattern, pattern.anchor(), policy) {
        Some(_) => PatternState::Active,
        None => PatternState::Exhausted,
    }
}

/// Builds display rows ordered by next due date; exhausted patterns sort last.
pub fn snapshot_patterns(
    patterns: &[RecurringPattern],
    today: NaiveDate,
    policy: LeapDayPolicy,
) -> Vec<PatternSnapshot> {
    let mut snapshots: Vec<PatternSnapshot> = patterns
        .iter()
        .map(|pattern| {
            let state = pattern_state(pattern, today, policy);
            let next_due = match state {
                PatternState::Exhausted => None,
                _ => preview_next(pattern, today, policy),
            };
            PatternSnapshot {
                pattern_id: pattern.id,
                frequency_label: pattern.frequency.label(),
                amount: pattern.amount,
                note: pattern.note.clone(),
                state,
                checkpoint: pattern.last_generated_date,
                next_due,
            }
        })
        .collect();
    snapshots.sort_by_key(|snap| (snap.next_due.is_none(), snap.next_due, snap.pattern_id));
    snapshots
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn future_start_previews_start_date() {
        let pattern = RecurringPattern::monthly(8.0, Uuid::new_v4(), 15, date(2024, 9, 1));
        let today = date(2024, 8, 20);

        assert_eq!(
            preview_next(&pattern, today, LeapDayPolicy::Skip),
            Some(date(2024, 9, 1))
        );
        assert_eq!(
            pattern_state(&pattern, today, LeapDayPolicy::Skip),
            PatternState::Dormant
        );
    }

    #[test]
    fn started_pattern_previews_from_checkpoint() {
        let pattern = RecurringPattern::monthly(8.0, Uuid::new_v4(), 31, date(2024, 1, 1))
            .with_checkpoint(date(2024, 3, 31));

        assert_eq!(
            preview_next(&pattern, date(2024, 4, 15), LeapDayPolicy::Skip),
            Some(date(2024, 4, 30))
        );
    }

    #[test]
    fn states_cover_exhausted_and_paused() {
        let today = date(2024, 6, 1);
        let ended = RecurringPattern::daily(1.0, Uuid::new_v4(), date(2024, 1, 1))
            .with_end_date(date(2024, 1, 31))
            .with_checkpoint(date(2024, 1, 31));
        let paused = RecurringPattern::daily(1.0, Uuid::new_v4(), date(2024, 1, 1)).deactivated();

        assert_eq!(
            pattern_state(&ended, today, LeapDayPolicy::Skip),
            PatternState::Exhausted
        );
        assert_eq!(
            pattern_state(&paused, today, LeapDayPolicy::Skip),
            PatternState::Paused
        );
    }

    #[test]
    fn snapshots_sort_by_next_due() {
        let today = date(2024, 6, 1);
        let monthly = RecurringPattern::monthly(50.0, Uuid::new_v4(), 20, date(2024, 1, 1))
            .with_checkpoint(date(2024, 5, 20));
        let daily = RecurringPattern::daily(2.0, Uuid::new_v4(), date(2024, 1, 1))
            .with_checkpoint(date(2024, 6, 1));
        let ended = RecurringPattern::daily(1.0, Uuid::new_v4(), date(2024, 1, 1))
            .with_end_date(date(2024, 1, 2))
            .with_checkpoint(date(2024, 1, 2));

        let rows = snapshot_patterns(
            &[ended.clone(), monthly, daily.clone()],
            today,
            LeapDayPolicy::Skip,
        );

        assert_eq!(rows[0].pattern_id, daily.id);
        assert_eq!(rows[0].next_due, Some(date(2024, 6, 2)));
        assert_eq!(rows[1].next_due, Some(date(2024, 6, 20)));
        assert_eq!(rows[2].pattern_id, ended.id);
        assert_eq!(rows[2].state, PatternState::Exhausted);
    }
}
