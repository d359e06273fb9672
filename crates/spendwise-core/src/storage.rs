use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use spendwise_domain::{find_by_id, Expense, NewExpense, RecurringPattern};

use crate::CoreError;

/// Persistence operations the generation engine relies on.
///
/// Writes between [`begin`](RecurringStore::begin) and
/// [`commit`](RecurringStore::commit) must become visible together or not at all;
/// [`rollback`](RecurringStore::rollback) discards them.
pub trait RecurringStore {
    fn list_active_patterns(&self) -> Result<Vec<RecurringPattern>, CoreError>;
    fn create_expense(&mut self, expense: NewExpense) -> Result<Expense, CoreError>;
    fn set_checkpoint(&mut self, pattern_id: Uuid, date: NaiveDate) -> Result<(), CoreError>;

    fn begin(&mut self) -> Result<(), CoreError>;
    fn commit(&mut self) -> Result<(), CoreError>;
    fn rollback(&mut self);
}

#[derive(Debug, Clone, Default)]
struct MemoryState {
    patterns: Vec<RecurringPattern>,
    expenses: Vec<Expense>,
}

/// In-process store used by tests and as a scratch backend.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: MemoryState,
    snapshot: Option<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_patterns(patterns: impl IntoIterator<Item = RecurringPattern>) -> Self {
        let mut store = Self::new();
        store.state.patterns.extend(patterns);
        store
    }

    pub fn insert_pattern(&mut self, pattern: RecurringPattern) -> Result<Uuid, CoreError> {
        if let Some(issue) = pattern.configuration_issue() {
            return Err(CoreError::Validation(issue));
        }
        let id = pattern.id;
        self.state.patterns.push(pattern);
        Ok(id)
    }

    pub fn pattern(&self, id: Uuid) -> Option<&RecurringPattern> {
        find_by_id(&self.state.patterns, id)
    }

    pub fn patterns(&self) -> &[RecurringPattern] {
        &self.state.patterns
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.state.expenses
    }

    pub fn expenses_for(&self, pattern_id: Uuid) -> Vec<&Expense> {
        self.state
            .expenses
            .iter()
            .filter(|expense| expense.recurring_pattern_id == Some(pattern_id))
            .collect()
    }

    pub fn in_transaction(&self) -> bool {
        self.snapshot.is_some()
    }
}

impl RecurringStore for MemoryStore {
    fn list_active_patterns(&self) -> Result<Vec<RecurringPattern>, CoreError> {
        Ok(self
            .state
            .patterns
            .iter()
            .filter(|pattern| pattern.is_active)
            .cloned()
            .collect())
    }

    fn create_expense(&mut self, expense: NewExpense) -> Result<Expense, CoreError> {
        let expense = expense.into_expense(Utc::now());
        self.state.expenses.push(expense.clone());
        Ok(expense)
    }

    fn set_checkpoint(&mut self, pattern_id: Uuid, date: NaiveDate) -> Result<(), CoreError> {
        let pattern = self
            .state
            .patterns
            .iter_mut()
            .find(|pattern| pattern.id == pattern_id)
            .ok_or(CoreError::PatternNotFound(pattern_id))?;
        pattern.last_generated_date = Some(date);
        Ok(())
    }

    fn begin(&mut self) -> Result<(), CoreError> {
        if self.snapshot.is_some() {
            return Err(CoreError::InvalidOperation(
                "transaction already in progress".into(),
            ));
        }
        self.snapshot = Some(self.state.clone());
        Ok(())
    }

    fn commit(&mut self) -> Result<(), CoreError> {
        self.snapshot
            .take()
            .map(|_| ())
            .ok_or_else(|| CoreError::InvalidOperation("no transaction in progress".into()))
    }

    fn rollback(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            self.state = snapshot;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn rollback_discards_writes_since_begin() {
        let pattern = RecurringPattern::daily(2.0, Uuid::new_v4(), date(2024, 1, 1));
        let id = pattern.id;
        let mut store = MemoryStore::with_patterns([pattern.clone()]);

        store.begin().unwrap();
        store
            .create_expense(NewExpense::from_pattern(&pattern, date(2024, 1, 2)))
            .unwrap();
        store.set_checkpoint(id, date(2024, 1, 2)).unwrap();
        store.rollback();

        assert!(store.expenses().is_empty());
        assert_eq!(store.pattern(id).unwrap().last_generated_date, None);
        assert!(!store.in_transaction());
    }

    #[test]
    fn nested_begin_is_rejected() {
        let mut store = MemoryStore::new();
        store.begin().unwrap();
        let err = store.begin().expect_err("nested transaction");
        assert!(matches!(err, CoreError::InvalidOperation(_)));
    }

    #[test]
    fn checkpoint_for_unknown_pattern_fails() {
        let mut store = MemoryStore::new();
        let missing = Uuid::new_v4();
        let err = store
            .set_checkpoint(missing, date(2024, 1, 1))
            .expect_err("unknown pattern");
        assert!(matches!(err, CoreError::PatternNotFound(id) if id == missing));
    }

    #[test]
    fn insert_rejects_misconfigured_patterns() {
        let mut store = MemoryStore::new();
        let pattern = RecurringPattern::new(
            5.0,
            Uuid::new_v4(),
            spendwise_domain::Frequency::Weekly,
            date(2024, 1, 1),
        );
        let err = store.insert_pattern(pattern).expect_err("missing weekday");
        assert!(matches!(err, CoreError::Validation(_)));
    }
}
