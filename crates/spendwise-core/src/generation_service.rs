//! Generation pass over every active recurring pattern.

use chrono::NaiveDate;
use tracing::{error, info, warn};
use uuid::Uuid;

use spendwise_domain::RecurringPattern;

use crate::{
    catch_up::{generate_for_pattern, GenerationOptions},
    preview::{preview_next, snapshot_patterns, PatternSnapshot},
    Clock, CoreError, RecurringStore,
};

/// A pattern that failed during a pass, with the error rendered for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternFailure {
    pub pattern_id: Uuid,
    pub message: String,
}

/// Aggregate outcome of one generation pass. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    pub as_of: NaiveDate,
    pub generated: usize,
    pub errors: Vec<PatternFailure>,
    /// Patterns whose backlog was cut short by the safety limit.
    pub deferred: Vec<Uuid>,
}

impl GenerationResult {
    pub fn new(as_of: NaiveDate) -> Self {
        Self {
            as_of,
            generated: 0,
            errors: Vec::new(),
            deferred: Vec::new(),
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Short, non-blocking notice for the user, or `None` when every pattern succeeded.
    pub fn failure_summary(&self) -> Option<String> {
        match self.errors.len() {
            0 => None,
            1 => Some("1 recurring expense could not be generated".into()),
            n => Some(format!("{} recurring expenses could not be generated", n)),
        }
    }
}

/// Runs catch-up generation across patterns and exposes read-only previews.
pub struct GenerationService {
    clock: Box<dyn Clock>,
    options: GenerationOptions,
}

impl GenerationService {
    pub fn new(clock: Box<dyn Clock>) -> Self {
        Self::with_options(clock, GenerationOptions::default())
    }

    pub fn with_options(clock: Box<dyn Clock>, options: GenerationOptions) -> Self {
        Self { clock, options }
    }

    pub fn options(&self) -> &GenerationOptions {
        &self.options
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Generates every occurrence due on or before `as_of` (today when `None`).
    ///
    /// Only a failure to list patterns aborts the pass; any other failure is
    /// recorded against its pattern and the pass moves on.
    pub fn generate_due_occurrences(
        &self,
        store: &mut dyn RecurringStore,
        as_of: Option<NaiveDate>,
    ) -> Result<GenerationResult, CoreError> {
        self.generate_with_refresh(store, as_of, |_| {})
    }

    /// Same as [`generate_due_occurrences`](Self::generate_due_occurrences), invoking
    /// `on_refresh` when at least one expense was created.
    pub fn generate_with_refresh<F>(
        &self,
        store: &mut dyn RecurringStore,
        as_of: Option<NaiveDate>,
        on_refresh: F,
    ) -> Result<GenerationResult, CoreError>
    where
        F: FnOnce(&GenerationResult),
    {
        let as_of = as_of.unwrap_or_else(|| self.clock.today());
        let patterns = store.list_active_patterns().map_err(|err| {
            error!(error = %err, "failed to list active recurring patterns");
            err
        })?;

        let mut result = GenerationResult::new(as_of);
        for pattern in &patterns {
            match generate_for_pattern(pattern, as_of, store, &self.options) {
                Ok(run) => {
                    result.generated += run.generated;
                    if run.limit_reached {
                        result.deferred.push(run.pattern_id);
                    }
                }
                Err(err) => {
                    warn!(
                        pattern_id = %err.pattern_id,
                        generated = err.generated,
                        error = %err.source,
                        "recurring pattern failed"
                    );
                    result.generated += err.generated;
                    result.errors.push(PatternFailure {
                        pattern_id: err.pattern_id,
                        message: err.source.to_string(),
                    });
                }
            }
        }

        info!(
            %as_of,
            patterns = patterns.len(),
            generated = result.generated,
            failed = result.errors.len(),
            "recurring generation finished"
        );
        if result.generated > 0 {
            on_refresh(&result);
        }
        Ok(result)
    }

    pub fn preview_next(&self, pattern: &RecurringPattern) -> Option<NaiveDate> {
        preview_next(pattern, self.clock.today(), self.options.leap_day_policy)
    }

    pub fn snapshot(&self, patterns: &[RecurringPattern]) -> Vec<PatternSnapshot> {
        snapshot_patterns(patterns, self.clock.today(), self.options.leap_day_policy)
    }
}
