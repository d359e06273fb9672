//! Shared traits and policy enums for recurring-expense primitives.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Exposes a stable identifier for entities held by a store.
pub trait Identifiable {
    fn id(&self) -> Uuid;
}

/// Supplies a common contract for retrieving numeric amounts.
pub trait Amounted {
    fn amount(&self) -> f64;
}

pub fn find_by_id<T: Identifiable>(items: &[T], id: Uuid) -> Option<&T> {
    items.iter().find(|item| item.id() == id)
}

/// Sums amounts across any collection of amounted records.
pub fn total_amount<'a, T, I>(items: I) -> f64
where
    T: Amounted + 'a,
    I: IntoIterator<Item = &'a T>,
{
    items.into_iter().map(Amounted::amount).sum()
}

/// Decides what a yearly February 29 pattern does in a non-leap year.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LeapDayPolicy {
    /// No occurrence in non-leap years; the next one lands on the following leap day.
    #[default]
    Skip,
    /// Non-leap years produce an occurrence on February 28.
    ClampToFeb28,
}

impl fmt::Display for LeapDayPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LeapDayPolicy::Skip => "skip",
            LeapDayPolicy::ClampToFeb28 => "clamp_to_feb28",
        };
        f.write_str(label)
    }
}
