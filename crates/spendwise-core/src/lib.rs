//! spendwise-core
//!
//! Recurring-expense scheduling and catch-up generation.
//! Depends on spendwise-domain. No CLI, no terminal I/O; persistence only through
//! the [`RecurringStore`] trait.

pub mod calendar;
pub mod catch_up;
pub mod error;
pub mod generation_service;
pub mod occurrence;
pub mod preview;
pub mod storage;
pub mod time;

pub use catch_up::*;
pub use error::CoreError;
pub use generation_service::*;
pub use occurrence::*;
pub use preview::*;
pub use storage::{MemoryStore, RecurringStore};
pub use time::{Clock, FixedClock};
