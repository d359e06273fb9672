#![doc(test(attr(deny(warnings))))]

//! Expense Core runs recurring-expense catch-up generation over a local data
//! directory and exposes it through a small command line front end.

pub mod cli;
pub mod clock;
pub mod errors;
pub mod output;
pub mod session;
pub mod utils;

pub use clock::SystemClock;
pub use errors::{AppError, Result};
pub use session::{StartupReport, StartupSession};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!(
            version = utils::build_info::CLI_VERSION,
            "Expense Core tracing initialized."
        );
    });
}
