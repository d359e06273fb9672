use chrono::{DateTime, Local, NaiveDate, Utc};

use spendwise_core::Clock;

/// Wall clock: UTC timestamps, local calendar day.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}
