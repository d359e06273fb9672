use std::{path::PathBuf, sync::Mutex};

use chrono::NaiveDate;
use expense_core::StartupSession;
use once_cell::sync::Lazy;
use spendwise_config::{ConfigManager, EngineConfig};
use spendwise_core::FixedClock;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Creates an isolated data directory that outlives the calling test.
pub fn temp_home() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

#[allow(dead_code)]
pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// Opens a session in a fresh directory with `config` saved and the clock pinned to `today`.
#[allow(dead_code)]
pub fn setup_session(config: EngineConfig, today: NaiveDate) -> (StartupSession, PathBuf) {
    let base = temp_home();
    ConfigManager::with_base_dir(&base)
        .expect("config manager")
        .save(&config)
        .expect("save config");
    let session = StartupSession::open_in(&base, Box::new(FixedClock::new(today)))
        .expect("open session");
    (session, base)
}
