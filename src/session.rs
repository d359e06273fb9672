//! Application session: resolves the data directory, loads configuration and
//! runs the startup generation pass against the JSON store.

use std::{
    env,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use tracing::{info, warn};
use uuid::Uuid;

use spendwise_config::{model::default_data_dir, ConfigManager, EngineConfig, DATA_DIR_ENV};
use spendwise_core::{
    Clock, GenerationOptions, GenerationResult, GenerationService, PatternSnapshot,
};
use spendwise_domain::{Expense, RecurringPattern};
use spendwise_storage_json::{BackupInfo, JsonRecurringStore};

use crate::{clock::SystemClock, errors::Result};

const STARTUP_BACKUP_NOTE: &str = "before generation";

/// Outcome of one startup pass, ready for display.
#[derive(Debug)]
pub struct StartupReport {
    pub result: GenerationResult,
    pub backup: Option<BackupInfo>,
    /// The refresh hook ran because new expenses were created.
    pub refreshed: bool,
}

impl StartupReport {
    pub fn failure_summary(&self) -> Option<String> {
        self.result.failure_summary()
    }
}

pub struct StartupSession {
    data_dir: PathBuf,
    config_manager: ConfigManager,
    config: EngineConfig,
    store: JsonRecurringStore,
    service: GenerationService,
}

impl StartupSession {
    /// Opens the session for the directory named by `EXPENSE_CORE_HOME`, or the default home.
    pub fn open() -> Result<Self> {
        let env_home = env::var_os(DATA_DIR_ENV)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);
        let base = env_home.clone().unwrap_or_else(default_data_dir);
        let config_manager = ConfigManager::with_base_dir(&base)?;
        let config = config_manager.load()?;
        let data_dir = config.resolve_data_dir_with(env_home);
        Self::assemble(data_dir, config_manager, config, Box::new(SystemClock))
    }

    /// Opens a session rooted at `base` with an explicit clock.
    pub fn open_in(base: &Path, clock: Box<dyn Clock>) -> Result<Self> {
        let config_manager = ConfigManager::with_base_dir(base)?;
        let config = config_manager.load()?;
        let data_dir = config
            .data_dir
            .clone()
            .unwrap_or_else(|| base.to_path_buf());
        Self::assemble(data_dir, config_manager, config, clock)
    }

    fn assemble(
        data_dir: PathBuf,
        config_manager: ConfigManager,
        config: EngineConfig,
        clock: Box<dyn Clock>,
    ) -> Result<Self> {
        let store = JsonRecurringStore::open_with_retention(&data_dir, config.backup_retention)?;
        let service = GenerationService::with_options(clock, generation_options(&config));
        info!(
            data_dir = %data_dir.display(),
            safety_limit = config.effective_safety_limit(),
            leap_day_policy = %config.leap_day_policy,
            "session opened"
        );
        Ok(Self {
            data_dir,
            config_manager,
            config,
            store,
            service,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn config_manager(&self) -> &ConfigManager {
        &self.config_manager
    }

    pub fn store(&self) -> &JsonRecurringStore {
        &self.store
    }

    pub fn today(&self) -> NaiveDate {
        self.service.today()
    }

    /// Runs catch-up generation for every active pattern.
    ///
    /// A backup is taken first when configured; a failed backup is logged and
    /// generation still runs. Only a failure to read the pattern list is an error.
    pub fn run_startup_pass(&mut self, as_of: Option<NaiveDate>) -> Result<StartupReport> {
        let backup = if self.config.backup_before_generation && !self.store.patterns().is_empty() {
            match self.store.backup(Some(STARTUP_BACKUP_NOTE)) {
                Ok(info) => Some(info),
                Err(err) => {
                    warn!(error = %err, "backup before generation failed");
                    None
                }
            }
        } else {
            None
        };

        let mut refreshed = false;
        let result = self
            .service
            .generate_with_refresh(&mut self.store, as_of, |result| {
                info!(generated = result.generated, "expense views refreshed");
                refreshed = true;
            })?;

        Ok(StartupReport {
            result,
            backup,
            refreshed,
        })
    }

    pub fn snapshot(&self) -> Vec<PatternSnapshot> {
        self.service.snapshot(self.store.patterns())
    }

    pub fn add_pattern(&mut self, pattern: RecurringPattern) -> Result<Uuid> {
        let id = self.store.insert_pattern(pattern)?;
        info!(pattern_id = %id, "recurring pattern added");
        Ok(id)
    }

    /// Expenses newest first.
    pub fn expenses(&self) -> Vec<Expense> {
        let mut expenses = self.store.expenses().to_vec();
        expenses.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));
        expenses
    }
}

pub fn generation_options(config: &EngineConfig) -> GenerationOptions {
    GenerationOptions {
        safety_limit: config.effective_safety_limit(),
        leap_day_policy: config.leap_day_policy,
    }
}
