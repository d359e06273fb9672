use std::{env, path::PathBuf};

use serde::{Deserialize, Serialize};
use spendwise_domain::LeapDayPolicy;

/// Environment variable that overrides every other data directory setting.
pub const DATA_DIR_ENV: &str = "EXPENSE_CORE_HOME";
const DEFAULT_DIR_NAME: &str = ".expense_core";

/// Tunables for the recurring-expense engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "EngineConfig::default_safety_limit")]
    pub safety_limit: usize,
    #[serde(default)]
    pub leap_day_policy: LeapDayPolicy,
    #[serde(default = "EngineConfig::default_backup_before_generation")]
    pub backup_before_generation: bool,
    #[serde(default = "EngineConfig::default_backup_retention")]
    pub backup_retention: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Optional custom data directory. Defaults to `~/.expense_core`.
    pub data_dir: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            safety_limit: Self::default_safety_limit(),
            leap_day_policy: LeapDayPolicy::default(),
            backup_before_generation: Self::default_backup_before_generation(),
            backup_retention: Self::default_backup_retention(),
            data_dir: None,
        }
    }
}

impl EngineConfig {
    pub fn default_safety_limit() -> usize {
        365
    }

    pub fn default_backup_before_generation() -> bool {
        true
    }

    pub fn default_backup_retention() -> usize {
        5
    }

    /// Safety limit as the engine applies it; zero behaves like one.
    pub fn effective_safety_limit(&self) -> usize {
        self.safety_limit.max(1)
    }

    /// Resolves the data directory from `EXPENSE_CORE_HOME`, then `data_dir`, then the home dir.
    pub fn resolve_data_dir(&self) -> PathBuf {
        let from_env = env::var_os(DATA_DIR_ENV)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);
        self.resolve_data_dir_with(from_env)
    }

    pub fn resolve_data_dir_with(&self, env_override: Option<PathBuf>) -> PathBuf {
        if let Some(path) = env_override {
            return path;
        }
        if let Some(path) = &self.data_dir {
            return path.clone();
        }
        default_data_dir()
    }
}

pub fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}
