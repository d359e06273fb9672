use std::result::Result as StdResult;

use spendwise_config::ConfigError;
use spendwise_core::CoreError;
use thiserror::Error;
use uuid::Uuid;

/// Unified error type for the application facade and CLI.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Persistence error: {0}")]
    Storage(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Recurring pattern not found: {0}")]
    PatternNotFound(Uuid),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = StdResult<T, AppError>;

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(err.to_string())
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::PatternNotFound(id) => AppError::PatternNotFound(id),
            CoreError::Persistence(message) | CoreError::Serde(message) => {
                AppError::Storage(message)
            }
            CoreError::Validation(message) | CoreError::InvalidOperation(message) => {
                AppError::InvalidInput(message)
            }
            CoreError::Io(err) => AppError::Storage(err.to_string()),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Io(io) => AppError::Storage(io.to_string()),
            ConfigError::Serde(message) => AppError::Config(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_user_facing_variants() {
        let id = Uuid::new_v4();
        assert!(matches!(
            AppError::from(CoreError::PatternNotFound(id)),
            AppError::PatternNotFound(found) if found == id
        ));
        assert!(matches!(
            AppError::from(CoreError::Validation("bad".into())),
            AppError::InvalidInput(_)
        ));
        assert!(matches!(
            AppError::from(ConfigError::Serde("oops".into())),
            AppError::Config(_)
        ));
    }
}
