//! spendwise-config
//!
//! Engine settings and where the data lives on disk.
//! Owns the EngineConfig model plus load/save helpers.

pub mod error;
pub mod manager;
pub mod model;

pub use error::ConfigError;
pub use manager::ConfigManager;
pub use model::{EngineConfig, DATA_DIR_ENV};
