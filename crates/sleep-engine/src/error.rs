//! Error types for sleep-engine operations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Invalid time: {0}")]
    InvalidTime(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid category: {0}")]
    InvalidCategory(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("A save is already in flight")]
    SaveInFlight,

    #[error("No saved entry to operate on")]
    NoEntry,

    #[error("No save is in flight")]
    NoSaveInFlight,

    #[error("Storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
