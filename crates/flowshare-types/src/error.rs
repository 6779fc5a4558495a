//! Error types for flowshare

use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration directory not found")]
    NotFound,

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Unknown tenant: {0}")]
    UnknownTenant(String),

    #[error("Allocation model not supported: {0}")]
    UnsupportedAllocationModel(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid measurement: {0}")]
    InvalidMeasurement(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Reconciliation failed: {0}")]
    Reconciliation(String),

    #[error("Excel export error: {0}")]
    Excel(String),

    #[error("Session error: {0}")]
    Session(String),
}

pub type Result<T> = std::result::Result<T, Error>;
