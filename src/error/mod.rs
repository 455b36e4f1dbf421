// Error types for packman utilities
// Author: kelexine (https://github.com/kelexine)

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown log level: {0}")]
    InvalidLevel(String),

    #[error("Invalid retry policy: {0}")]
    InvalidRetryPolicy(String),

    #[error("Status interval must be greater than zero")]
    InvalidStatusInterval,

    #[error("Cannot render a table without rows")]
    EmptyTable,

    #[error("Table row {index} is not a record: {found}")]
    InvalidTableRow { index: usize, found: String },

    #[error("Table row {index} has columns [{found}], expected [{expected}]")]
    InconsistentRow {
        index: usize,
        expected: String,
        found: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Config parsing error: {0}")]
    ConfigParsing(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
