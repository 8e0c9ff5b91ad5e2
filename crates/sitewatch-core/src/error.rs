use std::time::Duration;

use thiserror::Error;

/// Application-wide error types for sitewatch.
#[derive(Error, Debug)]
pub enum AppError {
    /// Fetching a page failed (connection, TLS, non-2xx status, body read).
    #[error("Transport error: {0}")]
    Transport(String),

    /// Request timed out.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Page bytes could not be turned into a node tree.
    #[error("Malformed page: {0}")]
    MalformedPage(String),

    /// The listing id fragment held no parseable integer.
    #[error("Missing listing id in {0:?}")]
    MissingKey(String),

    /// The price fragment held no parseable integer.
    #[error("Missing price for listing {id} in {text:?}")]
    MissingPrice { id: i64, text: String },

    /// Store upsert or query failed.
    #[error("Store error: {0}")]
    Store(String),

    /// Operator input was rejected.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Command is not valid in the current crawl state.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Short stable label, used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Transport(_) => "transport",
            AppError::Timeout(_) => "timeout",
            AppError::MalformedPage(_) => "malformed_page",
            AppError::MissingKey(_) => "missing_key",
            AppError::MissingPrice { .. } => "missing_price",
            AppError::Store(_) => "store",
            AppError::InvalidInput(_) => "invalid_input",
            AppError::InvalidState(_) => "invalid_state",
            AppError::Config(_) => "config",
        }
    }
}
