//! Error types for the watchdog

use std::path::PathBuf;

/// Errors that can occur during a watchdog run
#[derive(Debug, thiserror::Error)]
pub enum WatchdogError {
    #[error("Status document not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Malformed status document: {0}")]
    Malformed(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Messaging error: {0}")]
    Messaging(String),

    #[error("Email error: {0}")]
    Email(String),
}

/// Result type alias for watchdog operations
pub type Result<T> = std::result::Result<T, WatchdogError>;
