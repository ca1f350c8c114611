use std::time::Duration;
use thiserror::Error;

/// Errors raised while driving the browser or persisting results
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    #[error("Failed to connect to browser: {0}")]
    ConnectionFailed(String),

    #[error("Tab operation failed: {0}")]
    TabOperationFailed(String),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Script evaluation failed: {0}")]
    EvaluationFailed(String),

    #[error("Interaction with '{selector}' failed: {reason}")]
    InteractionFailed { selector: String, reason: String },

    #[error("Timed out after {waited:?} waiting for {what}")]
    Timeout { what: String, waited: Duration },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CrawlError {
    /// Build a timeout error for a bounded wait
    pub fn timeout(what: impl Into<String>, waited: Duration) -> Self {
        Self::Timeout { what: what.into(), waited }
    }

    /// Whether this error is a soft timeout that callers are expected to degrade on
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Result type alias for crawler operations
pub type Result<T> = std::result::Result<T, CrawlError>;
