//! Error types for the application

use thiserror::Error;

/// Result type alias using our ScanError
pub type Result<T> = std::result::Result<T, ScanError>;

/// Main error type for scan operations
#[derive(Error, Debug)]
pub enum ScanError {
    /// HTTP request errors
    #[error("HTTP request error: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Non-success status from the platform API
    #[error("Unexpected status {status} from {url}")]
    UnexpectedStatus { url: String, status: u16 },

    /// Username could not be resolved to an identity
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// Current season/week state could not be fetched
    #[error("Season state unavailable")]
    StateUnavailable,

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Report export errors
    #[error("Export error: {0}")]
    Export(#[from] csv::Error),

    /// Filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ScanError {
    /// Whether this error aborts a whole scan rather than degrading a single fetch
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ScanError::UserNotFound(_) | ScanError::StateUnavailable | ScanError::Configuration(_)
        )
    }
}
