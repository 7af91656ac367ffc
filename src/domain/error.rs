use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Database error: {0}")]
    Database(String),

    /// The upstream row source was unavailable or returned malformed data.
    #[error("Source error: {0}")]
    Source(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Notification error: {0}")]
    Notification(String),

    /// A policy threshold is nonsensical. Raised at startup, never per run.
    #[error("Policy error: {0}")]
    Policy(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<rusqlite::Error> for DomainError {
    fn from(e: rusqlite::Error) -> Self {
        DomainError::Database(e.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(e: serde_json::Error) -> Self {
        DomainError::Parse(e.to_string())
    }
}

impl From<&str> for DomainError {
    fn from(s: &str) -> Self {
        DomainError::InvalidInput(s.to_string())
    }
}
