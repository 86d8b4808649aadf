//! Error types for the jot note engine.

use thiserror::Error;

/// Result type alias using jot's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for jot operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Persistent store operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Note not found (or not visible in its current lifecycle state)
    #[error("Note not found: {0}")]
    NoteNotFound(uuid::Uuid),

    /// Create/restore would exceed the active-note quota
    #[error("Quota exceeded: owner already has {limit} active notes")]
    QuotaExceeded {
        /// Opaque owner key that hit the limit.
        owner: String,
        /// The quota that was hit.
        limit: i64,
    },

    /// Operation invalid for the note's current lifecycle state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Summarization backend failed
    #[error("Inference error: {0}")]
    Inference(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether the orchestrator may retry the failed operation.
    ///
    /// Only store I/O failures qualify, and callers must additionally
    /// restrict retries to read operations: retrying a mutation risks
    /// double-applying version snapshots.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Database(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Inference(e.to_string())
    }
}
