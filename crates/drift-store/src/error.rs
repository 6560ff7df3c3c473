//! Error types for drift-store

/// Result type for drift-store operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur talking to the state store
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The backend could not be reached. Retryable; after the bounded
    /// retry policy is exhausted this degrades a single read or write to
    /// a local failure, never a process failure.
    #[error("state store unavailable: {0}")]
    Unavailable(String),

    /// The backend rejected the write (e.g. malformed record).
    /// Not retryable.
    #[error("state store rejected the operation: {0}")]
    Rejected(String),
}

impl Error {
    /// Whether a retry can possibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}
