//! Error types for drift-engine

/// Result type for drift-engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in drift-engine operations.
///
/// Budget exhaustion is not an error; a partially completed run is a
/// normal [`crate::scheduler::ScanOutcome`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Filesystem error from drift-fs (I/O fault or scope rejection)
    #[error(transparent)]
    Fs(#[from] drift_fs::Error),

    /// Storage error from drift-store
    #[error(transparent)]
    Store(#[from] drift_store::Error),
}

impl Error {
    /// Whether this is a scope rejection rather than an I/O or storage
    /// fault. Scope rejections never mutate any state.
    pub fn is_out_of_scope(&self) -> bool {
        matches!(self, Self::Fs(e) if e.is_out_of_scope())
    }
}
