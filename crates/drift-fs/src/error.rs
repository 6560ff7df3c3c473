//! Error types for drift-fs

use std::path::PathBuf;

/// Result type for drift-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in drift-fs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Path {path} is outside the monitored root {root}")]
    OutOfScope { path: String, root: String },

    #[error("Not a directory: {path}")]
    NotADirectory { path: PathBuf },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error is a scope rejection rather than an I/O fault.
    pub fn is_out_of_scope(&self) -> bool {
        matches!(self, Self::OutOfScope { .. })
    }
}
