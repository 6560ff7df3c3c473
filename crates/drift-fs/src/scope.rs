//! Monitoring-root scope enforcement
//!
//! Every hash or recompute request must target a path equal to or nested
//! under the configured root. Requests outside the root are rejected
//! before any filesystem or storage access, so a rejected call never
//! mutates state.

use tracing::debug;

use crate::{Error, NormalizedPath, Result};

/// The monitored root a scan is confined to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanScope {
    root: NormalizedPath,
}

impl ScanScope {
    pub fn new(root: impl Into<NormalizedPath>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &NormalizedPath {
        &self.root
    }

    /// Reject any path not equal to or nested under the root.
    pub fn ensure_within(&self, path: &NormalizedPath) -> Result<()> {
        if self.root.contains(path) {
            Ok(())
        } else {
            debug!(path = %path, root = %self.root, "scope rejection");
            Err(Error::OutOfScope {
                path: path.as_str().to_string(),
                root: self.root.as_str().to_string(),
            })
        }
    }
}
