//! Persisted state records
//!
//! One `PathRecord` per monitored path, plus the immutable baseline
//! snapshots and per-site status rows the classifiers consume. Records
//! are serde-derived so the storage backend can persist them however it
//! likes; the engine only ever sees these shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use drift_fs::{Listing, NormalizedPath, hashes_equal};

/// Stable storage key for a monitored path.
///
/// Paths are unbounded-length text and unsuitable as a direct key, so the
/// key is the hex SHA-256 of the normalized path string. One-way and
/// deterministic; two records collide only if their normalized paths are
/// identical.
pub fn path_key(path: &NormalizedPath) -> String {
    let mut hasher = Sha256::new();
    hasher.update(path.as_str().as_bytes());
    format!("{:x}", hasher.finalize())
}

/// A directory's children as three ordered name lists.
///
/// Stored alongside the directory's record and used both to recompute the
/// directory hash and to detect deletions without touching the missing
/// subtree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildLists {
    pub dirs: Vec<String>,
    pub files: Vec<String>,
    pub links: Vec<String>,
}

impl ChildLists {
    /// Names present here but absent from the current on-disk listing.
    pub fn missing_from(&self, current: &Listing) -> Vec<String> {
        self.names().filter(|n| !current.contains(n)).collect()
    }

    pub fn names(&self) -> impl Iterator<Item = String> + '_ {
        self.dirs
            .iter()
            .chain(self.files.iter())
            .chain(self.links.iter())
            .cloned()
    }
}

impl From<&Listing> for ChildLists {
    fn from(listing: &Listing) -> Self {
        Self {
            dirs: listing.dirs.clone(),
            files: listing.files.clone(),
            links: listing.links.clone(),
        }
    }
}

/// One entry per monitored filesystem path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathRecord {
    pub path: NormalizedPath,
    /// Deterministic storage key, see [`path_key`].
    pub path_key: String,
    /// Latest confirmed fingerprint.
    pub current_hash: String,
    /// Desired fingerprint to converge to; `None` when converged.
    pub target_hash: Option<String>,
    /// Fingerprint immediately before the most recent observed change.
    pub prev_hash: Option<String>,
    pub first_observed_at: DateTime<Utc>,
    pub last_observed_at: DateTime<Utc>,
    pub prev_observed_at: Option<DateTime<Utc>>,
    /// Directories only.
    pub children: Option<ChildLists>,
}

impl PathRecord {
    /// Record for a path seen for the first time.
    pub fn new(
        path: NormalizedPath,
        current_hash: String,
        children: Option<ChildLists>,
        observed_at: DateTime<Utc>,
    ) -> Self {
        let path_key = path_key(&path);
        Self {
            path,
            path_key,
            current_hash,
            target_hash: None,
            prev_hash: None,
            first_observed_at: observed_at,
            last_observed_at: observed_at,
            prev_observed_at: None,
            children,
        }
    }

    /// Fold a fresh observation into an existing record.
    ///
    /// A differing hash shifts `current_hash` into `prev_hash`; an
    /// unchanged hash only refreshes `last_observed_at`. If the new hash
    /// matches the pending target, the target is cleared (convergence).
    pub fn observe(
        &mut self,
        new_hash: String,
        children: Option<ChildLists>,
        observed_at: DateTime<Utc>,
    ) {
        if !hashes_equal(&self.current_hash, &new_hash) {
            self.prev_hash = Some(std::mem::replace(&mut self.current_hash, new_hash));
            self.prev_observed_at = Some(self.last_observed_at);
        }
        let converged = self
            .target_hash
            .as_deref()
            .is_some_and(|target| hashes_equal(&self.current_hash, target));
        if converged {
            self.target_hash = None;
        }
        self.children = children;
        self.last_observed_at = observed_at;
    }

    /// True when a target is pending and the current hash differs from it.
    pub fn is_divergent(&self) -> bool {
        self.target_hash
            .as_deref()
            .is_some_and(|t| !hashes_equal(t, &self.current_hash))
    }
}

/// Immutable baseline: a known-good root fingerprint at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub hash_value: String,
    pub record_count: u64,
    pub created_at: DateTime<Utc>,
}

/// Last reported state of one remote site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteStatus {
    pub site_name: String,
    pub current_hash: Option<String>,
    pub last_updated_at: DateTime<Utc>,
}
