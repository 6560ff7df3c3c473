//! Scan result change sets

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use drift_fs::NormalizedPath;

/// Result of one scan: the paths observed as created, modified or
/// deleted, as three pairwise-disjoint ordered sets.
///
/// The set is mutated in place as a scan climbs from leaves to an
/// ancestor; contributions are monotonic and a path holds exactly one
/// classification per scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    created: BTreeSet<NormalizedPath>,
    modified: BTreeSet<NormalizedPath>,
    deleted: BTreeSet<NormalizedPath>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a path first observed in this scan.
    pub fn record_created(&mut self, path: NormalizedPath) {
        if !self.modified.contains(&path) && !self.deleted.contains(&path) {
            self.created.insert(path);
        }
    }

    /// Record a path whose fingerprint differs from the stored one.
    /// A path already recorded as created stays created.
    pub fn record_modified(&mut self, path: NormalizedPath) {
        if !self.created.contains(&path) && !self.deleted.contains(&path) {
            self.modified.insert(path);
        }
    }

    /// Record a tracked path that no longer exists. Deletion supersedes
    /// any earlier classification from the same scan.
    pub fn record_deleted(&mut self, path: NormalizedPath) {
        self.created.remove(&path);
        self.modified.remove(&path);
        self.deleted.insert(path);
    }

    pub fn created(&self) -> &BTreeSet<NormalizedPath> {
        &self.created
    }

    pub fn modified(&self) -> &BTreeSet<NormalizedPath> {
        &self.modified
    }

    pub fn deleted(&self) -> &BTreeSet<NormalizedPath> {
        &self.deleted
    }

    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.modified.is_empty() && self.deleted.is_empty()
    }

    pub fn len(&self) -> usize {
        self.created.len() + self.modified.len() + self.deleted.len()
    }

    /// Fold another change set into this one (used to aggregate a
    /// scheduler run). Deletion still wins on conflict.
    pub fn merge(&mut self, other: ChangeSet) {
        for path in other.created {
            self.record_created(path);
        }
        for path in other.modified {
            self.record_modified(path);
        }
        for path in other.deleted {
            self.record_deleted(path);
        }
    }
}
