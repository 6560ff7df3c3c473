//! Storage collaborator contract and in-memory reference store
//!
//! The engine never talks to a backend directly; it consumes this trait.
//! `MemoryStore` is the reference implementation used by the engine's
//! tests and by single-process deployments. The relational backend lives
//! outside this workspace and only has to honour the same contract.

use std::cell::Cell;
use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::record::{ChildLists, PathRecord, SiteStatus, StateSnapshot, path_key};
use crate::{Error, Result};
use drift_fs::NormalizedPath;

/// What the engine needs back from a point read: enough to classify a
/// change and to walk stored children, nothing more.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredState {
    pub current_hash: String,
    pub target_hash: Option<String>,
    pub children: Option<ChildLists>,
}

impl From<&PathRecord> for StoredState {
    fn from(rec: &PathRecord) -> Self {
        Self {
            current_hash: rec.current_hash.clone(),
            target_hash: rec.target_hash.clone(),
            children: rec.children.clone(),
        }
    }
}

/// Contract the engine requires from the persisted-record backend.
///
/// Mutation goes through `upsert`/`remove`/`set_target` only; the engine
/// borrows records read-modify-write during a scan and never caches them
/// across scans.
pub trait StateStore {
    /// Stored state for a path, or `None` if never observed.
    fn read(&self, path: &NormalizedPath) -> Result<Option<StoredState>>;

    /// Insert or update a record, returning the previously stored hash
    /// (`None` if the record is new). History fields (`prev_hash`,
    /// `first_observed_at`) are preserved from the existing record.
    fn upsert(&mut self, record: PathRecord) -> Result<Option<String>>;

    /// Logically remove a record. Removing an unknown path is a no-op.
    fn remove(&mut self, path: &NormalizedPath) -> Result<()>;

    /// Assign (or clear) the target fingerprint of an existing record.
    fn set_target(&mut self, path: &NormalizedPath, target: Option<String>) -> Result<()>;

    /// Paths whose target differs from their current hash, ordered by path.
    fn read_divergent(&self) -> Result<Vec<NormalizedPath>>;

    /// Baseline history, most recent first.
    fn read_snapshots(&self, limit: usize) -> Result<Vec<StateSnapshot>>;

    /// Status rows for every known site.
    fn read_site_statuses(&self) -> Result<Vec<SiteStatus>>;
}

/// In-memory `StateStore`, keyed by [`path_key`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: HashMap<String, PathRecord>,
    snapshots: Vec<StateSnapshot>,
    sites: Vec<SiteStatus>,
    /// Number of upcoming calls that should fail as unavailable.
    fail_next: Cell<u32>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `n` store calls fail with `Error::Unavailable`.
    /// Exercises the caller's retry policy.
    pub fn fail_next_calls(&self, n: u32) {
        self.fail_next.set(n);
    }

    fn check_available(&self) -> Result<()> {
        let remaining = self.fail_next.get();
        if remaining > 0 {
            self.fail_next.set(remaining - 1);
            return Err(Error::Unavailable("injected outage".into()));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, path: &NormalizedPath) -> Option<&PathRecord> {
        self.records.get(&path_key(path))
    }

    /// Append a baseline snapshot; newest snapshots sort first on read.
    pub fn push_snapshot(&mut self, hash_value: String, created_at: DateTime<Utc>) {
        self.snapshots.push(StateSnapshot {
            hash_value,
            record_count: self.records.len() as u64,
            created_at,
        });
        self.snapshots.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    }

    pub fn push_site(&mut self, site: SiteStatus) {
        self.sites.retain(|s| s.site_name != site.site_name);
        self.sites.push(site);
    }
}

impl StateStore for MemoryStore {
    fn read(&self, path: &NormalizedPath) -> Result<Option<StoredState>> {
        self.check_available()?;
        Ok(self.records.get(&path_key(path)).map(StoredState::from))
    }

    fn upsert(&mut self, record: PathRecord) -> Result<Option<String>> {
        self.check_available()?;
        match self.records.get_mut(&record.path_key) {
            Some(existing) => {
                let previous = existing.current_hash.clone();
                existing.observe(record.current_hash, record.children, record.last_observed_at);
                Ok(Some(previous))
            }
            None => {
                self.records.insert(record.path_key.clone(), record);
                Ok(None)
            }
        }
    }

    fn remove(&mut self, path: &NormalizedPath) -> Result<()> {
        self.check_available()?;
        self.records.remove(&path_key(path));
        Ok(())
    }

    fn set_target(&mut self, path: &NormalizedPath, target: Option<String>) -> Result<()> {
        self.check_available()?;
        match self.records.get_mut(&path_key(path)) {
            Some(rec) => {
                rec.target_hash = target;
                Ok(())
            }
            None => Err(Error::Rejected(format!("no record for {path}"))),
        }
    }

    fn read_divergent(&self) -> Result<Vec<NormalizedPath>> {
        self.check_available()?;
        let mut paths: Vec<NormalizedPath> = self
            .records
            .values()
            .filter(|r| r.is_divergent())
            .map(|r| r.path.clone())
            .collect();
        paths.sort();
        Ok(paths)
    }

    fn read_snapshots(&self, limit: usize) -> Result<Vec<StateSnapshot>> {
        self.check_available()?;
        Ok(self.snapshots.iter().take(limit).cloned().collect())
    }

    fn read_site_statuses(&self) -> Result<Vec<SiteStatus>> {
        self.check_available()?;
        Ok(self.sites.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(path: &str, hash: &str) -> PathRecord {
        PathRecord::new(path.into(), hash.into(), None, Utc::now())
    }

    #[test]
    fn upsert_returns_previous_hash() {
        let mut store = MemoryStore::new();
        assert_eq!(store.upsert(record("/data/a", "h1")).unwrap(), None);
        assert_eq!(
            store.upsert(record("/data/a", "h2")).unwrap(),
            Some("h1".to_string())
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn read_round_trips_children() {
        let mut store = MemoryStore::new();
        let mut rec = record("/data", "h1");
        rec.children = Some(ChildLists {
            dirs: vec!["docs".into()],
            files: vec![],
            links: vec![],
        });
        store.upsert(rec.clone()).unwrap();

        let state = store.read(&"/data".into()).unwrap().unwrap();
        assert_eq!(state.current_hash, "h1");
        assert_eq!(state.children, rec.children);
    }

    #[test]
    fn upsert_preserves_history_and_pending_target() {
        let mut store = MemoryStore::new();
        store.upsert(record("/data/a", "h1")).unwrap();
        store.set_target(&"/data/a".into(), Some("h3".into())).unwrap();

        store.upsert(record("/data/a", "h2")).unwrap();
        let rec = store.get(&"/data/a".into()).unwrap();
        assert_eq!(rec.prev_hash.as_deref(), Some("h1"));
        assert_eq!(rec.target_hash.as_deref(), Some("h3"));

        // Observing the target itself clears it.
        store.upsert(record("/data/a", "h3")).unwrap();
        let rec = store.get(&"/data/a".into()).unwrap();
        assert_eq!(rec.target_hash, None);
    }

    #[test]
    fn remove_unknown_path_is_noop() {
        let mut store = MemoryStore::new();
        assert!(store.remove(&"/data/never".into()).is_ok());
    }

    #[test]
    fn divergent_paths_are_ordered() {
        let mut store = MemoryStore::new();
        store.upsert(record("/data/b", "h1")).unwrap();
        store.upsert(record("/data/a", "h1")).unwrap();
        store.set_target(&"/data/b".into(), Some("t".into())).unwrap();
        store.set_target(&"/data/a".into(), Some("t".into())).unwrap();

        let divergent = store.read_divergent().unwrap();
        assert_eq!(
            divergent,
            vec![
                NormalizedPath::new("/data/a"),
                NormalizedPath::new("/data/b")
            ]
        );
    }

    #[test]
    fn set_target_on_unknown_path_is_rejected() {
        let mut store = MemoryStore::new();
        let err = store.set_target(&"/data/x".into(), Some("t".into())).unwrap_err();
        assert!(matches!(err, Error::Rejected(_)));
        assert!(!err.is_transient());
    }

    #[test]
    fn snapshots_come_back_newest_first() {
        let mut store = MemoryStore::new();
        let old = Utc::now() - chrono::Duration::hours(2);
        let new = Utc::now();
        store.push_snapshot("old".into(), old);
        store.push_snapshot("new".into(), new);

        let snaps = store.read_snapshots(10).unwrap();
        assert_eq!(snaps[0].hash_value, "new");
        assert_eq!(snaps[1].hash_value, "old");

        assert_eq!(store.read_snapshots(1).unwrap().len(), 1);
    }

    #[test]
    fn injected_outage_fails_then_recovers() {
        let mut store = MemoryStore::new();
        store.fail_next_calls(1);
        assert!(matches!(
            store.read(&"/data".into()),
            Err(Error::Unavailable(_))
        ));
        assert!(store.read(&"/data".into()).is_ok());
        assert!(store.upsert(record("/data", "h1")).is_ok());
    }
}
