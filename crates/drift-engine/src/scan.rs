//! Tree scanning: Merkle hashing, change detection, ancestor recompute
//!
//! One `Scanner` drives a single scan invocation: it hashes the target
//! subtree depth-first (children before parents), classifies each path
//! against the stored state, cascades deletions from stored child lists
//! without touching the missing subtree, and climbs the ancestor chain so
//! the monitoring root's fingerprint reflects the change.
//!
//! The descent uses an explicit work stack rather than recursion, so
//! pathologically deep trees cannot exhaust the call stack. Nothing is
//! cached across invocations; the tree is reconstructed fresh each scan
//! and only the per-path records persist.

use std::collections::HashMap;
use std::fs;

use chrono::Utc;
use tracing::{debug, info};

use crate::changes::ChangeSet;
use crate::config::EngineConfig;
use crate::{Error, Result};
use drift_fs::{DigestKind, Listing, NormalizedPath, ScanScope, digest, hashes_equal};
use drift_store::{ChildLists, PathRecord, RetryConfig, StateStore, StoredState, with_retry};

/// Single-invocation scan driver. Exclusively borrows the store for the
/// duration of the scan; records are read-modify-written through it and
/// never cached.
pub struct Scanner<'a, S: StateStore> {
    scope: ScanScope,
    digest: DigestKind,
    retry: RetryConfig,
    store: &'a mut S,
}

/// Work-stack frame: visit a path, or finish a directory once all of its
/// children have been hashed.
enum Frame {
    Visit(NormalizedPath),
    Finish(NormalizedPath, Listing),
}

impl<'a, S: StateStore> Scanner<'a, S> {
    pub fn new(config: &EngineConfig, store: &'a mut S) -> Self {
        Self {
            scope: ScanScope::new(config.root.clone()),
            digest: config.digest,
            retry: config.retry.clone(),
            store,
        }
    }

    /// Scan one target under the monitoring root.
    ///
    /// Hashes the target subtree, reconciles every touched path against
    /// the stored state, then recomputes the ancestor chain up to the
    /// root. Returns the root fingerprint and the accumulated change set.
    ///
    /// # Errors
    ///
    /// `Error::Fs(OutOfScope)` if the target is not at or under the root;
    /// no state is touched in that case. I/O and storage errors abort
    /// this one invocation and leave previously committed paths intact.
    pub fn scan(&mut self, target: &NormalizedPath) -> Result<(String, ChangeSet)> {
        self.scope.ensure_within(target)?;

        let mut changes = ChangeSet::new();
        let target_hash = self.hash_subtree(target, &mut changes)?;
        let root_hash = if target == self.scope.root() {
            target_hash
        } else {
            self.recompute_root(target, &mut changes)?
        };

        info!(
            target = %target,
            root_hash = %root_hash,
            created = changes.created().len(),
            modified = changes.modified().len(),
            deleted = changes.deleted().len(),
            "scan complete"
        );
        Ok((root_hash, changes))
    }

    /// Recompute every ancestor from `changed` up to and including the
    /// root, recording ancestors whose own fingerprint shifts. Cost is
    /// proportional to tree depth (one listing plus stored child reads
    /// per level), not tree size.
    pub fn recompute_root(
        &mut self,
        changed: &NormalizedPath,
        changes: &mut ChangeSet,
    ) -> Result<String> {
        self.scope.ensure_within(changed)?;
        let root = self.scope.root().clone();

        if changed == &root {
            return match self.read_stored(&root)? {
                Some(state) => Ok(state.current_hash),
                None => self.hash_subtree(&root, changes),
            };
        }

        let mut current = changed.clone();
        let mut root_hash = String::new();
        while current != root {
            let Some(parent) = current.parent() else {
                // unreachable once ensure_within passed; fail closed
                return Err(drift_fs::Error::OutOfScope {
                    path: changed.as_str().to_string(),
                    root: root.as_str().to_string(),
                }
                .into());
            };
            root_hash = self.hash_directory_shallow(&parent, changes)?;
            current = parent;
        }
        Ok(root_hash)
    }

    /// Depth-first hash of a subtree with an explicit work stack.
    /// Children are always hashed and committed before their parent.
    fn hash_subtree(
        &mut self,
        start: &NormalizedPath,
        changes: &mut ChangeSet,
    ) -> Result<String> {
        let mut hashes: HashMap<NormalizedPath, String> = HashMap::new();
        let mut stack = vec![Frame::Visit(start.clone())];

        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Visit(path) => {
                    let native = path.to_native();
                    let meta = fs::symlink_metadata(&native)
                        .map_err(|e| drift_fs::Error::io(&native, e))?;

                    if meta.file_type().is_symlink() {
                        let hash = digest::hash_link(self.digest, &path)?;
                        self.commit(&path, &hash, None, changes)?;
                        hashes.insert(path, hash);
                    } else if meta.is_dir() {
                        let listing = Listing::read(&path)?;
                        let children: Vec<NormalizedPath> = listing
                            .dirs
                            .iter()
                            .chain(listing.files.iter())
                            .chain(listing.links.iter())
                            .map(|name| path.join(name))
                            .collect();
                        // Finish goes under the children so it pops last
                        stack.push(Frame::Finish(path, listing));
                        stack.extend(children.into_iter().map(Frame::Visit));
                    } else {
                        let hash = digest::hash_file(self.digest, &path)?;
                        self.commit(&path, &hash, None, changes)?;
                        hashes.insert(path, hash);
                    }
                }
                Frame::Finish(path, listing) => {
                    let dir_hashes = collect_hashes(&hashes, &path, &listing.dirs)?;
                    let file_hashes = collect_hashes(&hashes, &path, &listing.files)?;
                    let link_hashes = collect_hashes(&hashes, &path, &listing.links)?;
                    let hash = digest::combine_directory(
                        self.digest,
                        &path,
                        &dir_hashes,
                        &file_hashes,
                        &link_hashes,
                    );
                    self.commit(&path, &hash, Some(&listing), changes)?;
                    hashes.insert(path, hash);
                }
            }
        }

        match hashes.remove(start) {
            Some(hash) => Ok(hash),
            None => Err(missing_entry(start)),
        }
    }

    /// Recompute one directory's fingerprint from its on-disk listing and
    /// the stored fingerprints of its children. Children never observed
    /// before are hashed in full; everything else is a store read.
    fn hash_directory_shallow(
        &mut self,
        path: &NormalizedPath,
        changes: &mut ChangeSet,
    ) -> Result<String> {
        let listing = Listing::read(path)?;

        let mut dir_hashes = Vec::with_capacity(listing.dirs.len());
        let mut file_hashes = Vec::with_capacity(listing.files.len());
        let mut link_hashes = Vec::with_capacity(listing.links.len());
        for (names, out) in [
            (&listing.dirs, &mut dir_hashes),
            (&listing.files, &mut file_hashes),
            (&listing.links, &mut link_hashes),
        ] {
            for name in names {
                let child = path.join(name);
                let hash = match self.read_stored(&child)? {
                    Some(state) => state.current_hash,
                    None => self.hash_subtree(&child, changes)?,
                };
                out.push(hash);
            }
        }

        let hash = digest::combine_directory(
            self.digest,
            path,
            &dir_hashes,
            &file_hashes,
            &link_hashes,
        );
        self.commit(path, &hash, Some(&listing), changes)?;
        Ok(hash)
    }

    /// Classify one hashed path against the stored state, cascade
    /// deletions for stored children missing from the current listing,
    /// and write the record back.
    fn commit(
        &mut self,
        path: &NormalizedPath,
        new_hash: &str,
        listing: Option<&Listing>,
        changes: &mut ChangeSet,
    ) -> Result<()> {
        let stored = self.read_stored(path)?;

        match &stored {
            None => {
                debug!(path = %path, "path created");
                changes.record_created(path.clone());
            }
            Some(state) if !hashes_equal(&state.current_hash, new_hash) => {
                debug!(path = %path, "path modified");
                changes.record_modified(path.clone());
            }
            Some(_) => {}
        }

        if let Some(state) = &stored
            && let Some(stored_children) = &state.children
        {
            // children absent from the current listing no longer exist;
            // a path that stopped being a directory loses all of them
            let gone: Vec<String> = match listing {
                Some(current) => stored_children.missing_from(current),
                None => stored_children.names().collect(),
            };
            for name in gone {
                self.cascade_delete(path.join(&name), changes)?;
            }
        }

        let children = listing.map(ChildLists::from);
        let record = PathRecord::new(path.clone(), new_hash.to_string(), children, Utc::now());
        self.write_record(record)?;
        Ok(())
    }

    /// Report and remove an entire missing subtree from stored child
    /// lists alone. The paths no longer exist, so nothing is read from
    /// disk.
    fn cascade_delete(
        &mut self,
        start: NormalizedPath,
        changes: &mut ChangeSet,
    ) -> Result<()> {
        let mut stack = vec![start];
        while let Some(path) = stack.pop() {
            let Some(state) = self.read_stored(&path)? else {
                // never tracked, nothing to report
                continue;
            };
            if let Some(children) = &state.children {
                for name in children.names() {
                    stack.push(path.join(&name));
                }
            }
            debug!(path = %path, "path deleted");
            changes.record_deleted(path.clone());
            self.remove_record(&path)?;
        }
        Ok(())
    }

    fn read_stored(&self, path: &NormalizedPath) -> Result<Option<StoredState>> {
        let store = &*self.store;
        Ok(with_retry(&self.retry, || store.read(path))?)
    }

    fn write_record(&mut self, record: PathRecord) -> Result<Option<String>> {
        let store = &mut *self.store;
        Ok(with_retry(&self.retry, || store.upsert(record.clone()))?)
    }

    fn remove_record(&mut self, path: &NormalizedPath) -> Result<()> {
        let store = &mut *self.store;
        Ok(with_retry(&self.retry, || store.remove(path))?)
    }
}

fn collect_hashes(
    hashes: &HashMap<NormalizedPath, String>,
    parent: &NormalizedPath,
    names: &[String],
) -> Result<Vec<String>> {
    names
        .iter()
        .map(|name| {
            let child = parent.join(name);
            hashes.get(&child).cloned().ok_or_else(|| missing_entry(&child))
        })
        .collect()
}

/// An entry vanished between listing and hashing.
fn missing_entry(path: &NormalizedPath) -> Error {
    drift_fs::Error::io(
        path.to_native(),
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "entry disappeared during scan",
        ),
    )
    .into()
}
