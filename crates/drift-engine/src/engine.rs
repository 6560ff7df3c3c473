//! Engine facade
//!
//! Bundles a configuration and a store into the surface the HTTP layer
//! calls: synchronous single-target scans, bounded worklist runs, and the
//! convergence-candidate query that seeds the next cycle's priorities.

use std::time::Duration;

use crate::changes::ChangeSet;
use crate::config::EngineConfig;
use crate::scan::Scanner;
use crate::scheduler::{ScanOutcome, WorkScheduler};
use crate::worklist::{self, WorkItem};
use crate::{Result, convergence};
use drift_fs::NormalizedPath;
use drift_store::StateStore;

/// One engine instance: one monitored root, one store.
pub struct DriftEngine<S: StateStore> {
    config: EngineConfig,
    store: S,
}

impl<S: StateStore> DriftEngine<S> {
    pub fn new(config: EngineConfig, store: S) -> Self {
        Self { config, store }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Scan one target under the root. See [`Scanner::scan`].
    pub fn scan(&mut self, target: &NormalizedPath) -> Result<(String, ChangeSet)> {
        Scanner::new(&self.config, &mut self.store).scan(target)
    }

    /// Run a worklist within a wall-clock budget.
    pub fn run_bounded_scan(&mut self, worklist: &[WorkItem], budget: Duration) -> ScanOutcome {
        WorkScheduler::new(&self.config, &mut self.store).run_bounded_scan(worklist, budget)
    }

    /// Divergent paths, ordered; the priority input for the next cycle.
    pub fn convergence_candidates(&self) -> Result<Vec<NormalizedPath>> {
        convergence::divergent_candidates(&self.store, &self.config.retry)
    }

    /// Assign (or clear) a target fingerprint on a tracked path.
    pub fn assign_target(&mut self, path: &NormalizedPath, target: Option<String>) -> Result<()> {
        convergence::assign_target(&mut self.store, &self.config.retry, path, target)
    }

    /// Assemble the next cycle's worklist: divergent candidates as the
    /// priority list, merged with the routine list, ancestor-pruned.
    pub fn plan_worklist(
        &self,
        routine: impl IntoIterator<Item = NormalizedPath>,
    ) -> Result<Vec<WorkItem>> {
        let priority = self.convergence_candidates()?;
        Ok(worklist::prune(priority, routine))
    }
}
