//! Bounded, ordered execution of a scan worklist
//!
//! The scheduler is the only driver of a scan run: it processes worklist
//! entries strictly in order, single-threaded, and checks the wall-clock
//! budget between entries. A failed path is logged and skipped, never
//! retried within the run; an exhausted budget is a normal partial
//! completion, reported with counts.

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::changes::ChangeSet;
use crate::config::EngineConfig;
use crate::scan::Scanner;
use crate::worklist::WorkItem;
use drift_store::StateStore;

/// Result of one bounded run. `processed < total` means the budget ran
/// out; it is not an error.
#[derive(Debug, Clone, Serialize)]
pub struct ScanOutcome {
    /// Worklist entries attempted (including failed-and-skipped ones).
    pub processed: usize,
    /// Worklist entries handed in.
    pub total: usize,
    /// Paths that failed and were skipped this run.
    pub failed: usize,
    /// Session identifier attached to every log event of this run.
    pub session: Uuid,
    /// Aggregated changes across all completed entries.
    pub changes: ChangeSet,
}

impl ScanOutcome {
    /// True when the budget expired before the worklist was exhausted.
    pub fn is_partial(&self) -> bool {
        self.processed < self.total
    }
}

/// Drives worklists against the wall-clock budget. One instance per
/// monitored root; the deployment guarantees no concurrent scheduler on
/// the same root.
pub struct WorkScheduler<'a, S: StateStore> {
    config: &'a EngineConfig,
    store: &'a mut S,
}

impl<'a, S: StateStore> WorkScheduler<'a, S> {
    pub fn new(config: &'a EngineConfig, store: &'a mut S) -> Self {
        Self { config, store }
    }

    /// Run the worklist with the configured budget.
    pub fn run(&mut self, worklist: &[WorkItem]) -> ScanOutcome {
        self.run_bounded_scan(worklist, self.config.scan_budget)
    }

    /// Process entries strictly in order until done or out of budget.
    ///
    /// The budget is checked between entries only; a single in-flight
    /// path operation is never preempted, so a run can exceed the budget
    /// by at most the duration of one path's scan.
    pub fn run_bounded_scan(&mut self, worklist: &[WorkItem], budget: Duration) -> ScanOutcome {
        let session = Uuid::new_v4();
        let span = tracing::info_span!("scan_run", session = %session);
        let _guard = span.enter();

        let started = Instant::now();
        let mut processed = 0;
        let mut failed = 0;
        let mut changes = ChangeSet::new();

        info!(total = worklist.len(), budget_secs = budget.as_secs(), "run started");
        for item in worklist {
            if started.elapsed() >= budget {
                info!(
                    processed,
                    total = worklist.len(),
                    "budget exhausted, stopping run"
                );
                break;
            }

            let mut scanner = Scanner::new(self.config, &mut *self.store);
            match scanner.scan(&item.path) {
                Ok((root_hash, set)) => {
                    info!(
                        path = %item.path,
                        priority = item.priority,
                        root_hash = %root_hash,
                        changed = set.len(),
                        "entry scanned"
                    );
                    changes.merge(set);
                }
                Err(e) => {
                    // skip and keep going; the next cycle retries it
                    failed += 1;
                    warn!(path = %item.path, error = %e, "entry failed, skipping");
                }
            }
            processed += 1;
        }

        let outcome = ScanOutcome {
            processed,
            total: worklist.len(),
            failed,
            session,
            changes,
        };
        info!(
            processed = outcome.processed,
            total = outcome.total,
            failed = outcome.failed,
            partial = outcome.is_partial(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "run finished"
        );
        outcome
    }
}
