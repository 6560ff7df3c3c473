//! Target-vs-current reconciliation
//!
//! An external authority (a release pipeline, typically) assigns a target
//! fingerprint to a path; the engine surfaces every path whose current
//! fingerprint differs as a priority candidate for the next scan cycle.
//! Once a scan observes the target fingerprint the target is cleared in
//! the same write, and the path is converged until a new target arrives.

use serde::{Deserialize, Serialize};

use crate::Result;
use drift_fs::{NormalizedPath, hashes_equal};
use drift_store::{RetryConfig, StateStore, StoredState, with_retry};

/// The two reconciliation states a path can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConvergenceState {
    /// A target is pending and the current fingerprint differs from it.
    Divergent,
    /// No pending target.
    Converged,
}

/// Classify a stored state. Pure; never mutates the record.
pub fn state_of(state: &StoredState) -> ConvergenceState {
    match &state.target_hash {
        Some(target) if !hashes_equal(target, &state.current_hash) => {
            ConvergenceState::Divergent
        }
        _ => ConvergenceState::Converged,
    }
}

/// Paths with a pending target differing from their current fingerprint,
/// ordered by path. Feeds the worklist pruner's priority list.
pub fn divergent_candidates<S: StateStore>(
    store: &S,
    retry: &RetryConfig,
) -> Result<Vec<NormalizedPath>> {
    Ok(with_retry(retry, || store.read_divergent())?)
}

/// Assign (or clear, with `None`) a path's target fingerprint.
pub fn assign_target<S: StateStore>(
    store: &mut S,
    retry: &RetryConfig,
    path: &NormalizedPath,
    target: Option<String>,
) -> Result<()> {
    Ok(with_retry(retry, || {
        store.set_target(path, target.clone())
    })?)
}
