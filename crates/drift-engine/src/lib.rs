//! Merkle hashing and convergence engine for the drift monitor
//!
//! Each site runs one engine instance against its local tree. A scan
//! cycle assembles a pruned worklist (divergent paths first), drives it
//! within a wall-clock budget, pushes fingerprints and change sets to the
//! state store, and reads back targets and baselines to decide what is
//! priority next cycle. Sites never talk to each other; convergence is
//! mediated entirely through the shared records.

pub mod changes;
pub mod config;
pub mod convergence;
pub mod engine;
pub mod error;
pub mod logging;
pub mod scan;
pub mod scheduler;
pub mod sites;
pub mod worklist;

pub use changes::ChangeSet;
pub use config::EngineConfig;
pub use convergence::ConvergenceState;
pub use engine::DriftEngine;
pub use error::{Error, Result};
pub use scan::Scanner;
pub use scheduler::{ScanOutcome, WorkScheduler};
pub use sites::{LivenessBucket, LivenessThresholds, SyncBucket, liveness_bucket, sync_bucket};
pub use worklist::WorkItem;
