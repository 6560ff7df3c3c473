//! Engine configuration
//!
//! One immutable value constructed by the host process and passed into
//! each component. There is no global configuration state; two engines
//! with different configs can coexist in one process (they must monitor
//! disjoint roots, which the deployment enforces).

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::sites::LivenessThresholds;
use drift_fs::{DigestKind, NormalizedPath};
use drift_store::RetryConfig;

/// Configuration for one engine instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Monitoring root; every scan target must be at or under it.
    pub root: NormalizedPath,
    /// Fingerprint function.
    #[serde(default)]
    pub digest: DigestKind,
    /// Wall-clock budget for one bounded scheduler run.
    #[serde(default = "default_scan_budget")]
    pub scan_budget: Duration,
    /// Retry policy for storage calls.
    #[serde(default)]
    pub retry: RetryConfig,
    /// Age boundaries for site liveness classification.
    #[serde(default)]
    pub liveness: LivenessThresholds,
}

fn default_scan_budget() -> Duration {
    Duration::from_secs(15 * 60)
}

impl EngineConfig {
    /// Config with defaults for everything but the root.
    pub fn new(root: impl Into<NormalizedPath>) -> Self {
        Self {
            root: root.into(),
            digest: DigestKind::default(),
            scan_budget: default_scan_budget(),
            retry: RetryConfig::default(),
            liveness: LivenessThresholds::default(),
        }
    }
}
