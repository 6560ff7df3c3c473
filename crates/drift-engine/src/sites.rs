//! Per-site sync-lag and liveness classification
//!
//! Pure projections over baseline history and site status rows; nothing
//! here mutates a record. The dashboard layer serializes the bucket enums
//! directly.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use drift_fs::hashes_equal;
use drift_store::{SiteStatus, StateSnapshot};

/// How many baselines behind a site's reported fingerprint is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncBucket {
    /// Matches the newest baseline.
    #[serde(rename = "current")]
    Current,
    /// Matches the second-newest baseline.
    #[serde(rename = "1_behind")]
    OneBehind,
    /// Matches a baseline created within the last 24 hours.
    #[serde(rename = "l24_behind")]
    Within24h,
    /// Matches a baseline older than 24 hours.
    #[serde(rename = "g24_behind")]
    Older24h,
    /// No fingerprint reported, or not found in the baseline history.
    #[serde(rename = "unknown")]
    Unknown,
}

/// How recently a site last reported anything, regardless of what.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LivenessBucket {
    #[serde(rename = "current")]
    Current,
    #[serde(rename = "1_behind")]
    OneBehind,
    #[serde(rename = "l24_behind")]
    Within24h,
    #[serde(rename = "inactive")]
    Inactive,
}

/// Age boundaries separating the four liveness buckets.
///
/// The boundaries are deployment policy, not engine constants; defaults
/// follow the observed reporting cadence (10 minutes, 45 minutes, 24
/// hours) but every deployment should set its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LivenessThresholds {
    /// Reports younger than this are `Current`.
    pub current: Duration,
    /// Reports younger than this (but not current) are `OneBehind`.
    pub one_behind: Duration,
    /// Reports younger than this (but older than `one_behind`) are
    /// `Within24h`; anything older is `Inactive`.
    pub within_24h: Duration,
}

impl Default for LivenessThresholds {
    fn default() -> Self {
        Self {
            current: Duration::from_secs(10 * 60),
            one_behind: Duration::from_secs(45 * 60),
            within_24h: Duration::from_secs(24 * 60 * 60),
        }
    }
}

/// Classify a site's sync lag against the baseline history.
///
/// `snapshots` must be ordered most-recent-first, as returned by the
/// store's `read_snapshots`.
pub fn sync_bucket(site: &SiteStatus, snapshots: &[StateSnapshot], now: DateTime<Utc>) -> SyncBucket {
    let Some(hash) = site.current_hash.as_deref() else {
        return SyncBucket::Unknown;
    };

    for (index, snapshot) in snapshots.iter().enumerate() {
        if !hashes_equal(hash, &snapshot.hash_value) {
            continue;
        }
        // a matched baseline still counts as recent within 24 hours
        return match index {
            0 => SyncBucket::Current,
            1 => SyncBucket::OneBehind,
            _ if now - snapshot.created_at <= chrono::TimeDelta::hours(24) => {
                SyncBucket::Within24h
            }
            _ => SyncBucket::Older24h,
        };
    }

    SyncBucket::Unknown
}

/// Classify how recently a site last reported, against the configured
/// age thresholds.
pub fn liveness_bucket(
    site: &SiteStatus,
    now: DateTime<Utc>,
    thresholds: &LivenessThresholds,
) -> LivenessBucket {
    let age = now - site.last_updated_at;
    let within = |limit: Duration| match chrono::TimeDelta::from_std(limit) {
        Ok(limit) => age <= limit,
        Err(_) => false,
    };

    if within(thresholds.current) {
        LivenessBucket::Current
    } else if within(thresholds.one_behind) {
        LivenessBucket::OneBehind
    } else if within(thresholds.within_24h) {
        LivenessBucket::Within24h
    } else {
        LivenessBucket::Inactive
    }
}
