//! Site dashboard projections over baseline history and status rows.

use chrono::{TimeDelta, Utc};

use drift_engine::sites::{LivenessThresholds, liveness_bucket, sync_bucket};
use drift_engine::{LivenessBucket, SyncBucket};
use drift_store::{MemoryStore, SiteStatus, StateStore};

#[test]
fn dashboard_classifies_a_mixed_fleet() {
    let now = Utc::now();
    let mut store = MemoryStore::new();

    // baseline history: three releases, newest first on read
    store.push_snapshot("hash-r3".into(), now - TimeDelta::minutes(30));
    store.push_snapshot("hash-r2".into(), now - TimeDelta::hours(6));
    store.push_snapshot("hash-r1".into(), now - TimeDelta::hours(40));

    let fleet = [
        ("site-current", Some("hash-r3"), TimeDelta::minutes(3)),
        ("site-lagging", Some("hash-r2"), TimeDelta::minutes(20)),
        ("site-stale", Some("hash-r1"), TimeDelta::hours(2)),
        ("site-silent", None, TimeDelta::days(3)),
    ];
    for (name, hash, age) in fleet {
        store.push_site(SiteStatus {
            site_name: name.into(),
            current_hash: hash.map(String::from),
            last_updated_at: now - age,
        });
    }

    let snapshots = store.read_snapshots(10).unwrap();
    let statuses = store.read_site_statuses().unwrap();
    let thresholds = LivenessThresholds::default();

    let find = |name: &str| statuses.iter().find(|s| s.site_name == name).unwrap();

    assert_eq!(
        sync_bucket(find("site-current"), &snapshots, now),
        SyncBucket::Current
    );
    assert_eq!(
        sync_bucket(find("site-lagging"), &snapshots, now),
        SyncBucket::OneBehind
    );
    assert_eq!(
        sync_bucket(find("site-stale"), &snapshots, now),
        SyncBucket::Older24h
    );
    assert_eq!(
        sync_bucket(find("site-silent"), &snapshots, now),
        SyncBucket::Unknown
    );

    assert_eq!(
        liveness_bucket(find("site-current"), now, &thresholds),
        LivenessBucket::Current
    );
    assert_eq!(
        liveness_bucket(find("site-lagging"), now, &thresholds),
        LivenessBucket::OneBehind
    );
    assert_eq!(
        liveness_bucket(find("site-stale"), now, &thresholds),
        LivenessBucket::Within24h
    );
    assert_eq!(
        liveness_bucket(find("site-silent"), now, &thresholds),
        LivenessBucket::Inactive
    );
}

#[test]
fn two_sites_on_the_newest_baseline_are_both_current() {
    let now = Utc::now();
    let mut store = MemoryStore::new();
    store.push_snapshot("hash-r1".into(), now - TimeDelta::minutes(10));

    for name in ["site-east", "site-west"] {
        store.push_site(SiteStatus {
            site_name: name.into(),
            current_hash: Some("HASH-R1".into()),
            last_updated_at: now - TimeDelta::minutes(1),
        });
    }

    let snapshots = store.read_snapshots(10).unwrap();
    for status in store.read_site_statuses().unwrap() {
        assert_eq!(sync_bucket(&status, &snapshots, now), SyncBucket::Current);
    }
}

#[test]
fn classification_never_mutates_the_status_rows() {
    let now = Utc::now();
    let mut store = MemoryStore::new();
    store.push_snapshot("hash-r1".into(), now - TimeDelta::minutes(10));
    store.push_site(SiteStatus {
        site_name: "site-a".into(),
        current_hash: Some("hash-r1".into()),
        last_updated_at: now,
    });

    let before = store.read_site_statuses().unwrap();
    let snapshots = store.read_snapshots(10).unwrap();
    let _ = sync_bucket(&before[0], &snapshots, now);
    let _ = liveness_bucket(&before[0], now, &LivenessThresholds::default());
    let after = store.read_site_statuses().unwrap();
    assert_eq!(before, after);
}

#[test]
fn bucket_serialization_matches_dashboard_contract() {
    let buckets = serde_json::json!({
        "sync": SyncBucket::Older24h,
        "liveness": LivenessBucket::Within24h,
    });
    assert_eq!(
        buckets.to_string(),
        r#"{"liveness":"l24_behind","sync":"g24_behind"}"#
    );
}
