//! End-to-end scan cycles over real temporary trees.

use std::time::Duration;

use assert_fs::TempDir;
use assert_fs::prelude::*;

use drift_engine::{DriftEngine, EngineConfig, WorkItem, worklist};
use drift_fs::NormalizedPath;
use drift_store::{MemoryStore, RetryConfig};

fn engine_for(temp: &TempDir) -> DriftEngine<MemoryStore> {
    let mut config = EngineConfig::new(temp.path());
    config.retry = RetryConfig::immediate(3);
    DriftEngine::new(config, MemoryStore::new())
}

#[test]
fn full_cycle_detect_assign_converge() {
    let temp = TempDir::new().unwrap();
    temp.child("docs/readme.md").write_str("v1").unwrap();
    temp.child("bin/app").write_str("binary-v1").unwrap();
    let mut engine = engine_for(&temp);
    let root = NormalizedPath::new(temp.path());

    // cycle 1: baseline scan, everything created
    let (baseline_hash, changes) = engine.scan(&root).unwrap();
    assert_eq!(changes.created().len(), 5);

    // an external authority stages a release for bin/app
    let staging = TempDir::new().unwrap();
    staging.child("app").write_str("binary-v2").unwrap();
    let target = drift_fs::digest::hash_file(
        engine.config().digest,
        &NormalizedPath::new(staging.child("app").path()),
    )
    .unwrap();
    let app = root.join("bin/app");
    engine.assign_target(&app, Some(target)).unwrap();

    // cycle 2: the divergent path becomes the priority worklist
    let worklist = engine.plan_worklist(vec![root.clone()]).unwrap();
    // the routine root subsumes the priority entry
    assert_eq!(worklist.len(), 1);
    assert_eq!(worklist[0].path, root);

    // site has not converged yet: still divergent after a no-op scan
    let outcome = engine.run_bounded_scan(&worklist, Duration::from_secs(60));
    assert_eq!(outcome.processed, 1);
    assert_eq!(engine.convergence_candidates().unwrap(), vec![app.clone()]);

    // the rollout lands; the next cycle converges and clears the target
    temp.child("bin/app").write_str("binary-v2").unwrap();
    let outcome = engine.run_bounded_scan(&worklist, Duration::from_secs(60));
    assert!(outcome.changes.modified().contains(&app));
    assert!(engine.convergence_candidates().unwrap().is_empty());

    // and the root fingerprint moved off the old baseline
    let (new_hash, _) = engine.scan(&root).unwrap();
    assert_ne!(baseline_hash, new_hash);
}

#[test]
fn pruning_example_from_the_worklist_rules() {
    let pruned = worklist::prune(
        vec![NormalizedPath::new("/a/b")],
        vec![NormalizedPath::new("/a"), NormalizedPath::new("/a/b/c")],
    );
    assert_eq!(pruned.len(), 1);
    assert_eq!(pruned[0].path.as_str(), "/a");
}

#[test]
fn two_independent_sites_converge_to_the_same_fingerprint() {
    // each site owns its own tree and store; no cross-talk
    let site_a = TempDir::new().unwrap();
    let site_b = TempDir::new().unwrap();
    for site in [&site_a, &site_b] {
        site.child("data/config.toml").write_str("shared").unwrap();
        site.child("data/payload.bin").write_str("shared-bytes").unwrap();
    }

    let mut engine_a = engine_for(&site_a);
    let mut engine_b = engine_for(&site_b);

    let (hash_a, _) = engine_a.scan(&NormalizedPath::new(site_a.path())).unwrap();
    let (hash_b, _) = engine_b.scan(&NormalizedPath::new(site_b.path())).unwrap();

    // root paths differ, so the top-level hashes differ (path-salted
    // sentinels), but the shared subtree fingerprints agree
    let data_a = engine_a
        .store()
        .get(&NormalizedPath::new(site_a.path()).join("data/config.toml"))
        .unwrap()
        .current_hash
        .clone();
    let data_b = engine_b
        .store()
        .get(&NormalizedPath::new(site_b.path()).join("data/config.toml"))
        .unwrap()
        .current_hash
        .clone();
    assert_eq!(data_a, data_b);
    assert_ne!(hash_a, String::new());
    assert_ne!(hash_b, String::new());
}

#[test]
fn budget_partial_run_resumes_next_cycle() {
    let temp = TempDir::new().unwrap();
    temp.child("a/one.txt").write_str("1").unwrap();
    temp.child("b/two.txt").write_str("2").unwrap();
    let mut engine = engine_for(&temp);
    let root = NormalizedPath::new(temp.path());

    let worklist = vec![
        WorkItem::routine(root.join("a")),
        WorkItem::routine(root.join("b")),
    ];

    // budget exhausted before anything ran: normal partial outcome
    let first = engine.run_bounded_scan(&worklist, Duration::ZERO);
    assert!(first.is_partial());
    assert_eq!(first.processed, 0);

    // the next cycle picks the same worklist up and finishes it
    let second = engine.run_bounded_scan(&worklist, Duration::from_secs(60));
    assert!(!second.is_partial());
    assert_eq!(second.processed, 2);
}

#[test]
fn deep_tree_scans_without_recursion_limits() {
    let temp = TempDir::new().unwrap();
    let mut dir = std::path::PathBuf::from(temp.path());
    for i in 0..200 {
        dir.push(format!("d{i}"));
    }
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("leaf.txt"), "deep").unwrap();

    let mut engine = engine_for(&temp);
    let root = NormalizedPath::new(temp.path());
    let (_, changes) = engine.scan(&root).unwrap();
    // 200 dirs + root + leaf
    assert_eq!(changes.created().len(), 202);

    // a leaf change deep down still reaches the root
    std::fs::write(dir.join("leaf.txt"), "deeper").unwrap();
    let leaf = NormalizedPath::new(dir.join("leaf.txt"));
    let (_, changes) = engine.scan(&leaf).unwrap();
    assert_eq!(changes.modified().len(), 202);
    assert!(changes.modified().contains(&root));
}
