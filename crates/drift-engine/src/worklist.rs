//! Worklist assembly: dedupe, ancestor-prune, priority ordering
//!
//! A scan cycle feeds two lists into the scheduler: priority paths
//! already known to need re-verification (divergent records) and routine
//! paths due for a periodic re-check. Scanning an ancestor re-derives
//! every descendant transitively, so any entry with an ancestor elsewhere
//! in the worklist is redundant and dropped.

use serde::{Deserialize, Serialize};

use drift_fs::NormalizedPath;

/// One scheduled scan target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    pub path: NormalizedPath,
    /// True when the entry came from the priority list.
    pub priority: bool,
}

impl WorkItem {
    pub fn priority(path: impl Into<NormalizedPath>) -> Self {
        Self {
            path: path.into(),
            priority: true,
        }
    }

    pub fn routine(path: impl Into<NormalizedPath>) -> Self {
        Self {
            path: path.into(),
            priority: false,
        }
    }
}

/// Build an ancestor-minimal, deduplicated, priority-first worklist.
///
/// Rules:
/// - priority entries come first, each list's relative order preserved;
/// - a path appearing in both lists keeps its priority tag;
/// - a path with a filesystem-segment ancestor anywhere in the union is
///   dropped (the ancestor's scan subsumes it).
pub fn prune(
    priority: impl IntoIterator<Item = NormalizedPath>,
    routine: impl IntoIterator<Item = NormalizedPath>,
) -> Vec<WorkItem> {
    let mut combined: Vec<WorkItem> = Vec::new();
    for item in priority
        .into_iter()
        .map(WorkItem::priority)
        .chain(routine.into_iter().map(WorkItem::routine))
    {
        // first occurrence wins; priority entries come first, so a
        // duplicate routine entry never downgrades the tag
        if !combined.iter().any(|w| w.path == item.path) {
            combined.push(item);
        }
    }

    // priority entries are already in front; retain preserves order
    let paths: Vec<NormalizedPath> = combined.iter().map(|w| w.path.clone()).collect();
    combined.retain(|item| !paths.iter().any(|p| p.is_ancestor_of(&item.path)));
    combined
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(items: &[WorkItem]) -> Vec<&str> {
        items.iter().map(|w| w.path.as_str()).collect()
    }

    #[test]
    fn ancestor_subsumes_both_lists() {
        let pruned = prune(
            vec!["/a/b".into()],
            vec!["/a".into(), "/a/b/c".into()],
        );
        assert_eq!(paths(&pruned), vec!["/a"]);
        assert!(!pruned[0].priority);
    }

    #[test]
    fn duplicate_keeps_priority_tag() {
        let pruned = prune(vec!["/a/b".into()], vec!["/a/b".into()]);
        assert_eq!(paths(&pruned), vec!["/a/b"]);
        assert!(pruned[0].priority);
    }

    #[test]
    fn priority_entries_come_first() {
        let pruned = prune(
            vec!["/p/one".into(), "/p/two".into()],
            vec!["/r/one".into(), "/r/two".into()],
        );
        assert_eq!(paths(&pruned), vec!["/p/one", "/p/two", "/r/one", "/r/two"]);
        assert!(pruned[0].priority && pruned[1].priority);
        assert!(!pruned[2].priority && !pruned[3].priority);
    }

    #[test]
    fn sibling_name_prefix_is_not_an_ancestor() {
        let pruned = prune(vec!["/a/b".into()], vec!["/a/bc".into()]);
        assert_eq!(paths(&pruned), vec!["/a/b", "/a/bc"]);
    }

    #[test]
    fn empty_inputs_produce_empty_worklist() {
        let pruned = prune(Vec::new(), Vec::new());
        assert!(pruned.is_empty());
    }
}
