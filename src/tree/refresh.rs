//! Snapshot diffing and the UI state carried across a refresh.

use super::Focus;
use crate::data::Digest;
use std::collections::HashSet;
use std::fmt;

/// Added/changed/removed counts between two digests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffStats {
    pub added: usize,
    pub changed: usize,
    pub removed: usize,
}

impl DiffStats {
    pub fn is_empty(&self) -> bool {
        self.added == 0 && self.changed == 0 && self.removed == 0
    }
}

impl fmt::Display for DiffStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "+{} / Δ{} / -{}", self.added, self.changed, self.removed)
    }
}

/// Compare two digests by key.
///
/// Keys only in `new` are added, keys only in `old` removed, and keys in
/// both with a different version changed.
pub fn compute_diff_stats(old: &Digest, new: &Digest) -> DiffStats {
    let mut stats = DiffStats::default();

    for (id, version) in new {
        match old.get(id) {
            None => stats.added += 1,
            Some(previous) if previous != version => stats.changed += 1,
            Some(_) => {}
        }
    }
    stats.removed = old.keys().filter(|id| !new.contains_key(*id)).count();

    stats
}

/// UI state captured just before a refresh replaces the graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiSnapshot {
    /// Node under the cursor
    pub current_id: Option<String>,
    /// Parent occurrence the cursor was on, to pick the same instance back
    pub current_parent_id: Option<String>,
    pub filter_text: String,
    /// Nodes whose default flag was expanded (filter overrides excluded)
    pub expanded_ids: HashSet<String>,
    pub viewport_offset: usize,
    pub focus: Focus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digest(pairs: &[(&str, &str)]) -> Digest {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_diff_counts_each_kind() {
        let old = digest(&[("a", "t1"), ("b", "t1")]);
        let new = digest(&[("b", "t2"), ("c", "t1")]);

        let stats = compute_diff_stats(&old, &new);
        assert_eq!(stats.to_string(), "+1 / Δ1 / -1");
    }

    #[test]
    fn test_diff_identical_digests() {
        let old = digest(&[("a", "t1"), ("b", "t1")]);
        let stats = compute_diff_stats(&old, &old.clone());

        assert!(stats.is_empty());
        assert_eq!(stats.to_string(), "+0 / Δ0 / -0");
    }

    #[test]
    fn test_diff_from_empty_counts_all_added() {
        let new = digest(&[("a", "t1"), ("b", "t1"), ("c", "t1")]);
        let stats = compute_diff_stats(&Digest::new(), &new);

        assert_eq!(
            stats,
            DiffStats {
                added: 3,
                changed: 0,
                removed: 0
            }
        );
    }
}
