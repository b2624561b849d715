//! Expand/collapse state for tree rows.
//!
//! Resolution is two-tiered. A shared node (several parents) can carry an
//! explicit override per occurrence, keyed by `InstanceKey`; anything else
//! falls back to the node's own `expanded` flag. While a filter is applied,
//! manual toggles are additionally recorded in filter-scoped sets that win
//! over the filter's auto-expansion and are dropped when the filter clears.

use super::filter::FilterState;
use super::TreeRow;
use crate::data::Graph;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Identifies one occurrence of a node: `"{parent_id}:{node_id}"`.
///
/// The parent part is empty for roots. Both halves are stable issue IDs,
/// so keys stay valid across refreshes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceKey(String);

impl InstanceKey {
    pub fn new(parent_id: Option<&str>, node_id: &str) -> Self {
        Self(format!("{}:{}", parent_id.unwrap_or(""), node_id))
    }

    pub fn for_row(row: &TreeRow) -> Self {
        Self::new(row.parent_id.as_deref(), &row.node_id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The node half of the key
    pub fn node_id(&self) -> &str {
        // Issue IDs never contain ':'
        self.0.rsplit_once(':').map(|(_, id)| id).unwrap_or(&self.0)
    }
}

impl fmt::Display for InstanceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExpansionStore {
    /// Explicit per-occurrence state for shared nodes
    instances: HashMap<InstanceKey, bool>,
    /// Occurrences the user collapsed while a filter was applied
    filter_collapsed: HashSet<InstanceKey>,
    /// Occurrences the user expanded while a filter was applied
    filter_forced_expanded: HashSet<InstanceKey>,
}

impl ExpansionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Permanent (non-filter) expansion for a row.
    pub fn base_expanded(&self, graph: &Graph, row: &TreeRow) -> bool {
        let Some(node) = graph.get(&row.node_id) else {
            return false;
        };
        if node.is_shared() {
            if let Some(expanded) = self.instances.get(&InstanceKey::for_row(row)) {
                return *expanded;
            }
        }
        node.expanded
    }

    /// Manual override recorded under the active filter, if any.
    ///
    /// Forced-expanded wins when both sets hold the same occurrence.
    pub fn filter_override(&self, key: &InstanceKey) -> Option<bool> {
        if self.filter_forced_expanded.contains(key) {
            Some(true)
        } else if self.filter_collapsed.contains(key) {
            Some(false)
        } else {
            None
        }
    }

    /// Whether the projector descends into this row's children.
    pub fn is_expanded(&self, graph: &Graph, row: &TreeRow, filter: Option<&FilterState>) -> bool {
        let Some(node) = graph.get(&row.node_id) else {
            return false;
        };
        if !node.has_children() {
            return false;
        }

        if let Some(filter) = filter.filter(|f| f.is_active()) {
            if let Some(forced) = self.filter_override(&InstanceKey::for_row(row)) {
                return forced;
            }
            if filter.get(&row.node_id).has_matching_child {
                return true;
            }
        }

        self.base_expanded(graph, row)
    }

    pub fn expand(&mut self, graph: &mut Graph, row: &TreeRow, filter_active: bool) {
        self.set_expanded(graph, row, true, filter_active);
    }

    pub fn collapse(&mut self, graph: &mut Graph, row: &TreeRow, filter_active: bool) {
        self.set_expanded(graph, row, false, filter_active);
    }

    fn set_expanded(&mut self, graph: &mut Graph, row: &TreeRow, expanded: bool, filter_active: bool) {
        let Some(node) = graph.get_mut(&row.node_id) else {
            tracing::debug!(id = %row.node_id, "toggle on stale row ignored");
            return;
        };

        let key = InstanceKey::for_row(row);
        if node.is_shared() {
            self.instances.insert(key.clone(), expanded);
        } else {
            node.expanded = expanded;
        }

        if filter_active {
            if expanded {
                self.filter_collapsed.remove(&key);
                self.filter_forced_expanded.insert(key);
            } else {
                self.filter_forced_expanded.remove(&key);
                self.filter_collapsed.insert(key);
            }
        }
    }

    pub fn instance_override(&self, key: &InstanceKey) -> Option<bool> {
        self.instances.get(key).copied()
    }

    /// Node IDs the user forced open under the current filter.
    pub fn filter_forced_expanded_ids(&self) -> impl Iterator<Item = &str> {
        self.filter_forced_expanded.iter().map(InstanceKey::node_id)
    }

    pub fn has_filter_overrides(&self) -> bool {
        !self.filter_collapsed.is_empty() || !self.filter_forced_expanded.is_empty()
    }

    /// Drop filter-scoped overrides without touching permanent state.
    pub fn clear_filter_overrides(&mut self) {
        self.filter_collapsed.clear();
        self.filter_forced_expanded.clear();
    }

    /// Forget every per-instance override (used by collapse-all/expand-all).
    pub fn clear_instances(&mut self) {
        self.instances.clear();
    }

    /// IDs of nodes whose default flag is expanded.
    pub fn permanent_expanded_ids(graph: &Graph) -> HashSet<String> {
        graph
            .nodes()
            .filter(|n| n.expanded)
            .map(|n| n.id.clone())
            .collect()
    }
}
