//! Flattens the issue graph into the ordered rows the table renders.

use super::expansion::{ExpansionStore, InstanceKey};
use super::filter::FilterState;
use super::TreeRow;
use crate::data::Graph;

/// Depth-first pre-order walk from the roots.
///
/// A node appears once per parent occurrence that is itself visible and
/// expanded, so a shared node with `k` open parents yields `k` rows. While
/// a filter is active only matching nodes, their ancestors, and the
/// children of occurrences the user forced open are emitted.
///
/// # Panics
///
/// Panics if a node is reachable from itself. Graphs built from records
/// are checked for cycles before they get here.
pub fn project(graph: &Graph, expansion: &ExpansionStore, filter: Option<&FilterState>) -> Vec<TreeRow> {
    let filter = filter.filter(|f| f.is_active());
    let mut rows = Vec::with_capacity(graph.len());
    let mut ancestors: Vec<&str> = Vec::new();

    for root in graph.roots() {
        visit(graph, expansion, filter, root, None, 0, false, &mut ancestors, &mut rows);
    }

    rows
}

#[allow(clippy::too_many_arguments)]
fn visit<'a>(
    graph: &'a Graph,
    expansion: &ExpansionStore,
    filter: Option<&FilterState>,
    id: &'a str,
    parent: Option<&'a str>,
    depth: usize,
    parent_forced_open: bool,
    ancestors: &mut Vec<&'a str>,
    rows: &mut Vec<TreeRow>,
) {
    let Some(node) = graph.get(id) else {
        return;
    };

    assert!(
        !ancestors.contains(&id),
        "issue {} is its own ancestor (path: {})",
        id,
        ancestors.join(" > ")
    );

    if let Some(filter) = filter {
        if !parent_forced_open && !filter.get(id).is_visible() {
            return;
        }
    }

    let row = TreeRow::new(id, parent, depth);
    let descend = expansion.is_expanded(graph, &row, filter);
    let forced_open = filter.is_some()
        && expansion.filter_override(&InstanceKey::for_row(&row)) == Some(true);
    rows.push(row);

    if !descend {
        return;
    }

    ancestors.push(id);
    for child in &node.children {
        visit(
            graph,
            expansion,
            filter,
            child,
            Some(id),
            depth + 1,
            forced_open,
            ancestors,
            rows,
        );
    }
    ancestors.pop();
}
