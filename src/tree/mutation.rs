//! Structural edits applied across every occurrence of a node.

use crate::data::Graph;

/// Remove `id` from the roots and from the children of every node.
///
/// A shared node disappears from all of its parents in one call. Children
/// left without a parent become roots. Rows are not recomputed here; the
/// caller re-runs the projector. Returns false if the ID was not present.
pub fn remove_node(graph: &mut Graph, id: &str) -> bool {
    let Some(removed) = graph.take(id) else {
        tracing::debug!(id, "remove of unknown node ignored");
        return false;
    };

    graph.roots_mut().retain(|r| r != id);
    for node in graph.nodes_mut() {
        node.children.retain(|c| c != id);
        node.parents.retain(|p| p != id);
    }

    for child in &removed.children {
        let orphaned = graph.get(child).is_some_and(|n| n.parents.is_empty());
        if orphaned && !graph.roots().contains(child) {
            graph.roots_mut().push(child.clone());
        }
    }

    tracing::debug!(id, "removed node from graph");
    true
}
