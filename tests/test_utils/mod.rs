//! Test utilities and fixtures for beadscope tests

#![allow(dead_code)]

use beadscope::data::{Graph, IssueRecord, Node, SortMode};
use beadscope::tree::TreeRow;
use serde_json::{json, Value};

/// One `bd list --json` record; `parents` become parent-child dependencies.
pub fn issue_json(id: &str, title: &str, parents: &[&str], updated_at: &str) -> Value {
    let deps: Vec<Value> = parents
        .iter()
        .map(|p| json!({"issue_id": id, "depends_on_id": p, "type": "parent-child"}))
        .collect();
    json!({
        "id": id,
        "title": title,
        "status": "open",
        "priority": 2,
        "issue_type": "task",
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": updated_at,
        "dependencies": deps,
    })
}

pub fn records(values: Vec<Value>) -> Vec<IssueRecord> {
    serde_json::from_value(Value::Array(values)).expect("fixture records parse")
}

/// bd-1 -> (bd-2, bd-3); bd-2 -> bd-4; bd-3 -> bd-4; bd-4 -> bd-5
///
/// Every call builds a new, disjoint graph with nothing expanded.
pub fn diamond_records(updated_at: &str) -> Vec<IssueRecord> {
    records(vec![
        issue_json("bd-1", "Roadmap", &[], updated_at),
        issue_json("bd-2", "Parser", &["bd-1"], updated_at),
        issue_json("bd-3", "Renderer", &["bd-1"], updated_at),
        issue_json("bd-4", "Shared tokenizer", &["bd-2", "bd-3"], updated_at),
        issue_json("bd-5", "Leaf task", &["bd-4"], updated_at),
    ])
}

pub fn diamond(updated_at: &str) -> Graph {
    Graph::from_records(&diamond_records(updated_at), SortMode::ById).expect("acyclic fixture")
}

pub const T1: &str = "2024-02-01T00:00:00Z";
pub const T2: &str = "2024-02-02T00:00:00Z";

/// A node with its default expansion switched on
pub fn expanded_node(id: &str) -> Node {
    let mut node = Node::new(id, id);
    node.expanded = true;
    node
}

/// Rows as "parent/node" strings ("-" for roots)
pub fn row_ids(rows: &[TreeRow]) -> Vec<String> {
    rows.iter()
        .map(|r| format!("{}/{}", r.parent_id.as_deref().unwrap_or("-"), r.node_id))
        .collect()
}

/// Matcher that never matches
pub fn no_match(_: &Node, _: &str) -> bool {
    false
}

/// Matcher comparing the query against the title exactly
pub fn title_is(node: &Node, query: &str) -> bool {
    node.title == query
}
