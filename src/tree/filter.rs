//! Filter results consumed by the row projector.
//!
//! The projector never interprets filter text itself. A `NodeMatcher`
//! (the fuzzy search in the TUI, or a closure in tests) decides which nodes
//! match; this module only folds those answers up the tree so every node
//! also knows whether anything beneath it matched.

use crate::data::{Graph, Node};
use std::collections::HashMap;

/// Decides whether a single node matches the filter text.
pub trait NodeMatcher {
    fn matches(&mut self, node: &Node, query: &str) -> bool;
}

impl<F> NodeMatcher for F
where
    F: FnMut(&Node, &str) -> bool,
{
    fn matches(&mut self, node: &Node, query: &str) -> bool {
        self(node, query)
    }
}

/// Per-node answer from the filter provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterMatch {
    pub matches: bool,
    pub has_matching_child: bool,
}

impl FilterMatch {
    pub fn is_visible(&self) -> bool {
        self.matches || self.has_matching_child
    }
}

#[derive(Debug, Clone, Default)]
pub struct FilterState {
    text: String,
    matches: HashMap<String, FilterMatch>,
}

impl FilterState {
    /// Run the matcher over every node and derive `has_matching_child`.
    pub fn evaluate<M>(graph: &Graph, text: &str, matcher: &mut M) -> Self
    where
        M: NodeMatcher + ?Sized,
    {
        let query = text.trim();
        if query.is_empty() {
            return Self::default();
        }

        let direct: HashMap<&str, bool> = graph
            .nodes()
            .map(|n| (n.id.as_str(), matcher.matches(n, query)))
            .collect();

        let mut below: HashMap<&str, bool> = HashMap::new();
        for node in graph.nodes() {
            descendant_matches(graph, &node.id, &direct, &mut below);
        }

        let matches = direct
            .iter()
            .map(|(id, matched)| {
                (
                    id.to_string(),
                    FilterMatch {
                        matches: *matched,
                        has_matching_child: below.get(id).copied().unwrap_or(false),
                    },
                )
            })
            .collect();

        Self {
            text: text.to_string(),
            matches,
        }
    }

    /// Build from answers computed elsewhere.
    pub fn from_matches(text: impl Into<String>, matches: HashMap<String, FilterMatch>) -> Self {
        Self {
            text: text.into(),
            matches,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_active(&self) -> bool {
        !self.text.trim().is_empty()
    }

    /// Unknown IDs neither match nor have matching children.
    pub fn get(&self, id: &str) -> FilterMatch {
        self.matches.get(id).copied().unwrap_or_default()
    }

    pub fn match_count(&self) -> usize {
        self.matches.values().filter(|m| m.matches).count()
    }
}

/// Memoized "does anything strictly below `id` match".
fn descendant_matches<'a>(
    graph: &'a Graph,
    id: &'a str,
    direct: &HashMap<&str, bool>,
    memo: &mut HashMap<&'a str, bool>,
) -> bool {
    if let Some(known) = memo.get(id) {
        return *known;
    }

    let mut found = false;
    if let Some(node) = graph.get(id) {
        for child in &node.children {
            let child_matches = direct.get(child.as_str()).copied().unwrap_or(false);
            // Evaluate every child so the memo covers the whole subtree
            if descendant_matches(graph, child, direct, memo) || child_matches {
                found = true;
            }
        }
    }

    memo.insert(id, found);
    found
}
