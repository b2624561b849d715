//! In-memory issue graph.
//!
//! Issues form a DAG: one issue may sit under several parents. Every
//! reference between nodes is a stable issue ID, so a refresh simply builds
//! a fresh `Graph` and any state that must survive it is keyed by ID too.

use super::sorting::sort_siblings;
use super::{
    BeadPriority, BeadStatus, Comment, Digest, IssueRecord, IssueType, SortMode,
};
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};

/// One issue plus its position in the hierarchy.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: BeadStatus,
    pub priority: BeadPriority,
    pub issue_type: IssueType,
    pub assignee: Option<String>,
    pub labels: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Child IDs in display order
    pub children: Vec<String>,
    /// Parent IDs; more than one makes this a shared node
    pub parents: Vec<String>,
    /// Default expansion, used unless a per-instance override exists
    pub expanded: bool,
    pub comments_loaded: bool,
    pub comments: Vec<Comment>,
    /// Set when the comment fetch failed; the node still counts as loaded
    pub comments_error: Option<String>,
}

impl Node {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            status: BeadStatus::default(),
            priority: BeadPriority::default(),
            issue_type: IssueType::default(),
            assignee: None,
            labels: Vec::new(),
            created_at: now,
            updated_at: now,
            children: Vec::new(),
            parents: Vec::new(),
            expanded: false,
            comments_loaded: false,
            comments: Vec::new(),
            comments_error: None,
        }
    }

    pub fn from_record(record: &IssueRecord) -> Self {
        Self {
            id: record.id.clone(),
            title: record.title.clone(),
            description: record.description.clone(),
            status: record.status,
            priority: record.priority,
            issue_type: record.issue_type,
            assignee: record.assignee.clone(),
            labels: record.labels.clone(),
            created_at: record.created_at,
            updated_at: record.updated_at,
            children: Vec::new(),
            parents: Vec::new(),
            expanded: false,
            comments_loaded: false,
            comments: Vec::new(),
            comments_error: None,
        }
    }

    /// A node reachable through more than one parent
    pub fn is_shared(&self) -> bool {
        self.parents.len() > 1
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Version string recorded in the snapshot digest
    pub fn version(&self) -> String {
        self.updated_at.to_rfc3339()
    }
}

/// The full issue DAG for one fetch.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: HashMap<String, Node>,
    roots: Vec<String>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from `bd list --json` records.
    ///
    /// Parent-child dependencies pointing at issues outside the record set
    /// are ignored, so a filtered listing still renders as a tree. Cyclic
    /// parent-child data is rejected.
    pub fn from_records(records: &[IssueRecord], sort_mode: SortMode) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut ordered: Vec<&IssueRecord> = records
            .iter()
            .filter(|r| seen.insert(r.id.as_str()))
            .collect();
        sort_siblings(&mut ordered, sort_mode);

        let mut graph = Graph::new();
        for record in &ordered {
            graph.insert(Node::from_record(record));
        }

        // child -> parents, in the order the edges were found
        let mut parents_of: HashMap<&str, Vec<&str>> = HashMap::new();
        let mut edges = HashSet::new();
        for record in records {
            for dep in record.dependencies.iter().filter(|d| d.is_parent_child()) {
                let (child, parent) = (dep.issue_id.as_str(), dep.depends_on_id.as_str());
                if child == parent || !graph.contains(child) || !graph.contains(parent) {
                    continue;
                }
                if edges.insert((parent, child)) {
                    parents_of.entry(child).or_default().push(parent);
                }
            }
        }

        // Link children in sorted order so every child list comes out sorted
        for record in &ordered {
            if let Some(parents) = parents_of.get(record.id.as_str()) {
                for parent in parents {
                    graph.link(parent, &record.id);
                }
            }
        }

        if let Some(id) = graph.find_cycle() {
            anyhow::bail!("parent-child cycle detected at issue {}", id);
        }

        tracing::debug!(
            nodes = graph.len(),
            roots = graph.roots.len(),
            "built issue graph"
        );
        Ok(graph)
    }

    /// Add a node. Nodes without parents become roots until linked.
    pub fn insert(&mut self, node: Node) {
        let id = node.id.clone();
        if node.parents.is_empty() && !self.roots.contains(&id) {
            self.roots.push(id.clone());
        }
        self.nodes.insert(id, node);
    }

    /// Attach `child` under `parent`, appending to the parent's children.
    ///
    /// Returns false when either node is missing or the edge already exists.
    pub fn link(&mut self, parent: &str, child: &str) -> bool {
        if !self.nodes.contains_key(parent) {
            return false;
        }
        match self.nodes.get_mut(child) {
            Some(node) if !node.parents.iter().any(|p| p == parent) => {
                node.parents.push(parent.to_string());
            }
            _ => return false,
        }
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.push(child.to_string());
        }
        self.roots.retain(|r| r != child);
        true
    }

    pub fn get(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn roots(&self) -> &[String] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.nodes.values_mut()
    }

    /// Snapshot digest: issue ID to version
    pub fn digest(&self) -> Digest {
        self.nodes
            .values()
            .map(|n| (n.id.clone(), n.version()))
            .collect()
    }

    /// Every node reachable from the roots, once per ID, in pre-order.
    pub fn unique_ids(&self) -> Vec<String> {
        let mut visited = HashSet::new();
        let mut order = Vec::new();
        let mut stack: Vec<&str> = self.roots.iter().rev().map(String::as_str).collect();

        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            order.push(id.to_string());
            stack.extend(node.children.iter().rev().map(String::as_str));
        }

        order
    }

    /// Store the outcome of a comment fetch on the node with this ID.
    ///
    /// A failed fetch still marks the node loaded, with no comments and the
    /// error kept for display. Returns false if the ID is not in the graph.
    pub fn apply_comments(&mut self, id: &str, result: Result<Vec<Comment>, String>) -> bool {
        let Some(node) = self.nodes.get_mut(id) else {
            return false;
        };
        node.comments_loaded = true;
        match result {
            Ok(comments) => {
                node.comments = comments;
                node.comments_error = None;
            }
            Err(e) => {
                node.comments = Vec::new();
                node.comments_error = Some(e);
            }
        }
        true
    }

    /// Detach a node from the ID index, leaving references to it in place.
    pub fn take(&mut self, id: &str) -> Option<Node> {
        self.nodes.remove(id)
    }

    pub(crate) fn roots_mut(&mut self) -> &mut Vec<String> {
        &mut self.roots
    }

    /// Find a node that is its own ancestor, if any.
    pub fn find_cycle(&self) -> Option<String> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            InProgress,
            Done,
        }

        fn visit<'a>(
            graph: &'a Graph,
            id: &'a str,
            marks: &mut HashMap<&'a str, Mark>,
        ) -> Option<String> {
            match marks.get(id) {
                Some(Mark::Done) => return None,
                Some(Mark::InProgress) => return Some(id.to_string()),
                None => {}
            }
            marks.insert(id, Mark::InProgress);
            if let Some(node) = graph.nodes.get(id) {
                for child in &node.children {
                    if let Some(found) = visit(graph, child, marks) {
                        return Some(found);
                    }
                }
            }
            marks.insert(id, Mark::Done);
            None
        }

        let mut marks = HashMap::new();
        let mut ids: Vec<&str> = self.nodes.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids.into_iter().find_map(|id| visit(self, id, &mut marks))
    }
}
