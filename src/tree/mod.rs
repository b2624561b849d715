//! Tree view model: rows, expansion, filtering, and refresh handling.
//!
//! `TreeView` is owned by the single-threaded control loop. Nothing in here
//! locks; background work (tree fetches, comment prefetch) reports back
//! through channels and is applied with `apply_refresh` and
//! `apply_comment_event`.

pub mod expansion;
pub mod filter;
pub mod mutation;
pub mod prefetch;
pub mod projector;
pub mod refresh;

pub use expansion::{ExpansionStore, InstanceKey};
pub use filter::{FilterMatch, FilterState, NodeMatcher};
pub use prefetch::{preload_all, spawn_preload, CommentEvent};
pub use projector::project;
pub use refresh::{compute_diff_stats, DiffStats, UiSnapshot};

use crate::data::{Digest, Graph, Node};
use chrono::{DateTime, Utc};

/// One rendered line: a node reached through a particular parent.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TreeRow {
    pub node_id: String,
    /// Parent occurrence this row was reached through (`None` for roots)
    pub parent_id: Option<String>,
    pub depth: usize,
}

impl TreeRow {
    pub fn new(node_id: impl Into<String>, parent_id: Option<&str>, depth: usize) -> Self {
        Self {
            node_id: node_id.into(),
            parent_id: parent_id.map(str::to_string),
            depth,
        }
    }

    pub fn key(&self) -> InstanceKey {
        InstanceKey::for_row(self)
    }
}

/// Which pane receives navigation keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Tree,
    Detail,
}

impl Focus {
    pub fn toggle(self) -> Self {
        match self {
            Self::Tree => Self::Detail,
            Self::Detail => Self::Tree,
        }
    }
}

#[derive(Debug, Default)]
pub struct TreeView {
    graph: Graph,
    expansion: ExpansionStore,
    rows: Vec<TreeRow>,
    filter: Option<FilterState>,
    digest: Digest,
    /// Bumped on every applied refresh; tags background prefetch work
    generation: u64,
    pub cursor: usize,
    pub scroll_offset: usize,
    /// Visible row count, set by the renderer (0 until the first draw)
    pub viewport_height: usize,
    pub focus: Focus,
    pub last_diff: Option<DiffStats>,
    pub last_refresh: Option<DateTime<Utc>>,
}

impl TreeView {
    pub fn new() -> Self {
        Self::default()
    }

    /// View over an initial graph, with no diff recorded.
    pub fn from_graph(graph: Graph) -> Self {
        let mut view = Self {
            digest: graph.digest(),
            graph,
            ..Self::default()
        };
        view.rows = project(&view.graph, &view.expansion, None);
        view
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn rows(&self) -> &[TreeRow] {
        &self.rows
    }

    pub fn expansion(&self) -> &ExpansionStore {
        &self.expansion
    }

    pub fn filter(&self) -> Option<&FilterState> {
        self.filter.as_ref()
    }

    pub fn is_filtering(&self) -> bool {
        self.filter.as_ref().is_some_and(FilterState::is_active)
    }

    pub fn digest(&self) -> &Digest {
        &self.digest
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn selected_row(&self) -> Option<&TreeRow> {
        self.rows.get(self.cursor)
    }

    pub fn selected_node(&self) -> Option<&Node> {
        self.selected_row().and_then(|row| self.graph.get(&row.node_id))
    }

    pub fn is_expanded(&self, row: &TreeRow) -> bool {
        self.expansion.is_expanded(&self.graph, row, self.filter.as_ref())
    }

    /// Recompute rows, keeping the cursor on the same occurrence if it survived.
    pub fn reproject(&mut self) {
        let current = self
            .selected_row()
            .map(|row| (row.node_id.clone(), row.parent_id.clone()));

        self.rows = project(&self.graph, &self.expansion, self.filter.as_ref());

        let restored = current
            .as_ref()
            .is_some_and(|(id, parent)| self.restore_cursor(Some(id.as_str()), parent.as_deref()));
        if !restored {
            self.cursor = self.cursor.min(self.rows.len().saturating_sub(1));
        }
        self.scroll_offset = self.scroll_offset.min(self.max_scroll());
        self.ensure_cursor_visible();
    }

    /// Point the cursor at `id`, preferring the occurrence under `parent`.
    ///
    /// Returns false (cursor untouched) when no row shows that node.
    pub fn restore_cursor(&mut self, id: Option<&str>, parent: Option<&str>) -> bool {
        let Some(id) = id else {
            return false;
        };

        let exact = self
            .rows
            .iter()
            .position(|r| r.node_id == id && r.parent_id.as_deref() == parent);
        let found = exact.or_else(|| self.rows.iter().position(|r| r.node_id == id));

        match found {
            Some(idx) => {
                self.cursor = idx;
                true
            }
            None => false,
        }
    }

    fn max_scroll(&self) -> usize {
        if self.viewport_height == 0 {
            self.rows.len().saturating_sub(1)
        } else {
            self.rows.len().saturating_sub(self.viewport_height)
        }
    }

    pub fn ensure_cursor_visible(&mut self) {
        if self.viewport_height == 0 {
            return;
        }
        if self.cursor < self.scroll_offset {
            self.scroll_offset = self.cursor;
        } else if self.cursor >= self.scroll_offset + self.viewport_height {
            self.scroll_offset = self.cursor + 1 - self.viewport_height;
        }
    }

    pub fn set_viewport_height(&mut self, height: usize) {
        self.viewport_height = height;
        self.scroll_offset = self.scroll_offset.min(self.max_scroll());
        self.ensure_cursor_visible();
    }

    // ─────────────────────────────────────────────────────────────────────
    // Navigation
    // ─────────────────────────────────────────────────────────────────────

    pub fn move_cursor(&mut self, delta: isize) {
        if self.rows.is_empty() {
            self.cursor = 0;
            return;
        }
        let last = self.rows.len() - 1;
        self.cursor = self.cursor.saturating_add_signed(delta).min(last);
        self.ensure_cursor_visible();
    }

    pub fn goto_top(&mut self) {
        self.cursor = 0;
        self.ensure_cursor_visible();
    }

    pub fn goto_bottom(&mut self) {
        self.cursor = self.rows.len().saturating_sub(1);
        self.ensure_cursor_visible();
    }

    fn half_page(&self) -> isize {
        (self.viewport_height / 2).max(1) as isize
    }

    pub fn page_down(&mut self) {
        self.move_cursor(self.half_page());
    }

    pub fn page_up(&mut self) {
        self.move_cursor(-self.half_page());
    }

    /// Move to the row this occurrence was reached through.
    pub fn goto_parent(&mut self) -> bool {
        let Some(row) = self.selected_row() else {
            return false;
        };
        if row.parent_id.is_none() {
            return false;
        }
        let depth = row.depth;
        let parent_idx = self.rows[..self.cursor]
            .iter()
            .rposition(|r| r.depth + 1 == depth);
        match parent_idx {
            Some(idx) => {
                self.cursor = idx;
                self.ensure_cursor_visible();
                true
            }
            None => false,
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Expansion
    // ─────────────────────────────────────────────────────────────────────

    pub fn expand_selected(&mut self) {
        let Some(row) = self.selected_row().cloned() else {
            return;
        };
        let filtering = self.is_filtering();
        self.expansion.expand(&mut self.graph, &row, filtering);
        self.reproject();
    }

    /// Collapse the selected row, or step to its parent if already closed.
    pub fn collapse_selected(&mut self) {
        let Some(row) = self.selected_row().cloned() else {
            return;
        };
        if !self.is_expanded(&row) {
            self.goto_parent();
            return;
        }
        let filtering = self.is_filtering();
        self.expansion.collapse(&mut self.graph, &row, filtering);
        self.reproject();
    }

    pub fn toggle_selected(&mut self) {
        let Some(row) = self.selected_row().cloned() else {
            return;
        };
        let filtering = self.is_filtering();
        if self.is_expanded(&row) {
            self.expansion.collapse(&mut self.graph, &row, filtering);
        } else {
            self.expansion.expand(&mut self.graph, &row, filtering);
        }
        self.reproject();
    }

    pub fn expand_all(&mut self) {
        self.set_all_expanded(true);
    }

    pub fn collapse_all(&mut self) {
        self.set_all_expanded(false);
    }

    /// Set every node's default expansion and drop per-instance overrides.
    fn set_all_expanded(&mut self, expanded: bool) {
        for node in self.graph.nodes_mut() {
            node.expanded = expanded && node.has_children();
        }
        self.expansion.clear_instances();
        self.reproject();
    }

    /// Expand the root nodes (used for a first load).
    pub fn expand_roots(&mut self) {
        let roots: Vec<String> = self.graph.roots().to_vec();
        for id in roots {
            if let Some(node) = self.graph.get_mut(&id) {
                node.expanded = node.has_children();
            }
        }
        self.reproject();
    }

    // ─────────────────────────────────────────────────────────────────────
    // Filtering
    // ─────────────────────────────────────────────────────────────────────

    pub fn set_filter<M>(&mut self, text: &str, matcher: &mut M)
    where
        M: NodeMatcher + ?Sized,
    {
        if text.trim().is_empty() {
            self.clear_filter();
            return;
        }
        let state = FilterState::evaluate(&self.graph, text, matcher);
        tracing::debug!(query = text, matches = state.match_count(), "filter applied");
        self.filter = Some(state);
        self.reproject();
    }

    /// Remove the filter; filter-scoped overrides are discarded.
    pub fn clear_filter(&mut self) {
        self.filter = None;
        self.expansion.clear_filter_overrides();
        self.reproject();
    }

    // ─────────────────────────────────────────────────────────────────────
    // Mutation
    // ─────────────────────────────────────────────────────────────────────

    /// Remove a node everywhere it occurs and re-project.
    pub fn remove_node(&mut self, id: &str) -> bool {
        if !mutation::remove_node(&mut self.graph, id) {
            return false;
        }
        self.reproject();
        true
    }

    // ─────────────────────────────────────────────────────────────────────
    // Refresh
    // ─────────────────────────────────────────────────────────────────────

    /// Capture the state a refresh must carry over to the new graph.
    pub fn capture(&self) -> UiSnapshot {
        let row = self.selected_row();
        UiSnapshot {
            current_id: row.map(|r| r.node_id.clone()),
            current_parent_id: row.and_then(|r| r.parent_id.clone()),
            filter_text: self
                .filter
                .as_ref()
                .map(|f| f.text().to_string())
                .unwrap_or_default(),
            expanded_ids: ExpansionStore::permanent_expanded_ids(&self.graph),
            viewport_offset: self.scroll_offset,
            focus: self.focus,
        }
    }

    /// Replace the graph with a freshly fetched one, capturing state first.
    ///
    /// Returns the diff summary (`+A / ΔC / -R`).
    pub fn apply_refresh<M>(
        &mut self,
        graph: Graph,
        digest: Digest,
        now: DateTime<Utc>,
        matcher: &mut M,
    ) -> String
    where
        M: NodeMatcher + ?Sized,
    {
        let snapshot = self.capture();
        self.apply_refresh_with(snapshot, graph, digest, now, matcher)
    }

    /// Replace the graph, restoring a snapshot captured before the fetch.
    pub fn apply_refresh_with<M>(
        &mut self,
        snapshot: UiSnapshot,
        mut graph: Graph,
        digest: Digest,
        now: DateTime<Utc>,
        matcher: &mut M,
    ) -> String
    where
        M: NodeMatcher + ?Sized,
    {
        let stats = compute_diff_stats(&self.digest, &digest);

        // Per-instance overrides are keyed by ID and carry over untouched;
        // only the default flags live on the (new) nodes.
        for id in &snapshot.expanded_ids {
            if let Some(node) = graph.get_mut(id) {
                node.expanded = true;
            }
        }
        // A shared node opened under a filter already holds an instance
        // override; flipping its default would open every other occurrence.
        for id in self.expansion.filter_forced_expanded_ids() {
            if let Some(node) = graph.get_mut(id).filter(|n| !n.is_shared()) {
                node.expanded = true;
            }
        }

        self.graph = graph;
        self.digest = digest;
        self.generation += 1;
        self.filter = if snapshot.filter_text.trim().is_empty() {
            None
        } else {
            Some(FilterState::evaluate(&self.graph, &snapshot.filter_text, matcher))
        };
        self.rows = project(&self.graph, &self.expansion, self.filter.as_ref());

        let restored = self.restore_cursor(
            snapshot.current_id.as_deref(),
            snapshot.current_parent_id.as_deref(),
        );
        if !restored {
            if let Some(id) = &snapshot.current_id {
                tracing::debug!(id = %id, "selected issue gone after refresh, resetting cursor");
            }
            self.cursor = 0;
        }

        self.scroll_offset = snapshot.viewport_offset.min(self.max_scroll());
        self.ensure_cursor_visible();
        self.focus = snapshot.focus;
        self.last_diff = Some(stats);
        self.last_refresh = Some(now);

        tracing::info!(
            nodes = self.graph.len(),
            rows = self.rows.len(),
            generation = self.generation,
            "refresh applied ({})",
            stats
        );
        stats.to_string()
    }

    /// Apply a prefetch result. Events from a superseded refresh are dropped.
    pub fn apply_comment_event(&mut self, event: CommentEvent) -> bool {
        if event.generation() != self.generation {
            tracing::trace!(
                event_generation = event.generation(),
                current = self.generation,
                "dropping stale comment event"
            );
            return false;
        }
        match event {
            CommentEvent::Loaded { id, result, .. } => self.graph.apply_comments(&id, result),
            CommentEvent::Finished { .. } => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_filter(_: &Node, _: &str) -> bool {
        false
    }

    fn chain(n: usize) -> Graph {
        let mut graph = Graph::new();
        for i in 0..n {
            let mut node = Node::new(format!("n{}", i), format!("Node {}", i));
            node.expanded = true;
            graph.insert(node);
            if i > 0 {
                graph.link(&format!("n{}", i - 1), &format!("n{}", i));
            }
        }
        graph
    }

    #[test]
    fn test_move_cursor_clamps() {
        let mut view = TreeView::from_graph(chain(3));
        view.move_cursor(10);
        assert_eq!(view.cursor, 2);
        view.move_cursor(-10);
        assert_eq!(view.cursor, 0);
    }

    #[test]
    fn test_ensure_cursor_visible_scrolls() {
        let mut view = TreeView::from_graph(chain(10));
        view.set_viewport_height(3);
        view.move_cursor(5);
        assert_eq!(view.scroll_offset, 3);
        view.goto_top();
        assert_eq!(view.scroll_offset, 0);
    }

    #[test]
    fn test_collapse_on_closed_row_moves_to_parent() {
        let mut view = TreeView::from_graph(chain(3));
        view.goto_bottom();
        view.collapse_selected();
        assert_eq!(view.selected_row().unwrap().node_id, "n1");
    }

    #[test]
    fn test_refresh_into_empty_graph_resets_cursor() {
        let mut view = TreeView::from_graph(chain(3));
        view.goto_bottom();

        let summary = view.apply_refresh(Graph::new(), Digest::new(), Utc::now(), &mut no_filter);
        assert_eq!(summary, "+0 / Δ0 / -3");
        assert_eq!(view.cursor, 0);
        assert!(view.selected_row().is_none());
    }

    #[test]
    fn test_stale_comment_event_is_dropped() {
        let mut view = TreeView::from_graph(chain(1));
        let stale = CommentEvent::Loaded {
            generation: view.generation() + 1,
            id: "n0".to_string(),
            result: Ok(vec![]),
        };
        assert!(!view.apply_comment_event(stale));
        assert!(!view.graph().get("n0").unwrap().comments_loaded);
    }
}
