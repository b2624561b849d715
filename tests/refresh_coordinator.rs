//! Refresh handling: diff summary and UI state carried onto a new graph.

mod test_utils;

use beadscope::data::{Digest, Graph, SortMode};
use beadscope::tree::{compute_diff_stats, CommentEvent, Focus, TreeRow, TreeView};
use chrono::Utc;
use test_utils::{diamond, issue_json, no_match, records, row_ids, title_is, T1, T2};

fn refresh(view: &mut TreeView, graph: Graph) -> String {
    let digest = graph.digest();
    view.apply_refresh(graph, digest, Utc::now(), &mut no_match)
}

/// Fully expanded diamond (7 rows)
fn loaded_view() -> TreeView {
    let mut view = TreeView::new();
    refresh(&mut view, diamond(T1));
    view.expand_all();
    view
}

fn select(view: &mut TreeView, node: &str, parent: Option<&str>) {
    let idx = view
        .rows()
        .iter()
        .position(|r| r.node_id == node && r.parent_id.as_deref() == parent)
        .expect("row present");
    view.cursor = idx;
}

mod diff {
    use super::*;
    use pretty_assertions::assert_eq;

    fn digest(pairs: &[(&str, &str)]) -> Digest {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_diff_summary_format() {
        let old = digest(&[("a", "t1"), ("b", "t1")]);
        let new = digest(&[("b", "t2"), ("c", "t1")]);
        assert_eq!(compute_diff_stats(&old, &new).to_string(), "+1 / Δ1 / -1");
    }

    #[test]
    fn test_refresh_reports_changed_versions() {
        let mut view = loaded_view();
        let summary = refresh(&mut view, diamond(T2));
        assert_eq!(summary, "+0 / Δ5 / -0");
        assert_eq!(view.last_diff.unwrap().changed, 5);
        assert!(view.last_refresh.is_some());
    }

    #[test]
    fn test_first_refresh_counts_everything_added() {
        let mut view = TreeView::new();
        assert_eq!(refresh(&mut view, diamond(T1)), "+5 / Δ0 / -0");
    }
}

mod identity {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cursor_follows_id_into_new_graph() {
        let mut view = loaded_view();
        select(&mut view, "bd-3", Some("bd-1"));

        refresh(&mut view, diamond(T2));

        let row = view.selected_row().unwrap();
        assert_eq!(row.node_id, "bd-3");
        assert_eq!(row.parent_id.as_deref(), Some("bd-1"));
    }

    #[test]
    fn test_new_graph_replaces_old_nodes() {
        let mut view = loaded_view();
        let generation = view.generation();
        select(&mut view, "bd-5", Some("bd-4"));
        view.apply_comment_event(CommentEvent::Loaded {
            generation,
            id: "bd-5".to_string(),
            result: Ok(vec![]),
        });
        assert!(view.graph().get("bd-5").unwrap().comments_loaded);

        refresh(&mut view, diamond(T1));

        assert_eq!(view.generation(), generation + 1);
        assert_eq!(view.selected_row().unwrap().node_id, "bd-5");
        assert!(!view.graph().get("bd-5").unwrap().comments_loaded);
    }

    #[test]
    fn test_cursor_prefers_same_parent_instance() {
        let mut view = loaded_view();
        select(&mut view, "bd-4", Some("bd-3"));
        let before = view.cursor;

        refresh(&mut view, diamond(T2));

        assert_eq!(view.cursor, before);
        assert_eq!(view.selected_row().unwrap().parent_id.as_deref(), Some("bd-3"));
    }

    #[test]
    fn test_missing_cursor_node_falls_back_to_top() {
        let mut view = loaded_view();
        select(&mut view, "bd-3", Some("bd-1"));

        let without_bd3 = records(vec![
            issue_json("bd-1", "Roadmap", &[], T1),
            issue_json("bd-2", "Parser", &["bd-1"], T1),
        ]);
        let graph = Graph::from_records(&without_bd3, SortMode::ById).unwrap();
        let summary = refresh(&mut view, graph);

        assert_eq!(summary, "+0 / Δ0 / -3");
        assert_eq!(view.cursor, 0);
    }
}

mod expansion_transfer {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_collapsed_instance_survives_refresh() {
        let mut view = loaded_view();
        select(&mut view, "bd-4", Some("bd-2"));
        view.collapse_selected();

        refresh(&mut view, diamond(T2));

        assert_eq!(
            row_ids(view.rows()),
            vec![
                "-/bd-1",
                "bd-1/bd-2",
                "bd-2/bd-4",
                "bd-1/bd-3",
                "bd-3/bd-4",
                "bd-4/bd-5",
            ]
        );
        let under_b = &view.rows()[4];
        assert!(view.is_expanded(under_b));
        assert!(!view.is_expanded(&view.rows()[2]));
    }

    #[test]
    fn test_expanded_defaults_are_transferred() {
        let mut view = TreeView::new();
        refresh(&mut view, diamond(T1));
        view.toggle_selected();
        assert_eq!(view.rows().len(), 3);

        refresh(&mut view, diamond(T2));
        assert!(view.graph().get("bd-1").unwrap().expanded);
        assert_eq!(row_ids(view.rows()), vec!["-/bd-1", "bd-1/bd-2", "bd-1/bd-3"]);
    }

    #[test]
    fn test_forced_expanded_under_filter_is_transferred() {
        let mut view = TreeView::new();
        refresh(&mut view, diamond(T1));
        view.set_filter("Shared tokenizer", &mut title_is);
        select(&mut view, "bd-4", Some("bd-2"));
        view.expand_selected();
        assert!(!view.graph().get("bd-4").unwrap().expanded);

        let graph = diamond(T2);
        let digest = graph.digest();
        view.apply_refresh(graph, digest, Utc::now(), &mut title_is);

        let leaf_rows = view.rows().iter().filter(|r| r.node_id == "bd-5").count();
        assert_eq!(leaf_rows, 1);
    }

    #[test]
    fn test_forced_shared_instance_stays_local_after_refresh() {
        let mut view = TreeView::new();
        refresh(&mut view, diamond(T1));
        view.set_filter("Shared tokenizer", &mut title_is);
        select(&mut view, "bd-4", Some("bd-2"));
        view.expand_selected();

        let graph = diamond(T2);
        let digest = graph.digest();
        view.apply_refresh(graph, digest, Utc::now(), &mut title_is);
        view.clear_filter();

        assert!(!view.graph().get("bd-4").unwrap().expanded);
        assert!(view.is_expanded(&TreeRow::new("bd-4", Some("bd-2"), 2)));
        assert!(!view.is_expanded(&TreeRow::new("bd-4", Some("bd-3"), 2)));
    }
}

mod ui_state {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_filter_text_is_reapplied() {
        let mut view = TreeView::new();
        refresh(&mut view, diamond(T1));
        view.set_filter("Leaf task", &mut title_is);

        let graph = diamond(T2);
        let digest = graph.digest();
        view.apply_refresh(graph, digest, Utc::now(), &mut title_is);

        assert_eq!(view.filter().unwrap().text(), "Leaf task");
        assert_eq!(view.rows().iter().filter(|r| r.node_id == "bd-5").count(), 2);
    }

    #[test]
    fn test_scroll_offset_is_clamped_to_new_content() {
        let mut view = loaded_view();
        view.set_viewport_height(2);
        view.goto_bottom();
        assert_eq!(view.scroll_offset, 5);

        let single = records(vec![issue_json("bd-1", "Roadmap", &[], T1)]);
        let graph = Graph::from_records(&single, SortMode::ById).unwrap();
        refresh(&mut view, graph);

        assert_eq!(view.scroll_offset, 0);
        assert_eq!(view.cursor, 0);
    }

    #[test]
    fn test_focus_is_restored() {
        let mut view = loaded_view();
        view.focus = Focus::Detail;
        refresh(&mut view, diamond(T2));
        assert_eq!(view.focus, Focus::Detail);
    }

    #[test]
    fn test_capture_excludes_filter_only_state() {
        let mut view = TreeView::new();
        refresh(&mut view, diamond(T1));
        view.set_filter("Leaf task", &mut title_is);

        let snapshot = view.capture();
        assert!(snapshot.expanded_ids.is_empty());
        assert_eq!(snapshot.filter_text, "Leaf task");
        assert_eq!(snapshot.current_id.as_deref(), Some("bd-1"));
    }
}
