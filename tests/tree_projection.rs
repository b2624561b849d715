//! Row projection and per-instance expansion over multi-parent issues.

mod test_utils;

use beadscope::data::Graph;
use beadscope::tree::{project, ExpansionStore, InstanceKey, TreeRow};
use test_utils::{expanded_node, row_ids};

/// p1, p2, p3 are roots that all contain `s`; `s` has child `c`.
fn three_parents() -> Graph {
    let mut graph = Graph::new();
    for id in ["p1", "p2", "p3", "s", "c"] {
        graph.insert(expanded_node(id));
    }
    for parent in ["p1", "p2", "p3"] {
        graph.link(parent, "s");
    }
    graph.link("s", "c");
    graph
}

mod row_duplication {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_shared_node_appears_once_per_parent() {
        let graph = three_parents();
        let rows = project(&graph, &ExpansionStore::new(), None);

        let shared: Vec<&TreeRow> = rows.iter().filter(|r| r.node_id == "s").collect();
        assert_eq!(shared.len(), 3);

        let mut parents: Vec<&str> = shared.iter().filter_map(|r| r.parent_id.as_deref()).collect();
        parents.sort();
        parents.dedup();
        assert_eq!(parents, vec!["p1", "p2", "p3"]);
    }

    #[test]
    fn test_collapsed_parent_hides_its_occurrence_only() {
        let mut graph = three_parents();
        graph.get_mut("p2").unwrap().expanded = false;
        let rows = project(&graph, &ExpansionStore::new(), None);

        assert_eq!(
            row_ids(&rows),
            vec!["-/p1", "p1/s", "s/c", "-/p2", "-/p3", "p3/s", "s/c"]
        );
    }

    #[test]
    fn test_depth_follows_nesting() {
        let graph = three_parents();
        let rows = project(&graph, &ExpansionStore::new(), None);
        let depths: Vec<usize> = rows.iter().take(3).map(|r| r.depth).collect();
        assert_eq!(depths, vec![0, 1, 2]);
    }
}

mod instance_independence {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_collapsing_one_instance_leaves_the_others() {
        let parents = ["p1", "p2", "p3"];
        for collapsed in parents {
            let mut graph = three_parents();
            let mut store = ExpansionStore::new();
            let row = TreeRow::new("s", Some(collapsed), 1);

            store.collapse(&mut graph, &row, false);

            for other in parents {
                let other_row = TreeRow::new("s", Some(other), 1);
                assert_eq!(
                    store.is_expanded(&graph, &other_row, None),
                    other != collapsed,
                    "collapsing under {} affected the occurrence under {}",
                    collapsed,
                    other
                );
            }
        }
    }

    #[test]
    fn test_collapsed_instance_hides_only_its_children() {
        let mut graph = three_parents();
        let mut store = ExpansionStore::new();
        store.collapse(&mut graph, &TreeRow::new("s", Some("p2"), 1), false);

        let rows = project(&graph, &store, None);
        assert_eq!(
            row_ids(&rows),
            vec!["-/p1", "p1/s", "s/c", "-/p2", "p2/s", "-/p3", "p3/s", "s/c"]
        );
    }

    #[test]
    fn test_collapse_twice_is_idempotent() {
        let mut graph = three_parents();
        let mut store = ExpansionStore::new();
        let row = TreeRow::new("s", Some("p1"), 1);
        let key = InstanceKey::for_row(&row);

        store.collapse(&mut graph, &row, false);
        let rows_once = project(&graph, &store, None);
        let state_once = store.instance_override(&key);

        store.collapse(&mut graph, &row, false);
        assert_eq!(store.instance_override(&key), state_once);
        assert_eq!(project(&graph, &store, None), rows_once);
        assert!(graph.get("s").unwrap().expanded);
    }
}
