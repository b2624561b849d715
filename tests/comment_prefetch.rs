//! Bounded comment prefetch and delivery back into the view.

mod test_utils;

use beadscope::data::{Comment, Graph, Node};
use beadscope::tree::{spawn_preload, CommentEvent, TreeView};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use test_utils::{diamond, T1};
use tokio::sync::mpsc;

fn wide_graph(n: usize) -> Graph {
    let mut graph = Graph::new();
    for i in 0..n {
        graph.insert(Node::new(format!("bd-{}", i), format!("Issue {}", i)));
    }
    graph
}

/// Apply events until the run reports completion.
async fn drain(view: &mut TreeView, rx: &mut mpsc::Receiver<CommentEvent>) -> usize {
    let mut loaded = 0;
    while let Some(event) = rx.recv().await {
        let finished = matches!(event, CommentEvent::Finished { .. });
        if matches!(event, CommentEvent::Loaded { .. }) {
            loaded += 1;
        }
        view.apply_comment_event(event);
        if finished {
            break;
        }
    }
    loaded
}

#[tokio::test]
async fn test_concurrency_never_exceeds_ceiling() {
    const CEILING: usize = 4;
    let view_graph = wide_graph(24);
    let mut view = TreeView::from_graph(view_graph.clone());

    let in_flight = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let fetch = {
        let in_flight = Arc::clone(&in_flight);
        let peak = Arc::clone(&peak);
        move |_id: String| {
            let in_flight = Arc::clone(&in_flight);
            let peak = Arc::clone(&peak);
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                Ok::<_, anyhow::Error>(Vec::<Comment>::new())
            }
        }
    };

    let (tx, mut rx) = mpsc::channel(64);
    let task = spawn_preload(&view_graph, view.generation(), fetch, CEILING, tx);
    let loaded = drain(&mut view, &mut rx).await;
    task.await.unwrap();

    assert_eq!(loaded, 24, "every queued fetch must complete");
    let peak = peak.load(Ordering::SeqCst);
    assert!(peak <= CEILING, "peak {} exceeded ceiling {}", peak, CEILING);
    assert!(view.graph().nodes().all(|n| n.comments_loaded));
}

#[tokio::test]
async fn test_shared_node_is_fetched_once() {
    let graph = diamond(T1);
    let mut view = TreeView::from_graph(graph.clone());
    let calls: Arc<Mutex<HashMap<String, usize>>> = Arc::default();

    let fetch = {
        let calls = Arc::clone(&calls);
        move |id: String| {
            *calls.lock().unwrap().entry(id.clone()).or_default() += 1;
            async move {
                Ok::<_, anyhow::Error>(vec![Comment {
                    id: 1,
                    author: "ana".to_string(),
                    text: format!("note on {}", id),
                    created_at: Utc::now(),
                }])
            }
        }
    };

    let (tx, mut rx) = mpsc::channel(16);
    spawn_preload(&graph, view.generation(), fetch, 2, tx);
    drain(&mut view, &mut rx).await;

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 5);
    assert!(calls.values().all(|&n| n == 1));

    let shared = view.graph().get("bd-4").unwrap();
    assert!(shared.comments_loaded);
    assert_eq!(shared.comments[0].text, "note on bd-4");
}

#[tokio::test]
async fn test_failed_fetch_marks_node_unavailable() {
    let graph = diamond(T1);
    let mut view = TreeView::from_graph(graph.clone());

    let fetch = |id: String| async move {
        if id == "bd-3" {
            anyhow::bail!("bd comments exited with status 1");
        }
        Ok::<Vec<Comment>, anyhow::Error>(Vec::new())
    };

    let (tx, mut rx) = mpsc::channel(16);
    spawn_preload(&graph, view.generation(), fetch, 3, tx);
    let loaded = drain(&mut view, &mut rx).await;

    assert_eq!(loaded, 5);
    let failed = view.graph().get("bd-3").unwrap();
    assert!(failed.comments_loaded);
    assert!(failed.comments.is_empty());
    assert!(failed.comments_error.as_deref().unwrap().contains("status 1"));
    assert!(view.graph().get("bd-4").unwrap().comments_error.is_none());
}

#[tokio::test]
async fn test_results_from_superseded_refresh_are_ignored() {
    let graph = diamond(T1);
    let mut view = TreeView::from_graph(graph.clone());
    let stale_generation = view.generation();

    let fresh = diamond(T1);
    let digest = fresh.digest();
    view.apply_refresh(fresh, digest, Utc::now(), &mut test_utils::no_match);

    let (tx, mut rx) = mpsc::channel(16);
    spawn_preload(&graph, stale_generation, |_id: String| async { Ok::<Vec<Comment>, anyhow::Error>(Vec::new()) }, 2, tx);
    drain(&mut view, &mut rx).await;

    assert!(view.graph().nodes().all(|n| !n.comments_loaded));
}
