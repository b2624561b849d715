//! Background comment loading.
//!
//! Fetches run concurrently up to a fixed ceiling, but results are never
//! written into the graph from the workers. Each completion is sent as a
//! `CommentEvent` to the control loop, which applies it via
//! `TreeView::apply_comment_event`.

use crate::data::{Comment, Graph};
use crate::util::send_or_log;
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::future::Future;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Default ceiling on simultaneous comment fetches
pub const DEFAULT_MAX_CONCURRENT: usize = 8;

#[derive(Debug, Clone, PartialEq)]
pub enum CommentEvent {
    /// One issue finished loading (successfully or not)
    Loaded {
        generation: u64,
        id: String,
        result: Result<Vec<Comment>, String>,
    },
    /// Every queued issue has reported
    Finished { generation: u64, total: usize },
}

impl CommentEvent {
    pub fn generation(&self) -> u64 {
        match self {
            Self::Loaded { generation, .. } | Self::Finished { generation, .. } => *generation,
        }
    }
}

/// Fetch comments for each unique ID with at most `max_concurrent` calls in
/// flight, reporting every result on `tx`.
///
/// Excess IDs wait for a free slot; none are dropped. A failed fetch is
/// reported as an error result and does not stop the others.
pub async fn preload_all<F, Fut>(
    ids: Vec<String>,
    generation: u64,
    fetch: F,
    max_concurrent: usize,
    tx: mpsc::Sender<CommentEvent>,
) where
    F: Fn(String) -> Fut,
    Fut: Future<Output = anyhow::Result<Vec<Comment>>>,
{
    let mut seen = HashSet::new();
    let ids: Vec<String> = ids.into_iter().filter(|id| seen.insert(id.clone())).collect();
    let total = ids.len();
    let limit = max_concurrent.max(1);

    tracing::debug!(total, limit, generation, "prefetching comments");

    stream::iter(ids)
        .map(|id| {
            let pending = fetch(id.clone());
            async move { (id, pending.await) }
        })
        .buffer_unordered(limit)
        .for_each(|(id, result)| {
            let tx = tx.clone();
            async move {
                let result = result.map_err(|e| {
                    tracing::debug!("Failed to load comments for {}: {:#}", id, e);
                    format!("{:#}", e)
                });
                send_or_log(
                    &tx,
                    CommentEvent::Loaded {
                        generation,
                        id,
                        result,
                    },
                    "comment result",
                )
                .await;
            }
        })
        .await;

    send_or_log(&tx, CommentEvent::Finished { generation, total }, "comment completion").await;
}

/// Spawn `preload_all` over every node reachable in `graph`.
pub fn spawn_preload<F, Fut>(
    graph: &Graph,
    generation: u64,
    fetch: F,
    max_concurrent: usize,
    tx: mpsc::Sender<CommentEvent>,
) -> JoinHandle<()>
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<Vec<Comment>>> + Send + 'static,
{
    let ids = graph.unique_ids();
    tokio::spawn(preload_all(ids, generation, fetch, max_concurrent, tx))
}
