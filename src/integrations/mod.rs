pub mod bd;
pub mod watcher;

pub use bd::BdClient;
pub use watcher::BeadsWatcher;

use crate::data::SortMode;
use crate::tui::RefreshResult;
use crate::util::send_or_log;
use tokio::sync::mpsc;

/// Fetch the issue tree and report the outcome on `tx` (one message).
pub async fn fetch_tree_background(
    client: BdClient,
    sort_mode: SortMode,
    tx: mpsc::Sender<RefreshResult>,
) {
    let result = match client.fetch_tree(sort_mode).await {
        Ok((graph, digest)) => RefreshResult::Complete { graph, digest },
        Err(e) => {
            tracing::error!("Failed to fetch issue tree: {:#}", e);
            RefreshResult::Error(format!("{:#}", e))
        }
    };
    send_or_log(&tx, result, "refresh result").await;
}
