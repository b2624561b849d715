//! Small helpers shared by background tasks.

use tokio::sync::mpsc;

/// Send on a channel whose receiver may already be gone.
///
/// Background tasks (tree fetch, comment prefetch, deletes) can outlive the
/// control loop on shutdown; a closed channel is logged, not an error.
pub async fn send_or_log<T>(tx: &mpsc::Sender<T>, value: T, context: &str) {
    if let Err(e) = tx.send(value).await {
        tracing::warn!("Failed to send {}: {}", context, e);
    }
}
