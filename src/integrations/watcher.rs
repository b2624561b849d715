//! File watcher for the `.beads/` directory.
//!
//! `bd` rewrites its database and JSONL export on every change, which shows
//! up as a burst of notify events. `poll` drains the burst and reports a
//! single change so the app triggers one refresh per burst.
//!
//! Reading the database also touches SQLite's `-wal`/`-shm`/`-journal`
//! files, and the daemon keeps lock, socket and log files here. Events on
//! those are ignored, otherwise our own `bd list` would trigger the next one.

use anyhow::{Context, Result};
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::time::Duration;

pub struct BeadsWatcher {
    _watcher: RecommendedWatcher,
    receiver: Receiver<notify::Result<Event>>,
}

impl BeadsWatcher {
    pub fn new(dir: &Path) -> Result<Self> {
        let (tx, rx) = channel();

        let mut watcher = RecommendedWatcher::new(
            move |res| {
                let _ = tx.send(res);
            },
            Config::default().with_poll_interval(Duration::from_secs(1)),
        )?;

        watcher
            .watch(dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch {}", dir.display()))?;

        Ok(Self {
            _watcher: watcher,
            receiver: rx,
        })
    }

    /// True if anything changed since the last poll.
    pub fn poll(&self) -> bool {
        let mut changed = false;

        loop {
            match self.receiver.try_recv() {
                Ok(Ok(event)) => {
                    if is_relevant(&event) {
                        changed = true;
                    }
                }
                Ok(Err(e)) => {
                    tracing::debug!("watch error: {}", e);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }

        changed
    }
}

/// True for events that can change what `bd list` reports.
fn is_relevant(event: &Event) -> bool {
    if event.kind.is_access() {
        return false;
    }
    // Path-less events (rescans, overflow) count as changes
    event.paths.is_empty() || event.paths.iter().any(|p| !is_bookkeeping(p))
}

fn is_bookkeeping(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    const SUFFIXES: &[&str] = &["-wal", "-shm", "-journal", ".lock", ".sock", ".log"];
    SUFFIXES.iter().any(|s| name.ends_with(s))
}
