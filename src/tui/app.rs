use super::input::InputMode;
use super::message::Message;
use crate::config::Config;
use crate::data::{Digest, Graph, SortMode};
use crate::integrations::{self, BdClient, BeadsWatcher};
use crate::tree::{prefetch, CommentEvent, TreeView};
use crate::tui::search::FuzzySearch;
use crate::util::send_or_log;
use anyhow::Result;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Braille spinner frames for loading animation
pub const SPINNER_FRAMES: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// Result from the background tree fetch
#[derive(Debug)]
pub enum RefreshResult {
    Complete { graph: Graph, digest: Digest },
    Error(String),
}

/// Outcome of a write issued through `bd`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionResult {
    Deleted(String),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ModalState {
    #[default]
    None,
    Help,
    ConfirmDelete { id: String },
}

/// Comment prefetch progress for the current generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefetchProgress {
    pub loaded: usize,
    pub total: usize,
}

pub struct App {
    pub config: Arc<Config>,
    pub client: BdClient,
    pub view: TreeView,
    pub sort_mode: SortMode,
    pub modal: ModalState,

    // Search state
    pub search_mode: bool,
    pub search_query: String,
    search: FuzzySearch,

    // UI state
    pub detail_scroll: u16,
    pub status_message: Option<String>,
    pub error_message: Option<String>,
    pub spinner_frame: usize,
    pub prefetch_progress: Option<PrefetchProgress>,

    /// Receiver for the in-flight tree fetch, if any
    pub refresh_rx: Option<mpsc::Receiver<RefreshResult>>,
    comment_tx: mpsc::Sender<CommentEvent>,
    comment_rx: mpsc::Receiver<CommentEvent>,
    action_tx: mpsc::Sender<ActionResult>,
    action_rx: mpsc::Receiver<ActionResult>,
    prefetch_task: Option<JoinHandle<()>>,
    /// On-demand comment fetches in flight (prefetch disabled)
    comment_requests: HashSet<String>,
    /// A refresh was asked for while another fetch was running
    refresh_queued: bool,
    watcher: Option<BeadsWatcher>,
    last_refresh_started: Instant,
}

impl App {
    pub fn new(config: Config, client: BdClient) -> Self {
        let watcher = if config.polling.watch_files {
            let dir = client.beads_dir();
            match BeadsWatcher::new(&dir) {
                Ok(w) => Some(w),
                Err(e) => {
                    tracing::warn!("File watching disabled: {:#}", e);
                    None
                }
            }
        } else {
            None
        };

        let (comment_tx, comment_rx) = mpsc::channel(256);
        let (action_tx, action_rx) = mpsc::channel(16);

        Self {
            sort_mode: config.ui.sort_mode,
            config: Arc::new(config),
            client,
            view: TreeView::new(),
            modal: ModalState::None,
            search_mode: false,
            search_query: String::new(),
            search: FuzzySearch::new(),
            detail_scroll: 0,
            status_message: None,
            error_message: None,
            spinner_frame: 0,
            prefetch_progress: None,
            refresh_rx: None,
            comment_tx,
            comment_rx,
            action_tx,
            action_rx,
            prefetch_task: None,
            comment_requests: HashSet::new(),
            refresh_queued: false,
            watcher,
            last_refresh_started: Instant::now(),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.refresh_rx.is_some()
    }

    pub fn input_mode(&self) -> InputMode {
        match self.modal {
            ModalState::Help => InputMode::Help,
            ModalState::ConfirmDelete { .. } => InputMode::Confirm,
            ModalState::None if self.search_mode => InputMode::Search,
            ModalState::None => match self.view.focus {
                crate::tree::Focus::Detail => InputMode::Detail,
                crate::tree::Focus::Tree => InputMode::Tree,
            },
        }
    }

    /// Process a message. Returns true when the app should quit.
    pub async fn update(&mut self, msg: Message) -> Result<bool> {
        let before = self.view.selected_row().cloned();

        match msg {
            Message::Quit => return Ok(true),
            Message::Refresh => self.start_background_refresh(),

            // ─────────────────────────────────────────────────────────────────
            // Navigation
            // ─────────────────────────────────────────────────────────────────
            Message::MoveUp => self.view.move_cursor(-1),
            Message::MoveDown => self.view.move_cursor(1),
            Message::GotoTop => self.view.goto_top(),
            Message::GotoBottom => self.view.goto_bottom(),
            Message::PageUp => self.view.page_up(),
            Message::PageDown => self.view.page_down(),
            Message::GotoParent => {
                self.view.goto_parent();
            }
            Message::SwitchFocus => self.view.focus = self.view.focus.toggle(),
            Message::ScrollDetail(delta) => {
                self.detail_scroll = (self.detail_scroll as i32 + delta).clamp(0, u16::MAX as i32) as u16;
            }

            // ─────────────────────────────────────────────────────────────────
            // Expansion
            // ─────────────────────────────────────────────────────────────────
            Message::Expand => self.view.expand_selected(),
            Message::Collapse => self.view.collapse_selected(),
            Message::ToggleExpand => self.view.toggle_selected(),
            Message::ExpandAll => self.view.expand_all(),
            Message::CollapseAll => self.view.collapse_all(),

            // ─────────────────────────────────────────────────────────────────
            // Search
            // ─────────────────────────────────────────────────────────────────
            Message::EnterSearch => {
                self.search_mode = true;
                self.search_query = self
                    .view
                    .filter()
                    .map(|f| f.text().to_string())
                    .unwrap_or_default();
            }
            Message::SearchInput(c) => {
                self.search_query.push(c);
                self.apply_search();
            }
            Message::SearchBackspace => {
                self.search_query.pop();
                self.apply_search();
            }
            Message::ConfirmSearch => self.search_mode = false,
            Message::ExitSearch | Message::ClearFilter => {
                self.search_mode = false;
                self.search_query.clear();
                self.view.clear_filter();
            }

            Message::CycleSortMode => {
                self.sort_mode = self.sort_mode.next();
                self.status_message = Some(format!("Sort: {}", self.sort_mode.label()));
                // A fetch already running uses the old order
                if self.is_loading() {
                    self.refresh_queued = true;
                } else {
                    self.start_background_refresh();
                }
            }

            // ─────────────────────────────────────────────────────────────────
            // Deletion
            // ─────────────────────────────────────────────────────────────────
            Message::RequestDelete => {
                if let Some(node) = self.view.selected_node() {
                    self.modal = ModalState::ConfirmDelete {
                        id: node.id.clone(),
                    };
                }
            }
            Message::ConfirmDelete => {
                if let ModalState::ConfirmDelete { id } = std::mem::take(&mut self.modal) {
                    self.start_delete(id);
                }
            }

            Message::ToggleHelp => {
                self.modal = match self.modal {
                    ModalState::Help => ModalState::None,
                    _ => ModalState::Help,
                };
            }
            Message::CloseModal => self.modal = ModalState::None,

            Message::None => {}
        }

        if self.view.selected_row() != before.as_ref() {
            self.detail_scroll = 0;
        }
        self.load_selected_comments();
        Ok(false)
    }

    fn apply_search(&mut self) {
        self.view.set_filter(&self.search_query, &mut self.search);
    }

    /// Advance spinner frame (call on tick while loading)
    pub fn tick_spinner(&mut self) {
        if self.is_loading() || self.prefetch_progress.is_some() {
            self.spinner_frame = (self.spinner_frame + 1) % SPINNER_FRAMES.len();
        }
    }

    pub fn spinner_char(&self) -> char {
        SPINNER_FRAMES[self.spinner_frame]
    }

    /// Periodic work: spinner, file-change and timer driven refreshes.
    pub fn on_tick(&mut self) {
        self.tick_spinner();

        let files_changed = self.watcher.as_ref().is_some_and(BeadsWatcher::poll);
        if files_changed {
            tracing::debug!("beads directory changed, refreshing");
            self.start_background_refresh();
            return;
        }

        let interval = self.config.polling.refresh_interval_secs;
        if interval > 0 && self.last_refresh_started.elapsed() >= Duration::from_secs(interval) {
            self.start_background_refresh();
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Refresh
    // ─────────────────────────────────────────────────────────────────────────

    /// Start a tree fetch in the background (no-op while one is running).
    pub fn start_background_refresh(&mut self) {
        if self.refresh_rx.is_some() {
            return;
        }

        let (tx, rx) = mpsc::channel(1);
        self.refresh_rx = Some(rx);
        self.last_refresh_started = Instant::now();

        let client = self.client.clone();
        tokio::spawn(integrations::fetch_tree_background(client, self.sort_mode, tx));
    }

    /// Poll for the refresh result (non-blocking, call from event loop tick)
    pub fn poll_refresh(&mut self) -> bool {
        let Some(mut rx) = self.refresh_rx.take() else {
            return false;
        };

        match rx.try_recv() {
            Ok(result) => self.handle_refresh_result(result),
            Err(mpsc::error::TryRecvError::Empty) => {
                self.refresh_rx = Some(rx);
                return false;
            }
            Err(mpsc::error::TryRecvError::Disconnected) => {
                self.error_message = Some("Refresh failed: fetch task ended unexpectedly".to_string());
            }
        }

        if std::mem::take(&mut self.refresh_queued) {
            self.start_background_refresh();
        }
        true
    }

    pub fn handle_refresh_result(&mut self, result: RefreshResult) {
        match result {
            RefreshResult::Complete { graph, digest } => {
                let first_load = self.view.last_refresh.is_none();
                let summary = self
                    .view
                    .apply_refresh(graph, digest, Utc::now(), &mut self.search);
                if first_load && self.config.ui.expand_roots {
                    self.view.expand_roots();
                }

                self.error_message = None;
                self.status_message = Some(format!("Refreshed {}", summary));
                self.comment_requests.clear();
                self.start_prefetch();
                self.load_selected_comments();
            }
            RefreshResult::Error(msg) => {
                // The previous view stays as it was
                self.error_message = Some(format!("Refresh failed: {}", msg));
            }
        }
    }

    fn start_prefetch(&mut self) {
        if !self.config.prefetch.enabled {
            return;
        }
        if let Some(task) = self.prefetch_task.take() {
            task.abort();
        }

        let client = self.client.clone();
        let fetch = move |id: String| {
            let client = client.clone();
            async move { client.fetch_comments(&id).await }
        };

        self.prefetch_progress = Some(PrefetchProgress {
            loaded: 0,
            total: self.view.graph().unique_ids().len(),
        });
        self.prefetch_task = Some(prefetch::spawn_preload(
            self.view.graph(),
            self.view.generation(),
            fetch,
            self.config.prefetch.max_concurrent,
            self.comment_tx.clone(),
        ));
    }

    /// Fetch comments for the selected issue when prefetch is off.
    fn load_selected_comments(&mut self) {
        if self.config.prefetch.enabled {
            return;
        }
        let Some(node) = self.view.selected_node() else {
            return;
        };
        if node.comments_loaded || self.comment_requests.contains(&node.id) {
            return;
        }

        let id = node.id.clone();
        self.comment_requests.insert(id.clone());

        let client = self.client.clone();
        let tx = self.comment_tx.clone();
        let generation = self.view.generation();
        tokio::spawn(async move {
            let result = client.fetch_comments(&id).await.map_err(|e| format!("{:#}", e));
            let event = CommentEvent::Loaded {
                generation,
                id,
                result,
            };
            send_or_log(&tx, event, "comment result").await;
        });
    }

    /// Apply every queued comment result. Returns true if any were applied.
    pub fn poll_comments(&mut self) -> bool {
        let mut applied = false;
        while let Ok(event) = self.comment_rx.try_recv() {
            applied |= self.handle_comment_event(event);
        }
        applied
    }

    pub fn handle_comment_event(&mut self, event: CommentEvent) -> bool {
        if event.generation() == self.view.generation() {
            match &event {
                CommentEvent::Loaded { id, .. } => {
                    self.comment_requests.remove(id);
                    if let Some(progress) = &mut self.prefetch_progress {
                        progress.loaded += 1;
                    }
                }
                CommentEvent::Finished { total, .. } => {
                    tracing::debug!(total, "comment prefetch finished");
                    self.prefetch_progress = None;
                    self.prefetch_task = None;
                }
            }
        }
        self.view.apply_comment_event(event)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Deletion
    // ─────────────────────────────────────────────────────────────────────────

    fn start_delete(&mut self, id: String) {
        let client = self.client.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let result = match client.delete_issue(&id).await {
                Ok(()) => ActionResult::Deleted(id),
                Err(e) => ActionResult::Failed(format!("Delete {} failed: {:#}", id, e)),
            };
            send_or_log(&tx, result, "delete result").await;
        });
    }

    pub fn poll_actions(&mut self) -> bool {
        let mut handled = false;
        while let Ok(result) = self.action_rx.try_recv() {
            self.handle_action_result(result);
            handled = true;
        }
        handled
    }

    pub fn handle_action_result(&mut self, result: ActionResult) {
        match result {
            ActionResult::Deleted(id) => {
                // The digest keeps the old entry, so the next refresh reports it as removed
                self.view.remove_node(&id);
                self.status_message = Some(format!("Deleted {}", id));
            }
            ActionResult::Failed(msg) => {
                tracing::warn!("{}", msg);
                self.error_message = Some(msg);
            }
        }
    }
}
