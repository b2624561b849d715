//! Message enum for Elm Architecture (TEA) pattern.
//!
//! Every user action is a message; `App::update()` is the only place the
//! tree view is mutated in response to input.

/// All possible user actions in the application.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    // ─────────────────────────────────────────────────────────────────────────
    // App lifecycle
    // ─────────────────────────────────────────────────────────────────────────
    Quit,
    /// Start a background refresh of the issue tree
    Refresh,

    // ─────────────────────────────────────────────────────────────────────────
    // Navigation
    // ─────────────────────────────────────────────────────────────────────────
    MoveUp,
    MoveDown,
    GotoTop,
    GotoBottom,
    /// Half a screen up
    PageUp,
    /// Half a screen down
    PageDown,
    GotoParent,
    /// Switch between the tree and the detail pane
    SwitchFocus,
    /// Scroll the detail pane by n lines
    ScrollDetail(i32),

    // ─────────────────────────────────────────────────────────────────────────
    // Expansion
    // ─────────────────────────────────────────────────────────────────────────
    Expand,
    Collapse,
    ToggleExpand,
    ExpandAll,
    CollapseAll,

    // ─────────────────────────────────────────────────────────────────────────
    // Filter
    // ─────────────────────────────────────────────────────────────────────────
    EnterSearch,
    /// Leave search input and drop the filter
    ExitSearch,
    /// Leave search input, keeping the filter applied
    ConfirmSearch,
    SearchInput(char),
    SearchBackspace,
    ClearFilter,

    // ─────────────────────────────────────────────────────────────────────────
    // Sorting
    // ─────────────────────────────────────────────────────────────────────────
    CycleSortMode,

    // ─────────────────────────────────────────────────────────────────────────
    // Deletion
    // ─────────────────────────────────────────────────────────────────────────
    /// Ask for confirmation before deleting the selected issue
    RequestDelete,
    ConfirmDelete,

    // ─────────────────────────────────────────────────────────────────────────
    // Modals
    // ─────────────────────────────────────────────────────────────────────────
    ToggleHelp,
    CloseModal,

    None,
}
