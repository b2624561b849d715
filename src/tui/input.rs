//! Input dispatch layer for Elm Architecture (TEA) pattern.
//!
//! Maps key events to messages based on the current input mode.
//! The `gg` chord is tracked with a non-blocking pending-key state.

use super::{App, Message};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::Instant;

/// Which handler receives keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Tree pane focused
    Tree,
    /// Detail pane focused
    Detail,
    /// Typing a filter query
    Search,
    Help,
    /// Waiting for y/n on a delete
    Confirm,
}

/// Pending first key of a chord (only `gg` today).
#[derive(Debug, Default)]
pub struct InputState {
    pub pending: Option<KeyCode>,
    pub pending_since: Option<Instant>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if there's a pending chord that has timed out (500ms).
    pub fn has_timed_out(&self) -> bool {
        self.pending_since
            .is_some_and(|since| since.elapsed().as_millis() > 500)
    }

    pub fn clear(&mut self) {
        self.pending = None;
        self.pending_since = None;
    }

    pub fn set_pending(&mut self, key: KeyCode) {
        self.pending = Some(key);
        self.pending_since = Some(Instant::now());
    }
}

pub fn dispatch(app: &App, input: &mut InputState, key: KeyEvent) -> Message {
    dispatch_mode(app.input_mode(), input, key)
}

fn dispatch_mode(mode: InputMode, input: &mut InputState, key: KeyEvent) -> Message {
    if let Some(pending) = input.pending.take() {
        input.pending_since = None;
        return handle_chord(pending, key.code);
    }

    match mode {
        InputMode::Search => dispatch_search_mode(key),
        InputMode::Help => dispatch_help_modal(key),
        InputMode::Confirm => dispatch_confirm(key),
        InputMode::Detail => dispatch_detail_pane(key),
        InputMode::Tree => dispatch_tree(input, key),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Mode-specific dispatch functions
// ─────────────────────────────────────────────────────────────────────────────

fn dispatch_tree(input: &mut InputState, key: KeyEvent) -> Message {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('q') => Message::Quit,
        KeyCode::Char('c') if ctrl => Message::Quit,
        KeyCode::Char('d') if ctrl => Message::PageDown,
        KeyCode::Char('u') if ctrl => Message::PageUp,
        KeyCode::Char('j') | KeyCode::Down => Message::MoveDown,
        KeyCode::Char('k') | KeyCode::Up => Message::MoveUp,
        KeyCode::PageDown => Message::PageDown,
        KeyCode::PageUp => Message::PageUp,
        KeyCode::Char('G') | KeyCode::End => Message::GotoBottom,
        KeyCode::Home => Message::GotoTop,
        KeyCode::Char('g') => {
            input.set_pending(KeyCode::Char('g'));
            Message::None
        }
        KeyCode::Char('h') | KeyCode::Left => Message::Collapse,
        KeyCode::Char('l') | KeyCode::Right => Message::Expand,
        KeyCode::Enter | KeyCode::Char(' ') => Message::ToggleExpand,
        KeyCode::Char('p') => Message::GotoParent,
        KeyCode::Char('E') => Message::ExpandAll,
        KeyCode::Char('C') => Message::CollapseAll,
        KeyCode::Char('/') => Message::EnterSearch,
        KeyCode::Esc => Message::ClearFilter,
        KeyCode::Char('s') => Message::CycleSortMode,
        KeyCode::Char('r') => Message::Refresh,
        KeyCode::Char('D') => Message::RequestDelete,
        KeyCode::Tab => Message::SwitchFocus,
        KeyCode::Char('?') => Message::ToggleHelp,
        _ => Message::None,
    }
}

fn dispatch_detail_pane(key: KeyEvent) -> Message {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('q') => Message::Quit,
        KeyCode::Char('c') if ctrl => Message::Quit,
        KeyCode::Char('d') if ctrl => Message::ScrollDetail(10),
        KeyCode::Char('u') if ctrl => Message::ScrollDetail(-10),
        KeyCode::Char('j') | KeyCode::Down => Message::ScrollDetail(1),
        KeyCode::Char('k') | KeyCode::Up => Message::ScrollDetail(-1),
        KeyCode::Tab | KeyCode::Esc | KeyCode::Char('h') => Message::SwitchFocus,
        KeyCode::Char('r') => Message::Refresh,
        KeyCode::Char('?') => Message::ToggleHelp,
        _ => Message::None,
    }
}

fn dispatch_search_mode(key: KeyEvent) -> Message {
    match key.code {
        KeyCode::Esc => Message::ExitSearch,
        KeyCode::Enter => Message::ConfirmSearch,
        KeyCode::Backspace => Message::SearchBackspace,
        KeyCode::Char(c) => Message::SearchInput(c),
        _ => Message::None,
    }
}

fn dispatch_help_modal(key: KeyEvent) -> Message {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => Message::CloseModal,
        _ => Message::None,
    }
}

fn dispatch_confirm(key: KeyEvent) -> Message {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => Message::ConfirmDelete,
        _ => Message::CloseModal,
    }
}

fn handle_chord(first: KeyCode, second: KeyCode) -> Message {
    match (first, second) {
        (KeyCode::Char('g'), KeyCode::Char('g')) => Message::GotoTop,
        _ => Message::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventKind, KeyEventState};

    fn key_event(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::empty(),
            kind: KeyEventKind::Press,
            state: KeyEventState::empty(),
        }
    }

    fn key_event_ctrl(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::CONTROL,
            kind: KeyEventKind::Press,
            state: KeyEventState::empty(),
        }
    }

    #[test]
    fn test_tree_navigation() {
        let mut input = InputState::new();
        let tree = |input: &mut InputState, code| dispatch_mode(InputMode::Tree, input, key_event(code));

        assert_eq!(tree(&mut input, KeyCode::Char('j')), Message::MoveDown);
        assert_eq!(tree(&mut input, KeyCode::Char('k')), Message::MoveUp);
        assert_eq!(tree(&mut input, KeyCode::Char('l')), Message::Expand);
        assert_eq!(tree(&mut input, KeyCode::Char('h')), Message::Collapse);
        assert_eq!(tree(&mut input, KeyCode::Enter), Message::ToggleExpand);
    }

    #[test]
    fn test_page_navigation() {
        let mut input = InputState::new();
        assert_eq!(
            dispatch_mode(InputMode::Tree, &mut input, key_event_ctrl(KeyCode::Char('d'))),
            Message::PageDown
        );
        assert_eq!(
            dispatch_mode(InputMode::Tree, &mut input, key_event_ctrl(KeyCode::Char('u'))),
            Message::PageUp
        );
    }

    #[test]
    fn test_gg_chord() {
        let mut input = InputState::new();
        let first = dispatch_mode(InputMode::Tree, &mut input, key_event(KeyCode::Char('g')));
        assert_eq!(first, Message::None);
        assert_eq!(input.pending, Some(KeyCode::Char('g')));

        let second = dispatch_mode(InputMode::Tree, &mut input, key_event(KeyCode::Char('g')));
        assert_eq!(second, Message::GotoTop);
        assert!(input.pending.is_none());
    }

    #[test]
    fn test_search_mode_captures_letters() {
        let mut input = InputState::new();
        assert_eq!(
            dispatch_mode(InputMode::Search, &mut input, key_event(KeyCode::Char('q'))),
            Message::SearchInput('q')
        );
        assert_eq!(
            dispatch_mode(InputMode::Search, &mut input, key_event(KeyCode::Esc)),
            Message::ExitSearch
        );
    }

    #[test]
    fn test_confirm_only_accepts_y() {
        let mut input = InputState::new();
        assert_eq!(
            dispatch_mode(InputMode::Confirm, &mut input, key_event(KeyCode::Char('y'))),
            Message::ConfirmDelete
        );
        assert_eq!(
            dispatch_mode(InputMode::Confirm, &mut input, key_event(KeyCode::Char('n'))),
            Message::CloseModal
        );
    }

    #[test]
    fn test_input_state_timeout() {
        let mut input = InputState::new();
        assert!(!input.has_timed_out());
        input.set_pending(KeyCode::Char('g'));
        assert!(!input.has_timed_out());
        input.clear();
        assert!(input.pending_since.is_none());
    }
}
