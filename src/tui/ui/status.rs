//! Status configuration, status bar and popups.

use super::icons;
use super::layout::popup_rect;
use crate::data::{BeadPriority, BeadStatus};
use crate::tui::app::ModalState;
use crate::tui::App;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Icon and style for a value shown in the tree.
pub struct StatusConfig {
    pub icon: &'static str,
    pub style: Style,
}

pub trait StatusConfigurable {
    fn status_config(&self) -> StatusConfig;
}

impl StatusConfigurable for BeadStatus {
    fn status_config(&self) -> StatusConfig {
        let (icon, color) = match self {
            BeadStatus::Open => (icons::STATUS_OPEN, Color::Cyan),
            BeadStatus::InProgress => (icons::STATUS_IN_PROGRESS, Color::Green),
            BeadStatus::Blocked => (icons::STATUS_BLOCKED, Color::Red),
            BeadStatus::Deferred => (icons::STATUS_DEFERRED, Color::DarkGray),
            BeadStatus::Closed => (icons::STATUS_CLOSED, Color::Magenta),
            BeadStatus::Unknown => (icons::STATUS_UNKNOWN, Color::DarkGray),
        };
        StatusConfig {
            icon,
            style: Style::default().fg(color),
        }
    }
}

impl StatusConfigurable for BeadPriority {
    fn status_config(&self) -> StatusConfig {
        let style = match self {
            BeadPriority::Critical => Style::default()
                .fg(Color::Black)
                .bg(Color::Rgb(255, 140, 0))
                .add_modifier(Modifier::BOLD),
            BeadPriority::High => Style::default().fg(Color::Red),
            BeadPriority::Medium => Style::default().fg(Color::Yellow),
            BeadPriority::Low => Style::default().fg(Color::Blue),
            BeadPriority::Backlog => Style::default().fg(Color::DarkGray),
        };
        StatusConfig {
            icon: self.label(),
            style,
        }
    }
}

/// Draw the status bar at the bottom of the screen.
pub fn draw_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let width = area.width as usize;

    let mut spans = Vec::new();
    if let Some(err) = &app.error_message {
        spans.push(Span::styled(format!(" {} ", err), Style::default().fg(Color::Red)));
    } else if app.search_mode {
        let text = if width >= 55 {
            " Type to filter | Enter: keep filter | Esc: clear "
        } else {
            " Enter:keep Esc:clear "
        };
        spans.push(Span::styled(text, Style::default().fg(Color::Yellow)));
    } else {
        if let Some(msg) = &app.status_message {
            spans.push(Span::styled(format!(" {} ", msg), Style::default().fg(Color::Green)));
        }
        if let Some(at) = app.view.last_refresh {
            spans.push(Span::styled(
                format!("@ {} ", at.with_timezone(&chrono::Local).format("%H:%M:%S")),
                Style::default().fg(Color::DarkGray),
            ));
        }
        if let Some(progress) = app.prefetch_progress {
            spans.push(Span::styled(
                format!("{} comments {}/{} ", app.spinner_char(), progress.loaded, progress.total),
                Style::default().fg(Color::Cyan),
            ));
        }
        let hints = if width >= 100 {
            format!(
                "| j/k: nav | h/l: fold | /: filter | s: sort [{}] | r: refresh | Tab: detail | ?: help ",
                app.sort_mode.label()
            )
        } else if width >= 60 {
            "| j/k h/l / s r Tab ? ".to_string()
        } else {
            "| ? help ".to_string()
        };
        spans.push(Span::styled(hints, Style::default().fg(Color::DarkGray)));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

pub fn draw_modal(f: &mut Frame, app: &App) {
    match &app.modal {
        ModalState::None => {}
        ModalState::Help => draw_help_popup(f),
        ModalState::ConfirmDelete { id } => draw_confirm_delete(f, app, id),
    }
}

const SHORTCUTS: &[(&str, &str)] = &[
    ("j/k, ↑/↓", "move"),
    ("gg / G", "top / bottom"),
    ("Ctrl-d / Ctrl-u", "half page down / up"),
    ("l / h", "expand / collapse (h again: parent)"),
    ("Enter, Space", "toggle"),
    ("p", "go to parent"),
    ("E / C", "expand all / collapse all"),
    ("/", "filter"),
    ("Esc", "clear filter"),
    ("s", "cycle sort mode"),
    ("r", "refresh now"),
    ("D", "delete issue"),
    ("Tab", "switch to detail pane"),
    ("q", "quit"),
];

fn draw_help_popup(f: &mut Frame) {
    let area = popup_rect(60, 70, 44, 18, f.area());
    f.render_widget(Clear, area);

    let mut lines = vec![Line::from("")];
    for (keys, action) in SHORTCUTS {
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<18}", keys), Style::default().fg(Color::Cyan)),
            Span::raw(*action),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!("  {} shared issue (listed under each parent)", icons::SHARED),
        Style::default().fg(Color::DarkGray),
    )));
    lines.push(Line::from(Span::styled(
        "  Esc: close",
        Style::default().fg(Color::DarkGray),
    )));

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_confirm_delete(f: &mut Frame, app: &App, id: &str) {
    let area = popup_rect(40, 20, 36, 6, f.area());
    f.render_widget(Clear, area);

    let title = app
        .view
        .graph()
        .get(id)
        .map(|n| n.title.as_str())
        .unwrap_or_default();
    let lines = vec![
        Line::from(vec![
            Span::raw("Delete "),
            Span::styled(id, Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("?"),
        ]),
        Line::from(Span::styled(title, Style::default().fg(Color::DarkGray))),
        Line::from(""),
        Line::from(Span::styled("y: delete | any other key: cancel", Style::default().fg(Color::DarkGray))),
    ];

    let block = Block::default()
        .title(" Confirm ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));
    f.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: true }), area);
}
