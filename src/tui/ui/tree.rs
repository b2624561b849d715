//! Header and tree pane rendering.

use super::icons;
use super::layout::{display_width, truncate_with_ellipsis};
use super::status::StatusConfigurable;
use crate::tree::{Focus, TreeRow};
use crate::tui::App;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let border_style = if app.search_mode {
        Style::default().fg(Color::Yellow)
    } else if app.is_loading() {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    let block = Block::default().borders(Borders::ALL).border_style(border_style);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let filter_text = app.view.filter().map(|flt| flt.text()).unwrap_or_default();
    let line = if app.search_mode || !filter_text.is_empty() {
        let query = if app.search_mode { app.search_query.as_str() } else { filter_text };
        let matches = app.view.filter().map(|flt| flt.match_count()).unwrap_or(0);
        Line::from(vec![
            Span::styled(format!("{} Filter: ", icons::SEARCH), Style::default().fg(Color::Yellow)),
            Span::styled(
                query.to_string(),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  ({} matching)", matches), Style::default().fg(Color::DarkGray)),
        ])
    } else {
        let mut spans = vec![
            Span::styled(format!("{} ", icons::APP), Style::default().fg(Color::Cyan)),
            Span::styled("beadscope ", Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
            Span::styled(
                format!("{} issues", app.view.graph().len()),
                Style::default().fg(Color::DarkGray),
            ),
        ];
        if app.is_loading() {
            spans.push(Span::styled(
                format!("  {} refreshing…", app.spinner_char()),
                Style::default().fg(Color::Cyan),
            ));
        } else if let Some(diff) = app.view.last_diff {
            spans.push(Span::styled(format!("  {}", diff), Style::default().fg(Color::DarkGray)));
        }
        Line::from(spans)
    };

    f.render_widget(Paragraph::new(line), inner);
}

pub fn draw_tree(f: &mut Frame, app: &App, area: Rect) {
    let focused = app.view.focus == Focus::Tree;
    let block = Block::default()
        .title(" Issues ")
        .borders(Borders::ALL)
        .border_style(if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        });
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = app.view.rows();
    if rows.is_empty() {
        let text = if app.is_loading() {
            "Loading issues…"
        } else if app.view.is_filtering() {
            "No issues match the filter"
        } else {
            "No issues"
        };
        f.render_widget(
            Paragraph::new(Span::styled(text, Style::default().fg(Color::DarkGray))),
            inner,
        );
        return;
    }

    let width = inner.width as usize;
    let lines: Vec<Line> = rows
        .iter()
        .enumerate()
        .skip(app.view.scroll_offset)
        .take(inner.height as usize)
        .map(|(idx, row)| build_row(app, row, idx == app.view.cursor, width))
        .collect();

    f.render_widget(Paragraph::new(lines), inner);
}

fn build_row<'a>(app: &'a App, row: &TreeRow, selected: bool, width: usize) -> Line<'a> {
    let Some(node) = app.view.graph().get(&row.node_id) else {
        return Line::from("");
    };

    let marker = if !node.has_children() {
        icons::LEAF
    } else if app.view.is_expanded(row) {
        icons::EXPANDED
    } else {
        icons::COLLAPSED
    };
    let status = node.status.status_config();
    let priority = node.priority.status_config();

    let dim_closed = if node.status.is_closed() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };
    let matched = app
        .view
        .filter()
        .is_some_and(|flt| flt.is_active() && flt.get(&node.id).matches);
    let title_style = if matched {
        dim_closed.fg(Color::Yellow)
    } else {
        dim_closed
    };

    let prefix = format!("{}{} ", "  ".repeat(row.depth), marker);
    let shared = if node.is_shared() {
        format!(" {}", icons::SHARED)
    } else {
        String::new()
    };
    let used = display_width(&prefix)
        + display_width(status.icon)
        + 1
        + display_width(&node.id)
        + 1
        + display_width(priority.icon)
        + 1
        + display_width(&shared);
    let title = truncate_with_ellipsis(&node.title, width.saturating_sub(used));

    let mut line = Line::from(vec![
        Span::styled(prefix, Style::default().fg(Color::DarkGray)),
        Span::styled(status.icon, status.style),
        Span::raw(" "),
        Span::styled(node.id.as_str(), Style::default().fg(Color::Cyan)),
        Span::raw(" "),
        Span::styled(priority.icon, priority.style),
        Span::raw(" "),
        Span::styled(title, title_style),
        Span::styled(shared, Style::default().fg(Color::Magenta)),
    ]);

    if selected {
        let bg = if app.view.focus == Focus::Tree {
            Color::Rgb(45, 50, 70)
        } else {
            Color::Rgb(35, 35, 40)
        };
        line = line.style(Style::default().bg(bg).add_modifier(Modifier::BOLD));
    }
    line
}
