//! Detail pane for the selected issue, including its comments.

use super::status::StatusConfigurable;
use crate::data::Node;
use crate::tree::Focus;
use crate::tui::App;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

pub fn draw_detail(f: &mut Frame, app: &App, area: Rect) {
    let focused = app.view.focus == Focus::Detail;
    let block = Block::default()
        .title(" Detail ")
        .borders(Borders::ALL)
        .border_style(if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        });

    let lines = match app.view.selected_node() {
        Some(node) => detail_lines(node),
        None => vec![Line::from(Span::styled(
            "Nothing selected",
            Style::default().fg(Color::DarkGray),
        ))],
    };

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.detail_scroll, 0));
    f.render_widget(paragraph, area);
}

fn label(text: &str) -> Span<'static> {
    Span::styled(format!("{:<10}", text), Style::default().fg(Color::DarkGray))
}

fn detail_lines(node: &Node) -> Vec<Line<'_>> {
    let status = node.status.status_config();
    let priority = node.priority.status_config();

    let mut lines = vec![
        Line::from(Span::styled(
            node.title.as_str(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![label("ID"), Span::styled(node.id.as_str(), Style::default().fg(Color::Cyan))]),
        Line::from(vec![
            label("Status"),
            Span::styled(format!("{} {}", status.icon, node.status.display_name()), status.style),
        ]),
        Line::from(vec![label("Priority"), Span::styled(priority.icon, priority.style)]),
        Line::from(vec![label("Type"), Span::raw(node.issue_type.label())]),
    ];

    if let Some(assignee) = &node.assignee {
        lines.push(Line::from(vec![label("Assignee"), Span::raw(assignee.as_str())]));
    }
    if !node.labels.is_empty() {
        lines.push(Line::from(vec![label("Labels"), Span::raw(node.labels.join(", "))]));
    }
    if node.parents.len() > 1 {
        lines.push(Line::from(vec![label("Parents"), Span::raw(node.parents.join(", "))]));
    }
    lines.push(Line::from(vec![
        label("Updated"),
        Span::raw(node.updated_at.format("%Y-%m-%d %H:%M").to_string()),
    ]));

    if let Some(desc) = node.description.as_deref().filter(|d| !d.trim().is_empty()) {
        lines.push(Line::from(""));
        lines.extend(desc.lines().map(Line::from));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Comments",
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )));
    lines.extend(comment_lines(node));
    lines
}

fn comment_lines(node: &Node) -> Vec<Line<'_>> {
    let muted = Style::default().fg(Color::DarkGray);

    if let Some(err) = &node.comments_error {
        return vec![Line::from(Span::styled(
            format!("Comments unavailable: {}", err),
            Style::default().fg(Color::Red),
        ))];
    }
    if !node.comments_loaded {
        return vec![Line::from(Span::styled("Loading…", muted))];
    }
    if node.comments.is_empty() {
        return vec![Line::from(Span::styled("No comments", muted))];
    }

    let mut lines = Vec::new();
    for comment in &node.comments {
        lines.push(Line::from(vec![
            Span::styled(comment.author.as_str(), Style::default().fg(Color::Yellow)),
            Span::styled(format!(" · {}", comment.created_at.format("%Y-%m-%d %H:%M")), muted),
        ]));
        lines.extend(comment.text.lines().map(|l| Line::from(format!("  {}", l))));
        lines.push(Line::from(""));
    }
    lines
}
