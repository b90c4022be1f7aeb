//! Maps `BuilderController` state onto ratatui widgets. Deliberately thin:
//! this module owns no state of its own and performs no layout decisions
//! beyond what `layout::compute` already resolved — ratatui is the styled-
//! rendering engine, this is just the adapter.

use crate::layout;
use pipeloom_controller::{ActiveModal, BuilderController};
use pipeloom_types::Pane;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Frame,
};

pub fn draw(frame: &mut Frame<'_>, controller: &BuilderController) {
    let preview_enabled = controller.preview_enabled();
    let panes = layout::compute(frame.area(), preview_enabled);

    draw_search(frame, panes.search, controller);
    draw_available(frame, panes.available, controller);
    draw_selected(frame, panes.selected, controller);
    if let Some(preview_area) = panes.preview {
        draw_preview(frame, preview_area, controller);
    }
    draw_status(frame, panes.status, controller);

    if let Some(modal) = controller.modal() {
        let full_area = frame.area();
        draw_modal(frame, full_area, modal);
    }
}

fn pane_block(title: &str, focused: bool) -> Block<'_> {
    let style = if focused {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    Block::default().title(title).borders(Borders::ALL).border_style(style)
}

fn draw_search(frame: &mut Frame<'_>, area: Rect, controller: &BuilderController) {
    let focused = controller.pane() == Pane::Search;
    let block = pane_block("Search", focused);
    let paragraph = Paragraph::new(controller.search_query()).block(block);
    frame.render_widget(paragraph, area);
}

fn draw_available(frame: &mut Frame<'_>, area: Rect, controller: &BuilderController) {
    let focused = controller.pane() == Pane::Available;
    let items: Vec<ListItem> = controller
        .available()
        .get_ordered()
        .into_iter()
        .map(|display| {
            let archived = if display.item.archived { " [archived]" } else { "" };
            let label = format!(
                "{} ({}) x{}{}",
                display.item.display_name, display.item.kind, display.effective_usage, archived
            );
            ListItem::new(label)
        })
        .collect();
    let block = pane_block("Available", focused);
    frame.render_widget(List::new(items).block(block).highlight_symbol("> "), area);
}

fn draw_selected(frame: &mut Frame<'_>, area: Rect, controller: &BuilderController) {
    let focused = controller.pane() == Pane::Selected;
    let title = format!(
        "Pipeline: {}{}",
        controller.pipeline_name(),
        if controller.has_unsaved_changes() { " *" } else { "" }
    );
    let items: Vec<ListItem> = controller
        .selected()
        .refs()
        .iter()
        .map(|r| ListItem::new(format!("{}. [{}] {}", r.order, r.kind, r.path)))
        .collect();
    let block = pane_block(&title, focused);
    frame.render_widget(List::new(items).block(block).highlight_symbol("> "), area);
}

fn draw_preview(frame: &mut Frame<'_>, area: Rect, controller: &BuilderController) {
    let preview = controller.preview();
    let badge = match preview.token_status() {
        pipeloom_collab::TokenStatus::Good => ("good", Color::Green),
        pipeloom_collab::TokenStatus::Warning => ("warning", Color::Yellow),
        pipeloom_collab::TokenStatus::Danger => ("danger", Color::Red),
    };
    let title = format!("Preview ({} tokens, {})", preview.token_estimate(), badge.0);
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(badge.1));
    let text: Vec<Line> = preview
        .lines()
        .iter()
        .skip(preview.scroll_offset())
        .map(|l| Line::from(l.as_str()))
        .collect();
    frame.render_widget(Paragraph::new(text).block(block), area);
}

fn draw_status(frame: &mut Frame<'_>, area: Rect, controller: &BuilderController) {
    let text = if let Some(err) = controller.error() {
        Span::styled(format!("× {err}"), Style::default().fg(Color::Red))
    } else if let Some(message) = controller.status() {
        let style = if message.text.starts_with('×') {
            Style::default().fg(Color::Red)
        } else if message.text.starts_with('✓') {
            Style::default().fg(Color::Green)
        } else if message.text.starts_with('⚠') {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        Span::styled(message.text.clone(), style)
    } else {
        Span::raw("")
    };
    frame.render_widget(Paragraph::new(Line::from(text)), area);
}

fn centered(area: Rect, width_pct: u16, height_pct: u16) -> Rect {
    let vertical = ratatui::layout::Layout::default()
        .direction(ratatui::layout::Direction::Vertical)
        .constraints([
            ratatui::layout::Constraint::Percentage((100 - height_pct) / 2),
            ratatui::layout::Constraint::Percentage(height_pct),
            ratatui::layout::Constraint::Percentage((100 - height_pct) / 2),
        ])
        .split(area);
    ratatui::layout::Layout::default()
        .direction(ratatui::layout::Direction::Horizontal)
        .constraints([
            ratatui::layout::Constraint::Percentage((100 - width_pct) / 2),
            ratatui::layout::Constraint::Percentage(width_pct),
            ratatui::layout::Constraint::Percentage((100 - width_pct) / 2),
        ])
        .split(vertical[1])[1]
}

fn draw_modal(frame: &mut Frame<'_>, area: Rect, modal: &ActiveModal) {
    let popup = centered(area, 60, 50);
    frame.render_widget(Clear, popup);

    let (title, lines): (&str, Vec<Line>) = match modal {
        ActiveModal::Confirm(m, _) => (
            "Confirm",
            vec![
                Line::from(m.message().to_string()),
                Line::from(if m.kind().is_destructive() { "y = confirm" } else { "y/n" }),
            ],
        ),
        ActiveModal::NameEntry(m) => ("Pipeline name", vec![Line::from(m.input().to_string())]),
        ActiveModal::Clone(m) => ("Clone as", vec![Line::from(m.input().to_string())]),
        ActiveModal::Rename(m) => (
            "Rename",
            vec![
                Line::from(m.input().to_string()),
                Line::from(format!("-> {}", m.slug_preview())),
                Line::from(format!(
                    "affects {} active, {} archived pipeline(s)",
                    m.affected_active().len(),
                    m.affected_archived().len()
                )),
            ],
        ),
        ActiveModal::UsagePanel(m) => (
            "Used in",
            m.sorted_entries()
                .iter()
                .map(|e| {
                    Line::from(format!(
                        "{}{}",
                        e.pipeline_name,
                        if e.archived { " [archived]" } else { "" }
                    ))
                })
                .collect(),
        ),
        ActiveModal::Creator(m) => (
            "New component",
            vec![Line::from(format!("{:?}: {}", m.step(), m.name_input()))],
        ),
        ActiveModal::ContentEditor(m, target) => (
            "Edit content",
            {
                let mut out: Vec<Line> = m.lines().iter().map(|l| Line::from(l.as_str())).collect();
                out.push(Line::from(format!(
                    "[{}]{}",
                    target.path.display(),
                    if m.is_dirty() { " *" } else { "" }
                )));
                out
            },
        ),
        ActiveModal::TagEditor(m, _) => (
            "Tags",
            std::iter::once(Line::from(format!("selected: {}", m.selected().join(", "))))
                .chain(m.filtered_cloud().iter().map(|t| Line::from(*t)))
                .collect(),
        ),
    };

    let block = Block::default().title(title).borders(Borders::ALL);
    frame.render_widget(Paragraph::new(lines).block(block).alignment(Alignment::Left), popup);
}
