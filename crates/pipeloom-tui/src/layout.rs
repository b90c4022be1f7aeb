//! Pane geometry for a resize: two equal columns with borders; the right
//! column gives its lower half to the preview only when it is enabled.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

pub struct Panes {
    pub search: Rect,
    pub available: Rect,
    pub selected: Rect,
    pub preview: Option<Rect>,
    pub status: Rect,
}

pub fn compute(area: Rect, preview_enabled: bool) -> Panes {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);
    let body = rows[0];
    let status = rows[1];

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(body);
    let left = columns[0];
    let right = columns[1];

    let left_rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(left);
    let search = left_rows[0];
    let available = left_rows[1];

    if preview_enabled {
        let right_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(right);
        Panes {
            search,
            available,
            selected: right_rows[0],
            preview: Some(right_rows[1]),
            status,
        }
    } else {
        Panes {
            search,
            available,
            selected: right,
            preview: None,
            status,
        }
    }
}
