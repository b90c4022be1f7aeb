//! Preview Engine + Derived-View Reconciler.
//!
//! Owns the one piece of state every other pane's edits eventually flow
//! into: the live preview string, its token badge, and the scroll offset
//! that keeps the preview in sync with whatever is highlighted elsewhere.

use pipeloom_collab::{Composer, PipelineRecord, TokenStatus, Tokens};

fn normalize_newlines(s: &str) -> String {
    s.replace("\r\r", "\n\n").replace('\r', "\n")
}

fn wrap_lines(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return text.lines().map(str::to_string).collect();
    }
    textwrap::wrap(text, width)
        .into_iter()
        .map(|line| line.into_owned())
        .collect()
}

fn first_content_line(raw: &str) -> Option<&str> {
    raw.lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#'))
}

pub struct PreviewEngine {
    content: String,
    lines: Vec<String>,
    token_estimate: usize,
    token_status: TokenStatus,
    scroll_offset: usize,
    width: usize,
}

impl PreviewEngine {
    pub fn new(width: usize) -> Self {
        Self {
            content: "No components to preview.".to_string(),
            lines: vec!["No components to preview.".to_string()],
            token_estimate: 0,
            token_status: TokenStatus::Good,
            scroll_offset: 0,
            width,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn token_estimate(&self) -> usize {
        self.token_estimate
    }

    pub fn token_status(&self) -> TokenStatus {
        self.token_status
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn set_width(&mut self, width: usize) {
        self.width = width;
    }

    /// Available pane focused: preview shows the raw content of whatever
    /// component is highlighted.
    pub fn show_highlighted(&mut self, raw_content: &str, tokens: &dyn Tokens) {
        let normalized = normalize_newlines(raw_content);
        self.lines = wrap_lines(&normalized, self.width);
        self.content = self.lines.join("\n");
        self.token_estimate = tokens.estimate(raw_content);
        self.token_status = tokens.limit_status(self.token_estimate);
        self.scroll_offset = 0;
    }

    /// Nothing selected and nothing highlighted.
    pub fn show_empty(&mut self, message: &str) {
        self.content = message.to_string();
        self.lines = vec![message.to_string()];
        self.token_estimate = 0;
        self.token_status = TokenStatus::Good;
        self.scroll_offset = 0;
    }

    /// Selected pane focused (or no pane claims the preview): composes the
    /// full pipeline output. On composer failure the preview content is
    /// replaced by the error text and nothing else changes.
    pub fn show_composed(
        &mut self,
        composer: &dyn Composer,
        pipeline: &PipelineRecord,
        tokens: &dyn Tokens,
    ) {
        match composer.compose(pipeline) {
            Ok(composed) => {
                let normalized = normalize_newlines(&composed);
                self.lines = wrap_lines(&normalized, self.width);
                self.content = self.lines.join("\n");
                self.token_estimate = tokens.estimate(&composed);
                self.token_status = tokens.limit_status(self.token_estimate);
            }
            Err(err) => {
                self.content = err.to_string();
            }
        }
    }

    /// Moves the viewport so the highlighted selected component's first
    /// non-empty, non-heading line sits near the top, with two lines of
    /// leading context. `component_contents` is the raw (unwrapped) content
    /// of each selected component, in selected-pane order; `cursor` is the
    /// index of the highlighted one.
    pub fn sync_scroll_to_component(
        &mut self,
        cursor: usize,
        component_contents: &[String],
        viewport_height: usize,
    ) {
        if component_contents.is_empty() || self.lines.is_empty() {
            self.scroll_offset = 0;
            return;
        }
        let cursor = cursor.min(component_contents.len() - 1);
        let total_lines = self.lines.len();

        let target = first_content_line(&component_contents[cursor])
            .and_then(|needle| {
                self.lines
                    .iter()
                    .position(|line| line.contains(needle))
            })
            .map(|idx| idx.saturating_sub(2))
            .unwrap_or_else(|| {
                let estimate = cursor * total_lines / component_contents.len();
                estimate.min(total_lines.saturating_sub(10))
            });

        self.scroll_offset = Self::center_or_top(target, viewport_height, total_lines);
    }

    fn center_or_top(target: usize, viewport_height: usize, total_lines: usize) -> usize {
        let midpoint = viewport_height / 2;
        let offset = if target > midpoint {
            target - midpoint
        } else {
            0
        };
        offset.min(total_lines.saturating_sub(viewport_height.min(total_lines)))
    }

    pub fn scroll_by(&mut self, delta: isize) {
        let max = self.lines.len().saturating_sub(1);
        let next = (self.scroll_offset as isize + delta).clamp(0, max as isize);
        self.scroll_offset = next as usize;
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll_offset = 0;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_offset = self.lines.len().saturating_sub(1);
    }
}

/// Derived-View Reconciler: clamps cursor/scroll state for a
/// single pane against a freshly recomputed item count. Applied to every
/// pane (search, available, selected, preview) after an action changes the
/// underlying list.
#[derive(Debug, Clone, Copy, Default)]
pub struct PaneViewState {
    pub cursor: usize,
    pub scroll: usize,
}

impl PaneViewState {
    /// Clamps `cursor` into `[0, len)` (or 0 when empty) and keeps `scroll`
    /// from leaving a shorter list's content off-screen.
    pub fn reconcile(&mut self, len: usize, viewport_height: usize) {
        self.cursor = if len == 0 { 0 } else { self.cursor.min(len - 1) };
        let max_scroll = len.saturating_sub(viewport_height);
        self.scroll = self.scroll.min(max_scroll);
        if self.cursor < self.scroll {
            self.scroll = self.cursor;
        } else if viewport_height > 0 && self.cursor >= self.scroll + viewport_height {
            self.scroll = self.cursor + 1 - viewport_height;
        }
    }
}
