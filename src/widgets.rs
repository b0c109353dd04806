//! Reusable clickable UI components.
//!
//! Each component encapsulates both rendering and click target registration,
//! so visual output and interactive behaviour stay co-located.
//!
//! - [`TabBar`] — horizontal tab navigation (rendering + click targets).
//! - [`ClickableList`] — vertical line list with per-row click targets.

use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::style::{Color, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::{Block, Paragraph};
use ratzilla::ratatui::Frame;

use crate::input::ClickState;

// ── TabBar ─────────────────────────────────────────────────────

/// A horizontal tab bar.
///
/// Renders tabs as a single row of styled labels separated by a separator
/// string, and registers click targets matching the actual rendered label
/// positions (display widths account for CJK characters). Each target covers
/// its label plus half of the adjacent separator(s); the first and last tabs
/// extend to the area edges so the bar has no dead zones.
pub struct TabBar<'a> {
    tabs: Vec<(String, Style, u16)>,
    separator: &'a str,
    block: Option<Block<'a>>,
}

impl<'a> TabBar<'a> {
    pub fn new(separator: &'a str) -> Self {
        Self {
            tabs: Vec::new(),
            separator,
            block: None,
        }
    }

    /// Add a tab with its label, style, and action ID.
    pub fn tab(mut self, label: impl Into<String>, style: Style, action_id: u16) -> Self {
        self.tabs.push((label.into(), style, action_id));
        self
    }

    /// Wrap the tab bar in a [`Block`]. Click targets are adjusted to the
    /// block's inner area.
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    /// Render the tab bar and register click targets.
    pub fn render(self, f: &mut Frame, area: Rect, cs: &mut ClickState) {
        let sep_width = Line::from(self.separator).width() as u16;
        let mut spans: Vec<Span> = Vec::new();
        // (start column, display width, action id) of each padded label
        let mut labels: Vec<(u16, u16, u16)> = Vec::new();
        let mut cursor: u16 = 0;

        for (i, (label, style, action_id)) in self.tabs.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(
                    self.separator,
                    Style::default().fg(Color::DarkGray),
                ));
                cursor += sep_width;
            }
            let padded = format!(" {} ", label);
            let width = Line::from(padded.as_str()).width() as u16;
            labels.push((cursor, width, *action_id));
            cursor += width;
            spans.push(Span::styled(padded, *style));
        }

        // Inner content area (accounting for borders) before consuming block
        let inner = match &self.block {
            Some(block) => block.inner(area),
            None => area,
        };

        let paragraph = match self.block {
            Some(block) => Paragraph::new(Line::from(spans)).block(block),
            None => Paragraph::new(Line::from(spans)),
        };
        f.render_widget(paragraph, area);

        let n = labels.len();
        if n == 0 || inner.width == 0 {
            return;
        }

        for i in 0..n {
            let (start, width, action_id) = labels[i];
            let left = if i == 0 {
                0
            } else {
                let prev_end = labels[i - 1].0 + labels[i - 1].1;
                prev_end + (start - prev_end) / 2
            };
            let right = if i == n - 1 {
                inner.width
            } else {
                let end = start + width;
                end + (labels[i + 1].0 - end) / 2
            };
            let w = right.saturating_sub(left);
            if w > 0 {
                // Outer y/height for better tap tolerance on the full bar
                cs.add_click_target(
                    Rect::new(inner.x + left, area.y, w, area.height.max(1)),
                    action_id,
                );
            }
        }
    }
}

// ── ClickableList ──────────────────────────────────────────────

/// A builder that pairs rendered [`Line`]s with click actions.
///
/// Annotate lines as clickable when adding them, then call
/// [`register_targets`](ClickableList::register_targets) once after rendering.
/// The action is bound to whatever row the line ends up on, so inserting or
/// removing lines above it moves the target automatically.
pub struct ClickableList<'a> {
    lines: Vec<Line<'a>>,
    /// `(line_index, action_id)` pairs — line_index is the index into `lines`.
    actions: Vec<(u16, u16)>,
}

impl<'a> ClickableList<'a> {
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            actions: Vec::new(),
        }
    }

    /// Add a non-clickable line.
    pub fn push(&mut self, line: Line<'a>) {
        self.lines.push(line);
    }

    /// Add a clickable line with a semantic action ID.
    pub fn push_clickable(&mut self, line: Line<'a>, action_id: u16) {
        let idx = self.lines.len() as u16;
        self.actions.push((idx, action_id));
        self.lines.push(line);
    }

    /// Total number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Consume the builder, returning the lines for rendering.
    pub fn into_lines(self) -> Vec<Line<'a>> {
        self.lines
    }

    /// Register click targets for all clickable lines.
    ///
    /// * `area` — the widget area (including borders).
    /// * `top_offset` / `bottom_offset` — rows before/after content
    ///   (e.g. 1 each for `Borders::ALL`).
    /// * `scroll` — vertical scroll offset in rows (0 if not scrollable).
    ///
    /// Assumes unwrapped rendering: one logical line per visual row.
    pub fn register_targets(
        &self,
        area: Rect,
        cs: &mut ClickState,
        top_offset: u16,
        bottom_offset: u16,
        scroll: u16,
    ) {
        let content_y = area.y + top_offset;
        let content_end = area.y + area.height.saturating_sub(bottom_offset);

        for &(line_idx, action_id) in &self.actions {
            if line_idx < scroll {
                continue;
            }
            let row = content_y + (line_idx - scroll);
            if row >= content_end {
                continue;
            }
            cs.add_row_target(area, row, action_id);
        }
    }
}
