//! Shared input handling: event types, click targets, and coordinate conversion.
//!
//! The render pass registers rectangular click targets tagged with semantic
//! action IDs (see `game::actions`); the mouse handler converts pixel
//! coordinates to terminal cells and hit-tests against them.

use ratzilla::ratatui::layout::Rect;

/// All possible input events, normalized from keyboard, mouse, and touch sources.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// A key press from keyboard.
    Key(char),
    /// A click/tap on a registered target, identified by a semantic action ID.
    Click(u16),
}

/// A region on screen that can be tapped/clicked to trigger an action.
#[derive(Debug, Clone)]
pub struct ClickTarget {
    /// The rectangular region (in terminal cell coordinates) for hit testing.
    pub rect: Rect,
    /// Semantic action ID, see `game::actions`.
    pub action_id: u16,
}

/// Shared state between the render loop and the click handler.
pub struct ClickState {
    pub targets: Vec<ClickTarget>,
    pub terminal_cols: u16,
    pub terminal_rows: u16,
}

impl ClickState {
    pub fn new() -> Self {
        Self {
            targets: Vec::new(),
            terminal_cols: 0,
            terminal_rows: 0,
        }
    }

    pub fn clear_targets(&mut self) {
        self.targets.clear();
    }

    /// Register a click target with a rectangular hit region and a semantic action ID.
    pub fn add_click_target(&mut self, rect: Rect, action_id: u16) {
        self.targets.push(ClickTarget { rect, action_id });
    }

    /// Convenience: register a full-row click target at the given row within an area.
    /// Rows outside the area are ignored.
    pub fn add_row_target(&mut self, area: Rect, row: u16, action_id: u16) {
        if row >= area.y && row < area.y + area.height {
            self.targets.push(ClickTarget {
                rect: Rect::new(area.x, row, area.width, 1),
                action_id,
            });
        }
    }

    /// Hit-test a terminal cell coordinate against all registered targets.
    ///
    /// Later-registered targets win when targets overlap, matching typical UI
    /// layering where later elements are on top.
    pub fn hit_test(&self, col: u16, row: u16) -> Option<u16> {
        self.targets.iter().rev().find_map(|t| {
            let r = &t.rect;
            if col >= r.x && col < r.x + r.width && row >= r.y && row < r.y + r.height {
                Some(t.action_id)
            } else {
                None
            }
        })
    }
}

/// Determine whether a screen width (in columns) should use narrow layout.
pub fn is_narrow_layout(width: u16) -> bool {
    width < 60
}

/// Convert a pixel Y coordinate (relative to the grid container's top edge)
/// to a terminal row index. Returns `None` outside the grid.
pub fn pixel_y_to_row(click_y: f64, grid_height: f64, terminal_rows: u16) -> Option<u16> {
    if grid_height <= 0.0 || terminal_rows == 0 || click_y < 0.0 {
        return None;
    }
    let cell_height = grid_height / terminal_rows as f64;
    let row = (click_y / cell_height) as u16;
    if row >= terminal_rows {
        return None;
    }
    Some(row)
}

/// Convert a pixel X coordinate to a terminal column index.
pub fn pixel_x_to_col(click_x: f64, grid_width: f64, terminal_cols: u16) -> Option<u16> {
    if grid_width <= 0.0 || terminal_cols == 0 || click_x < 0.0 {
        return None;
    }
    let cell_width = grid_width / terminal_cols as f64;
    let col = (click_x / cell_width) as u16;
    if col >= terminal_cols {
        None
    } else {
        Some(col)
    }
}
