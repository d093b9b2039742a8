//! Terminal UI rendering.

pub mod board;
pub mod header;
pub mod status_bar;
pub mod theme;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
};

use crate::app::App;

/// Splits the screen into header, search line, board and status bar.
#[must_use]
pub fn layout(area: Rect) -> [Rect; 4] {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Summary
            Constraint::Length(1), // Search
            Constraint::Min(5),    // Board
            Constraint::Length(1), // Status bar
        ])
        .split(area);
    [chunks[0], chunks[1], chunks[2], chunks[3]]
}

/// Region the board columns occupy on a screen of `area`.
#[must_use]
pub fn board_area(area: Rect) -> Rect {
    layout(area)[2]
}

/// Main draw function for the entire UI.
pub fn draw(frame: &mut Frame, app: &App) {
    let [header_area, search_area, board_area, status_area] = layout(frame.area());

    header::render(frame, header_area, app);
    header::render_search(frame, search_area, app);
    board::render(frame, board_area, app);
    status_bar::render(frame, status_area, app);
}
