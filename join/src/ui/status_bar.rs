//! Status bar rendering.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
};

use super::theme;
use crate::app::App;
use crate::config::PointerMode;

/// Render the status bar at the bottom of the screen.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let help_text = if let Some((_, hovered)) = app.dragging() {
        if hovered.is_some() {
            "Release: drop here | Esc: cancel"
        } else {
            "Move over a column | Esc: cancel"
        }
    } else if app.is_arming() {
        "Hold to pick up the card"
    } else if app.searching {
        "Type to filter | Enter: done | Esc: clear"
    } else {
        match app.pointer_mode() {
            PointerMode::Touch => {
                "Hold + drag: move card | </>: move selected | /: find | r: reload | q: quit"
            }
            PointerMode::Native => {
                "Drag: move card | </>: move selected | /: find | r: reload | q: quit"
            }
        }
    };

    let user = app
        .user
        .as_ref()
        .map_or_else(|| "G".to_string(), |u| u.initials.clone());

    let (dot_color, status_text) = if app.loading {
        (theme::WARNING, "Loading...".to_string())
    } else if let Some(message) = &app.status_message {
        let color = if message.contains("failed") {
            theme::ERROR
        } else {
            theme::SUCCESS
        };
        (color, message.clone())
    } else {
        (theme::SUCCESS, "Ready".to_string())
    };

    let status_line = Line::from(vec![
        Span::styled(format!(" {user} "), theme::badge("#2A3647")),
        Span::raw(" "),
        Span::styled("●", theme::normal().fg(dot_color)),
        Span::raw(format!(" {status_text}")),
        Span::raw(" | "),
        Span::styled(help_text, theme::dimmed()),
    ]);

    let paragraph = Paragraph::new(status_line).style(theme::status_bar_bg());
    frame.render_widget(paragraph, area);
}
