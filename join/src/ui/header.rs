//! Summary header and search line.

use chrono::Timelike;
use join_core::task::TaskStatus;
use join_core::user::{ActiveUser, greeting};
use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
};

use super::theme;
use crate::app::App;

/// Greeting, column counts and the next urgent deadline.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let user = app.user.clone().unwrap_or_else(ActiveUser::guest);
    let (salutation, name) = greeting(&user, chrono::Local::now().hour());
    let mut first = vec![Span::styled(salutation, theme::bold())];
    if let Some(name) = name {
        first.push(Span::raw(" "));
        first.push(Span::styled(name, theme::panel_title(theme::ACCENT)));
    }

    let summary = &app.summary;
    let mut counts = vec![Span::styled(
        format!("Tasks in Board: {}", summary.total),
        theme::panel_title(theme::ACCENT),
    )];
    for status in TaskStatus::ALL {
        counts.push(Span::raw("  "));
        counts.push(Span::styled(
            format!("{}: {}", status.title(), summary.count(status)),
            theme::normal(),
        ));
    }

    let urgent = Line::from(vec![
        Span::styled(format!("Urgent: {}", summary.urgent), theme::panel_title(theme::ERROR)),
        Span::raw("  "),
        Span::styled("Upcoming Deadline: ", theme::dimmed()),
        Span::styled(summary.deadline_label(), theme::normal()),
    ]);

    let paragraph = Paragraph::new(vec![Line::from(first), Line::from(counts), urgent]);
    frame.render_widget(paragraph, area);
}

/// The search prompt and its "no results" notice.
pub fn render_search(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans = if app.searching {
        vec![
            Span::styled("Find Task: ", theme::bold()),
            Span::styled(app.query.as_str(), theme::normal()),
            Span::styled("█", theme::highlighted()),
        ]
    } else if app.query.is_empty() {
        vec![Span::styled("/ to find a task", theme::dimmed())]
    } else {
        vec![
            Span::styled("Find Task: ", theme::dimmed()),
            Span::styled(app.query.as_str(), theme::normal()),
            Span::styled("  (Esc clears)", theme::dimmed()),
        ]
    };
    if let Some(message) = app.search_message {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(message, theme::panel_title(theme::ERROR)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
