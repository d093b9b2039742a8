//! Board columns and task cards.

use join_core::board::Card;
use join_core::drag::{DRAGGED_CLASS, TOUCH_ORIGINAL_CLASS};
use join_core::task::TaskStatus;
use ratatui::{
    Frame,
    layout::{Margin, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use super::theme;
use crate::app::App;

const BAR_FULL: char = '█';
const BAR_EMPTY: char = '░';

/// Render the four columns, their cards and the floating proxy.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let highlighted = app.surface.highlighted();

    for status in TaskStatus::ALL {
        let Some(cells) = app.surface.column_cells(status) else {
            continue;
        };
        let cells = cells.intersection(area);
        let border_style = if highlighted == Some(status) {
            theme::drop_target()
        } else {
            theme::dimmed()
        };
        let cards = app.view.column(status);
        let block = Block::default()
            .title(Span::styled(
                format!(" {} ({}) ", status.title(), cards.len()),
                theme::panel_title(theme::FG_PRIMARY),
            ))
            .borders(Borders::ALL)
            .border_style(border_style);
        let inner = block.inner(cells);
        frame.render_widget(block, cells);

        if cards.is_empty() {
            let placeholder = Paragraph::new(status.empty_message())
                .style(theme::dimmed())
                .wrap(Wrap { trim: true });
            frame.render_widget(placeholder, inner.inner(Margin::new(1, 1)));
            continue;
        }

        for card in cards {
            let Some(card_area) = app.surface.card_cells(&card.id) else {
                continue;
            };
            let left_behind = app.surface.card_has_class(&card.id, DRAGGED_CLASS)
                || app.surface.card_has_class(&card.id, TOUCH_ORIGINAL_CLASS);
            let border = if left_behind {
                theme::ghost()
            } else if app.selected.as_ref() == Some(&card.id) {
                theme::highlighted()
            } else {
                theme::normal()
            };
            render_card(frame, card_area, app, card, border, left_behind);
        }
    }

    // The proxy floats above every column.
    if let (Some((task_id, _)), Some(proxy_area)) = (app.dragging(), app.surface.proxy_cells())
        && let Some(card) = app.view.card(task_id)
    {
        render_card(frame, proxy_area, app, card, theme::drop_target(), false);
    }
}

fn render_card(frame: &mut Frame, area: Rect, app: &App, card: &Card, border: Style, ghost: bool) {
    let block = Block::default().borders(Borders::ALL).border_style(border);
    let inner = block.inner(area);
    let mut lines = card_lines(app, card, inner.width);
    if ghost {
        lines = lines
            .into_iter()
            .map(|line| line.patch_style(theme::ghost()))
            .collect();
    }

    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn card_lines<'a>(app: &'a App, card: &'a Card, width: u16) -> Vec<Line<'a>> {
    let task = &card.task;
    let mut lines = Vec::with_capacity(4);

    lines.push(Line::from(Span::styled(
        format!(" {} ", task.category),
        theme::badge(task.category_color()),
    )));
    lines.push(Line::from(Span::styled(task.title.as_str(), theme::bold())));

    let progress = task.progress();
    if progress.is_visible() {
        let label = progress.to_string();
        let bar_width = usize::from(width).saturating_sub(label.len() + 1);
        let filled = bar_width * usize::from(progress.percent()) / 100;
        let bar: String = std::iter::repeat_n(BAR_FULL, filled)
            .chain(std::iter::repeat_n(BAR_EMPTY, bar_width - filled))
            .collect();
        lines.push(Line::from(vec![
            Span::styled(bar, theme::normal().fg(theme::ACCENT)),
            Span::raw(" "),
            Span::styled(label, theme::dimmed()),
        ]));
    } else {
        lines.push(Line::from(Span::styled(task.description.as_str(), theme::dimmed())));
    }

    let badges = card.badges(&app.known, app.max_visible_assignees);
    let mut row: Vec<Span<'a>> = Vec::new();
    for assignee in badges.visible {
        row.push(Span::styled(
            format!(" {} ", assignee.assignee_initial),
            theme::badge(&assignee.assignee_color),
        ));
        row.push(Span::raw(" "));
    }
    if badges.overflow > 0 {
        row.push(Span::styled(format!("+{}", badges.overflow), theme::bold()));
        row.push(Span::raw(" "));
    }
    if let Some(priority) = task.priority {
        row.push(Span::styled(
            priority.label(),
            theme::panel_title(theme::stored_color(priority.color())),
        ));
    }
    lines.push(Line::from(row));
    lines
}
