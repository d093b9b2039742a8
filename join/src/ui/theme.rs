//! Theme and styling constants for the TUI.

use ratatui::style::{Color, Modifier, Style};

/// Primary foreground color.
pub const FG_PRIMARY: Color = Color::White;

/// Secondary foreground color (dimmed text).
pub const FG_SECONDARY: Color = Color::Gray;

/// Highlight color for focused elements.
pub const HIGHLIGHT: Color = Color::Cyan;

/// Border color of the column a card would land in.
pub const DROP_TARGET: Color = Color::LightBlue;

/// Success indicator color.
pub const SUCCESS: Color = Color::Green;

/// Warning indicator color.
pub const WARNING: Color = Color::Yellow;

/// Error indicator color.
pub const ERROR: Color = Color::Red;

/// Brand color used for the summary counters.
pub const ACCENT: Color = Color::Rgb(41, 171, 226);

/// Normal text style.
#[must_use]
pub fn normal() -> Style {
    Style::default().fg(FG_PRIMARY)
}

/// Dimmed text style (descriptions, placeholders).
#[must_use]
pub fn dimmed() -> Style {
    Style::default().fg(FG_SECONDARY)
}

/// Bold text style.
#[must_use]
pub fn bold() -> Style {
    Style::default().fg(FG_PRIMARY).add_modifier(Modifier::BOLD)
}

/// Highlighted text style (selected card border).
#[must_use]
pub fn highlighted() -> Style {
    Style::default().fg(HIGHLIGHT).add_modifier(Modifier::BOLD)
}

/// Style of a card left behind while its copy is being dragged.
#[must_use]
pub fn ghost() -> Style {
    Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM)
}

/// Border style of the hovered drop column.
#[must_use]
pub fn drop_target() -> Style {
    Style::default().fg(DROP_TARGET).add_modifier(Modifier::BOLD)
}

/// Style for the status bar background (dark background with white foreground).
#[must_use]
pub fn status_bar_bg() -> Style {
    Style::default().fg(Color::White).bg(Color::Rgb(30, 30, 50))
}

/// Style for panel titles with a given color (bold).
#[must_use]
pub fn panel_title(color: Color) -> Style {
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

/// Parses `#RRGGBB` or `#RGB`.
#[must_use]
pub fn parse_hex(raw: &str) -> Option<Color> {
    let hex = raw.strip_prefix('#').filter(|h| h.is_ascii())?;
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        6 => Some(Color::Rgb(channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?)),
        3 => {
            let expand = |s: &str| channel(s).map(|v| v * 17);
            Some(Color::Rgb(expand(&hex[0..1])?, expand(&hex[1..2])?, expand(&hex[2..3])?))
        }
        _ => None,
    }
}

/// Color for a stored color value: hex or one of the named priority colors.
#[must_use]
pub fn stored_color(raw: &str) -> Color {
    if let Some(color) = parse_hex(raw) {
        return color;
    }
    match raw.to_ascii_lowercase().as_str() {
        "red" => Color::Red,
        "yellow" | "orange" => Color::Yellow,
        "green" => Color::Green,
        "blue" => Color::Blue,
        _ => FG_SECONDARY,
    }
}

/// Badge style: the stored color as background with readable text on top.
#[must_use]
pub fn badge(raw: &str) -> Style {
    let bg = stored_color(raw);
    Style::default()
        .fg(contrast(bg))
        .bg(bg)
        .add_modifier(Modifier::BOLD)
}

fn contrast(bg: Color) -> Color {
    match bg {
        Color::Rgb(r, g, b) => {
            let luma = u32::from(r) * 299 + u32::from(g) * 587 + u32::from(b) * 114;
            if luma > 150_000 { Color::Black } else { Color::White }
        }
        Color::Yellow | Color::Green | Color::Cyan | Color::White => Color::Black,
        _ => Color::White,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_long_and_short_hex() {
        assert_eq!(parse_hex("#FF7A00"), Some(Color::Rgb(255, 122, 0)));
        assert_eq!(parse_hex("#0f0"), Some(Color::Rgb(0, 255, 0)));
        assert_eq!(parse_hex("FF7A00"), None);
        assert_eq!(parse_hex("#GG0000"), None);
    }

    #[test]
    fn priority_names_map_to_terminal_colors() {
        assert_eq!(stored_color("red"), Color::Red);
        assert_eq!(stored_color("#1FD7C1"), Color::Rgb(31, 215, 193));
        assert_eq!(stored_color("mauve"), FG_SECONDARY);
    }

    #[test]
    fn badge_text_stays_readable() {
        assert_eq!(badge("#FFFFFF").fg, Some(Color::Black));
        assert_eq!(badge("#0038FF").fg, Some(Color::White));
    }
}
