//! Colors for the zone overlay and the source pane.
//!
//! Uses ANSI colors that adapt to the terminal's color palette.

use ratatui::style::{Color, Modifier, Style};

use crate::zone::PaintStyle;

/// Style for one overlay primitive.
pub fn paint_style(style: PaintStyle) -> Style {
    match style {
        PaintStyle::Outline => Style::default().fg(Color::Cyan),
        // The active zone stands out from its neighbours
        PaintStyle::Active => Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
        PaintStyle::Hint => Style::default().fg(Color::Magenta),
    }
}

/// Background of the cells covered by the image.
pub fn page() -> Style {
    Style::default().bg(Color::Indexed(236))
}

pub fn pane_border(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    }
}

pub fn gutter() -> Style {
    Style::default().fg(Color::DarkGray)
}

pub fn caret() -> Style {
    Style::default().bg(Color::White).fg(Color::Black)
}

pub fn selection() -> Style {
    Style::default().bg(Color::DarkGray)
}
