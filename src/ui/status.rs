use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::{Model, ToastLevel};

/// Human label for a power-of-two scale: `2x`, `1x`, `1/4x`.
pub fn zoom_label(scale: f64) -> String {
    if scale >= 1.0 {
        format!("{scale}x")
    } else {
        format!("1/{}x", 1.0 / scale)
    }
}

pub fn render_status_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let filename = model.file_path.file_name().map_or_else(
        || "untitled".to_string(),
        |s| s.to_string_lossy().to_string(),
    );
    let dirty_indicator = if model.buffer.is_dirty() {
        " [modified]"
    } else {
        ""
    };
    let active = model
        .decorator
        .active_zone()
        .map_or_else(|| "-".to_string(), |z| z.region.to_string());
    let pane_indicator = if model.viewport.is_visible() {
        ""
    } else {
        " [image hidden]"
    };
    let cursor = model.buffer.cursor();

    let status = format!(
        " {filename}{dirty_indicator}  zones {}  active {active}  zoom {}  Ln {}, Col {}{pane_indicator}  ?:help",
        model.decorator.zones().len(),
        zoom_label(model.viewport.scale().scale()),
        cursor.line + 1,
        cursor.col + 1,
    );

    let status_bar =
        Paragraph::new(status).style(Style::default().bg(Color::DarkGray).fg(Color::White));

    frame.render_widget(status_bar, area);
}

pub fn render_toast_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let Some((message, level)) = model.active_toast() else {
        return;
    };
    let (prefix, style) = match level {
        ToastLevel::Info => (
            "[info]",
            Style::default().bg(Color::DarkGray).fg(Color::White),
        ),
        ToastLevel::Warning => (
            "[warn]",
            Style::default().bg(Color::Yellow).fg(Color::Black),
        ),
        ToastLevel::Error => ("[error]", Style::default().bg(Color::Red).fg(Color::White)),
    };
    let toast = Paragraph::new(format!("{prefix} {message}")).style(style);
    frame.render_widget(toast, area);
}
