use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph};

use crate::app::Model;

pub fn render_help_overlay(model: &Model, frame: &mut Frame, area: Rect) {
    let popup_width = area.width.saturating_sub(12).max(48);
    let popup_height = area.height.saturating_sub(4).max(12);
    let popup = centered_popup_rect(popup_width, popup_height, area);

    let global_cfg = model
        .config_global_path
        .as_ref()
        .map_or_else(|| "<unknown>".to_string(), |p| p.display().to_string());
    let local_cfg = model
        .config_local_path
        .as_ref()
        .map_or_else(|| "<none>".to_string(), |p| p.display().to_string());

    let section_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let dim_style = Style::default().fg(Color::Indexed(245));

    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::styled("Image pane", section_style));
    lines.push(Line::raw("  Drag on a corner       Resize zone"));
    lines.push(Line::raw("  Drag elsewhere         Draw a new zone"));
    lines.push(Line::raw("  Right click            Select smallest zone"));
    lines.push(Line::raw("  + / - / 0              Zoom in / out / fit"));
    lines.push(Line::raw("  Ctrl+wheel             Zoom at pointer"));
    lines.push(Line::raw("  Arrows, h/j/k/l, wheel Pan"));
    lines.push(Line::raw("  d                      Duplicate active zone"));
    lines.push(Line::raw("  x / Delete             Remove active zone"));
    lines.push(Line::raw("  y                      Copy active zone element"));
    lines.push(Line::raw("  Esc                    Deselect"));
    lines.push(Line::raw(""));

    lines.push(Line::styled("Source pane", section_style));
    lines.push(Line::raw("  Typing, arrows         Edit markup"));
    lines.push(Line::raw("  Ctrl+Home/End          Buffer start / end"));
    lines.push(Line::raw("  PageUp/PageDown        Scroll"));
    lines.push(Line::raw("  Esc                    Back to image pane"));
    lines.push(Line::raw(""));

    lines.push(Line::styled("Other", section_style));
    lines.push(Line::raw("  Tab                    Switch pane"));
    lines.push(Line::raw("  F2                     Show / hide image pane"));
    lines.push(Line::raw("  Ctrl-z                 Undo"));
    lines.push(Line::raw("  Ctrl-s                 Save file"));
    lines.push(Line::raw("  Ctrl-r                 Reload file from disk"));
    lines.push(Line::raw("  q / Ctrl-c / Ctrl-q    Quit"));
    lines.push(Line::raw("  ? / F1                 Toggle help"));
    lines.push(Line::raw(""));

    lines.push(Line::styled("Config", section_style));
    lines.push(Line::raw(format!("  Global: {global_cfg}")));
    lines.push(Line::raw(format!("  Local override: {local_cfg}")));
    lines.push(Line::raw(""));
    lines.push(Line::styled("Any key closes", dim_style));

    let block = Block::default()
        .title("Help")
        .borders(Borders::ALL)
        .padding(Padding::uniform(1))
        .style(Style::default().bg(Color::Black).fg(Color::White));

    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

fn centered_popup_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w) / 2);
    let y = area.y + (area.height.saturating_sub(h) / 2);
    Rect::new(x, y, w, h)
}
