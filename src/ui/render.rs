use ratatui::buffer::Buffer;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Clear, Paragraph};
use unicode_width::UnicodeWidthChar;

use crate::app::{Focus, Model};
use crate::document::DocumentAccess;
use crate::geometry::{ViewPoint, ViewRect};

use super::viewport::ViewportController;
use super::{overlays, pane_layout, status, style};

/// Render the complete UI.
pub fn render(model: &Model, frame: &mut Frame) {
    let area = frame.area();
    let layout = pane_layout(area, model.viewport.is_visible());

    if let (Some(outer), Some(inner)) = (layout.image_outer, layout.image) {
        render_image_pane(model, frame, outer, inner);
    }
    render_source_pane(model, frame, layout.source_outer, layout.source);

    status::render_toast_bar(model, frame, layout.toast);
    status::render_status_bar(model, frame, layout.status);

    if model.help_visible {
        overlays::render_help_overlay(model, frame, area);
    }
}

fn render_image_pane(model: &Model, frame: &mut Frame, outer: Rect, inner: Rect) {
    let title = model.image.as_ref().map_or_else(
        || " no image ".to_string(),
        |img| format!(" {} {}x{} ", img.file_name, img.width, img.height),
    );
    let block = Block::bordered()
        .title(title)
        .title_bottom(format!(
            " {} ",
            status::zoom_label(model.viewport.scale().scale())
        ))
        .border_style(style::pane_border(model.focus == Focus::Image));
    frame.render_widget(Clear, outer);
    frame.render_widget(block, outer);

    let vp = &model.viewport;
    let buf = frame.buffer_mut();
    paint_page(buf, inner, vp);
    for op in model.decorator.paint(vp.visible_rect(), vp.scale()) {
        draw_outline(buf, inner, vp, op.rect, style::paint_style(op.style));
    }
}

/// Shade the cells the image covers.
fn paint_page(buf: &mut Buffer, area: Rect, vp: &ViewportController) {
    let (cw, ch) = vp.content_view_size();
    let (left, top) = vp.view_to_screen(ViewPoint::new(0, 0));
    let (right, bottom) = vp.view_to_screen(ViewPoint::new(cw, ch));
    for y in top.max(0)..bottom.min(i32::from(area.height)) {
        for x in left.max(0)..right.min(i32::from(area.width)) {
            put(buf, area, x, y, " ", style::page());
        }
    }
}

/// Draw a rectangle's border, clipped to `area`. Right and bottom are
/// exclusive so the border sits on the last covered cell.
fn draw_outline(
    buf: &mut Buffer,
    area: Rect,
    vp: &ViewportController,
    rect: ViewRect,
    style: Style,
) {
    let (l, t) = vp.view_to_screen(ViewPoint::new(rect.left, rect.top));
    let (r, b) = vp.view_to_screen(ViewPoint::new(rect.right - 1, rect.bottom - 1));
    let (r, b) = (r.max(l), b.max(t));
    let (w, h) = (i32::from(area.width), i32::from(area.height));

    for x in l.max(0)..=r.min(w - 1) {
        for y in [t, b] {
            put(buf, area, x, y, edge_symbol(x, y, (l, t, r, b)), style);
        }
    }
    for y in t.max(0)..=b.min(h - 1) {
        for x in [l, r] {
            put(buf, area, x, y, edge_symbol(x, y, (l, t, r, b)), style);
        }
    }
}

fn edge_symbol(x: i32, y: i32, (l, t, r, b): (i32, i32, i32, i32)) -> &'static str {
    match (x == l, x == r, y == t, y == b) {
        // Single cell or single line
        (true, true, true, true) => "□",
        (true, true, _, _) => "│",
        (_, _, true, true) => "─",
        (true, _, true, _) => "┌",
        (_, true, true, _) => "┐",
        (true, _, _, true) => "└",
        (_, true, _, true) => "┘",
        (true, _, _, _) | (_, true, _, _) => "│",
        _ => "─",
    }
}

fn put(buf: &mut Buffer, area: Rect, x: i32, y: i32, symbol: &str, style: Style) {
    let (Ok(x), Ok(y)) = (u16::try_from(x), u16::try_from(y)) else {
        return;
    };
    if x >= area.width || y >= area.height {
        return;
    }
    if let Some(cell) = buf.cell_mut((area.x + x, area.y + y)) {
        cell.set_symbol(symbol).set_style(style);
    }
}

fn render_source_pane(model: &Model, frame: &mut Frame, outer: Rect, inner: Rect) {
    let buffer = &model.buffer;
    let filename = model.file_path.file_name().map_or_else(
        || "untitled".to_string(),
        |s| s.to_string_lossy().to_string(),
    );
    let dirty = if buffer.is_dirty() { " [modified]" } else { "" };
    let block = Block::bordered()
        .title(format!(" {filename}{dirty} "))
        .border_style(style::pane_border(model.focus == Focus::Source));

    let total_lines = buffer.line_count();
    let gutter_width = line_number_width(total_lines) as usize;
    let cursor = buffer.cursor();
    let selection = buffer.selection();

    let mut content: Vec<Line> = Vec::new();
    for line_idx in model.source_view.visible_range() {
        let text = buffer.line_at(line_idx).unwrap_or_default();
        let line_start = buffer.line_start_offset(line_idx + 1).unwrap_or(0);
        let mut spans = vec![Span::styled(
            format!("{:>gutter_width$} ", line_idx + 1),
            style::gutter(),
        )];
        let caret_col = (line_idx == cursor.line).then_some(cursor.col);
        spans.extend(source_line_spans(&text, line_start, selection, caret_col));
        content.push(Line::from(spans));
    }

    frame.render_widget(Clear, outer);
    frame.render_widget(block, outer);
    frame.render_widget(Paragraph::new(content), inner);
}

/// Split one source line into runs of equal style: plain, selected, caret.
fn source_line_spans(
    text: &str,
    line_start: usize,
    selection: Option<(usize, usize)>,
    caret_col: Option<usize>,
) -> Vec<Span<'static>> {
    let style_at = |col: usize| {
        let offset = line_start + col;
        if caret_col == Some(col) {
            style::caret()
        } else if selection.is_some_and(|(s, e)| s <= offset && offset < e) {
            style::selection()
        } else {
            Style::default()
        }
    };

    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut run = String::new();
    let mut run_style = Style::default();
    for (col, ch) in text.chars().enumerate() {
        let s = style_at(col);
        if s != run_style && !run.is_empty() {
            spans.push(Span::styled(std::mem::take(&mut run), run_style));
        }
        run_style = s;
        run.push(ch);
    }
    if !run.is_empty() {
        spans.push(Span::styled(run, run_style));
    }
    if caret_col.is_some_and(|col| col >= text.chars().count()) {
        spans.push(Span::styled(" ", style::caret()));
    }
    spans
}

/// Calculate the width needed for line numbers.
pub const fn line_number_width(total_lines: usize) -> u16 {
    if total_lines < 10 {
        1
    } else if total_lines < 100 {
        2
    } else if total_lines < 1_000 {
        3
    } else if total_lines < 10_000 {
        4
    } else if total_lines < 100_000 {
        5
    } else {
        6
    }
}

/// Character column under a display column, accounting for wide glyphs.
/// Columns past the end map to the end of the line.
pub fn char_col_at(text: &str, display_col: usize) -> usize {
    let mut width = 0;
    for (idx, ch) in text.chars().enumerate() {
        width += ch.width().unwrap_or(0);
        if width > display_col {
            return idx;
        }
    }
    text.chars().count()
}
