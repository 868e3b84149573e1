//! Terminal UI components.
//!
//! This module contains all UI-related code including:
//! - [`viewport`]: Zoom, pan and visibility of the image pane, source
//!   scrolling
//! - [`style`]: Colors
//!
//! The image pane draws in view space: one cell per view unit, the image
//! itself shown only as its bounds.

pub mod style;
pub mod viewport;

mod overlays;
mod render;
mod status;

pub use render::{char_col_at, line_number_width, render};
pub use status::zoom_label;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::widgets::Block;

pub const IMAGE_WIDTH_PERCENT: u16 = 50;
pub const SOURCE_WIDTH_PERCENT: u16 = 50;
/// Toast row plus status row.
pub const FOOTER_ROWS: u16 = 2;

/// Screen areas of one frame. Inner rects exclude the pane borders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaneLayout {
    pub image_outer: Option<Rect>,
    pub image: Option<Rect>,
    pub source_outer: Rect,
    pub source: Rect,
    pub toast: Rect,
    pub status: Rect,
}

pub fn pane_layout(area: Rect, image_visible: bool) -> PaneLayout {
    let main = Rect {
        height: area.height.saturating_sub(FOOTER_ROWS),
        ..area
    };
    let toast = Rect {
        y: area.y + area.height.saturating_sub(2),
        height: area.height.min(1),
        ..area
    };
    let status = Rect {
        y: area.y + area.height.saturating_sub(1),
        height: area.height.min(1),
        ..area
    };
    let (image_outer, source_outer) = if image_visible {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(IMAGE_WIDTH_PERCENT),
                Constraint::Percentage(SOURCE_WIDTH_PERCENT),
            ])
            .split(main);
        (Some(chunks[0]), chunks[1])
    } else {
        (None, main)
    };
    let inner = |outer: Rect| Block::bordered().inner(outer);
    PaneLayout {
        image_outer,
        image: image_outer.map(inner),
        source_outer,
        source: inner(source_outer),
        toast,
        status,
    }
}

#[cfg(test)]
mod tests;
