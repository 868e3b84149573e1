//! Pan and zoom state for the image pane, line scrolling for the source pane.
//!
//! The image pane works in view space: one terminal cell is one view unit.
//! [`ViewportController`] owns the [`ScaleTransform`] and the pan offset;
//! screen cells are converted to view points by adding the offset.

use std::ops::Range;

use crate::geometry::{DocPoint, ScaleTransform, ViewPoint, ViewRect};

/// Visible window onto the scaled image.
///
/// # Example
///
/// ```
/// use zonemark::geometry::{DocPoint, ScaleTransform};
/// use zonemark::ui::viewport::ViewportController;
///
/// let mut vp = ViewportController::new(80, 24, (400, 300), ScaleTransform::identity());
/// vp.scroll_by(10, 5);
/// assert_eq!(vp.screen_to_document(0, 0), DocPoint::new(10, 5));
///
/// // Zooming keeps the point under the pointer where it was.
/// vp.zoom_in_at(4, 4);
/// assert_eq!(vp.screen_to_document(4, 4), DocPoint::new(14, 9));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportController {
    scale: ScaleTransform,
    width: u16,
    height: u16,
    offset_x: i32,
    offset_y: i32,
    /// Image size in document units.
    content: (i32, i32),
    visible: bool,
}

impl ViewportController {
    pub const fn new(width: u16, height: u16, content: (i32, i32), scale: ScaleTransform) -> Self {
        Self {
            scale,
            width,
            height,
            offset_x: 0,
            offset_y: 0,
            content,
            visible: true,
        }
    }

    pub const fn scale(&self) -> &ScaleTransform {
        &self.scale
    }

    pub const fn offset(&self) -> ViewPoint {
        ViewPoint::new(self.offset_x, self.offset_y)
    }

    pub const fn width(&self) -> u16 {
        self.width
    }

    pub const fn height(&self) -> u16 {
        self.height
    }

    pub const fn content(&self) -> (i32, i32) {
        self.content
    }

    /// Image size in view units at the current scale.
    pub fn content_view_size(&self) -> (i32, i32) {
        (
            self.scale.to_view_len(self.content.0),
            self.scale.to_view_len(self.content.1),
        )
    }

    /// The part of view space currently on screen; the paint clip.
    pub fn visible_rect(&self) -> ViewRect {
        ViewRect::new(
            self.offset_x,
            self.offset_y,
            self.offset_x + i32::from(self.width),
            self.offset_y + i32::from(self.height),
        )
    }

    pub const fn screen_to_view(&self, col: u16, row: u16) -> ViewPoint {
        ViewPoint::new(col as i32 + self.offset_x, row as i32 + self.offset_y)
    }

    pub fn screen_to_document(&self, col: u16, row: u16) -> DocPoint {
        self.scale.to_document(self.screen_to_view(col, row))
    }

    /// Screen cell (relative to the pane) showing a view point.
    pub const fn view_to_screen(&self, p: ViewPoint) -> (i32, i32) {
        (p.x - self.offset_x, p.y - self.offset_y)
    }

    pub fn scroll_by(&mut self, dx: i32, dy: i32) {
        self.offset_x = self.offset_x.saturating_add(dx);
        self.offset_y = self.offset_y.saturating_add(dy);
        self.clamp();
    }

    /// Bring a view point on screen, moving as little as possible.
    pub fn reveal(&mut self, p: ViewPoint) {
        let (w, h) = (i32::from(self.width), i32::from(self.height));
        if p.x < self.offset_x {
            self.offset_x = p.x;
        } else if p.x >= self.offset_x + w {
            self.offset_x = p.x - w + 1;
        }
        if p.y < self.offset_y {
            self.offset_y = p.y;
        } else if p.y >= self.offset_y + h {
            self.offset_y = p.y - h + 1;
        }
        self.clamp();
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.clamp();
    }

    pub fn set_content(&mut self, width: i32, height: i32) {
        self.content = (width.max(0), height.max(0));
        self.clamp();
    }

    /// Double the scale, keeping the document point under the given pane
    /// cell fixed. Returns false at the maximum scale.
    pub fn zoom_in_at(&mut self, col: u16, row: u16) -> bool {
        self.zoom_at(col, row, ScaleTransform::zoom_in)
    }

    /// Halve the scale around the given pane cell.
    pub fn zoom_out_at(&mut self, col: u16, row: u16) -> bool {
        self.zoom_at(col, row, ScaleTransform::zoom_out)
    }

    fn zoom_at(&mut self, col: u16, row: u16, step: fn(&mut ScaleTransform) -> bool) -> bool {
        let pinned = self.screen_to_document(col, row);
        if !step(&mut self.scale) {
            return false;
        }
        let moved = self.scale.to_view(pinned);
        self.offset_x = moved.x - i32::from(col);
        self.offset_y = moved.y - i32::from(row);
        self.clamp();
        true
    }

    /// Largest power-of-two scale at which the whole image fits the pane.
    pub fn zoom_to_fit(&mut self) {
        let mut scale = ScaleTransform::from_exponent(6);
        let fits = |s: &ScaleTransform| {
            s.to_view_len(self.content.0) <= i32::from(self.width)
                && s.to_view_len(self.content.1) <= i32::from(self.height)
        };
        while !fits(&scale) && scale.zoom_out() {}
        self.scale = scale;
        self.offset_x = 0;
        self.offset_y = 0;
    }

    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    /// Returns true when the pane has just become visible again.
    pub const fn set_visible(&mut self, visible: bool) -> bool {
        let regained = visible && !self.visible;
        self.visible = visible;
        regained
    }

    fn clamp(&mut self) {
        let (cw, ch) = self.content_view_size();
        let max_x = (cw - i32::from(self.width)).max(0);
        let max_y = (ch - i32::from(self.height)).max(0);
        self.offset_x = self.offset_x.clamp(0, max_x);
        self.offset_y = self.offset_y.clamp(0, max_y);
    }
}

/// Line scrolling for the source pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineViewport {
    height: u16,
    offset: usize,
    total_lines: usize,
}

impl LineViewport {
    pub const fn new(height: u16, total_lines: usize) -> Self {
        Self {
            height,
            offset: 0,
            total_lines,
        }
    }

    pub const fn offset(&self) -> usize {
        self.offset
    }

    pub const fn height(&self) -> u16 {
        self.height
    }

    pub fn visible_range(&self) -> Range<usize> {
        let end = (self.offset + self.height as usize).min(self.total_lines);
        self.offset..end
    }

    pub const fn scroll_up(&mut self, n: usize) {
        self.offset = self.offset.saturating_sub(n);
    }

    pub fn scroll_down(&mut self, n: usize) {
        self.offset = (self.offset + n).min(self.max_offset());
    }

    /// Scroll just enough for `line` to be on screen.
    pub fn ensure_visible(&mut self, line: usize) {
        if line < self.offset {
            self.offset = line;
        } else if self.height > 0 && line >= self.offset + self.height as usize {
            self.offset = line + 1 - self.height as usize;
        }
        self.offset = self.offset.min(self.max_offset());
    }

    pub fn resize(&mut self, height: u16) {
        self.height = height;
        self.offset = self.offset.min(self.max_offset());
    }

    pub fn set_total_lines(&mut self, total: usize) {
        self.total_lines = total;
        self.offset = self.offset.min(self.max_offset());
    }

    const fn max_offset(&self) -> usize {
        self.total_lines.saturating_sub(self.height as usize)
    }
}
