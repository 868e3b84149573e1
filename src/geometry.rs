//! Document-space and view-space geometry.
//!
//! Zones are persisted in *document space* (unscaled image pixels) and drawn
//! in *view space* (after the current zoom factor is applied). The two spaces
//! get distinct types so a view coordinate can never leak into markup.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Smallest scale reachable through zoom steps (2^-6).
pub const MIN_SCALE: f64 = 1.0 / 64.0;
/// Largest scale reachable through zoom steps (2^6).
pub const MAX_SCALE: f64 = 64.0;

/// A point in document (unscaled, persisted) space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DocPoint {
    pub x: i32,
    pub y: i32,
}

impl DocPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A point in view (scaled, on-screen) space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ViewPoint {
    pub x: i32,
    pub y: i32,
}

impl ViewPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A rectangle in document space. Right and bottom are exclusive.
///
/// Two regions with the same coordinates compare equal; stable identity
/// lives in [`crate::zone::ZoneId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Region {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Region {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Bounding box of two points, independent of their order.
    pub fn from_corners(a: DocPoint, b: DocPoint) -> Self {
        Self {
            left: a.x.min(b.x),
            top: a.y.min(b.y),
            right: a.x.max(b.x),
            bottom: a.y.max(b.y),
        }
    }

    pub const fn width(&self) -> i32 {
        self.right - self.left
    }

    pub const fn height(&self) -> i32 {
        self.bottom - self.top
    }

    pub fn area(&self) -> i64 {
        i64::from(self.width().max(0)) * i64::from(self.height().max(0))
    }

    pub const fn top_left(&self) -> DocPoint {
        DocPoint::new(self.left, self.top)
    }

    pub const fn bottom_right(&self) -> DocPoint {
        DocPoint::new(self.right, self.bottom)
    }

    /// Corners in the order top-left, top-right, bottom-left, bottom-right.
    pub const fn corners(&self) -> [DocPoint; 4] {
        [
            DocPoint::new(self.left, self.top),
            DocPoint::new(self.right, self.top),
            DocPoint::new(self.left, self.bottom),
            DocPoint::new(self.right, self.bottom),
        ]
    }

    /// The corner diagonally opposite to `corner`.
    pub const fn opposite(&self, corner: DocPoint) -> DocPoint {
        let x = if corner.x == self.left {
            self.right
        } else {
            self.left
        };
        let y = if corner.y == self.top {
            self.bottom
        } else {
            self.top
        };
        DocPoint::new(x, y)
    }

    /// Half-open point containment.
    pub const fn contains_point(&self, p: DocPoint) -> bool {
        p.x >= self.left && p.x < self.right && p.y >= self.top && p.y < self.bottom
    }

    /// Whether `other` lies entirely inside `self` (edges may touch).
    pub const fn contains(&self, other: &Self) -> bool {
        self.width() >= 0
            && self.height() >= 0
            && other.width() >= 0
            && other.height() >= 0
            && other.left >= self.left
            && other.top >= self.top
            && other.right <= self.right
            && other.bottom <= self.bottom
    }

    pub fn union(&self, other: &Self) -> Self {
        Self {
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }

    pub const fn inflate(&self, by: i32) -> Self {
        Self {
            left: self.left - by,
            top: self.top - by,
            right: self.right + by,
            bottom: self.bottom + by,
        }
    }

    pub const fn translate(&self, dx: i32, dy: i32) -> Self {
        Self {
            left: self.left + dx,
            top: self.top + dy,
            right: self.right + dx,
            bottom: self.bottom + dy,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.left, self.top, self.right, self.bottom)
    }
}

/// Failure to read a `left,top,right,bottom` tuple.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseRegionError {
    #[error("expected 4 comma-separated coordinates, found {0}")]
    Arity(usize),
    #[error("invalid coordinate {0:?}")]
    Coordinate(String),
}

impl FromStr for Region {
    type Err = ParseRegionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(ParseRegionError::Arity(parts.len()));
        }
        let mut values = [0i32; 4];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|_| ParseRegionError::Coordinate((*part).to_string()))?;
        }
        let [left, top, right, bottom] = values;
        Ok(Self::new(left, top, right, bottom))
    }
}

/// A rectangle in view space. Right and bottom are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ViewRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl ViewRect {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Square box reaching `half` view units out from `p` on every side.
    pub const fn around(p: ViewPoint, half: i32) -> Self {
        Self::new(p.x - half, p.y - half, p.x + half, p.y + half)
    }

    pub const fn width(&self) -> i32 {
        self.right - self.left
    }

    pub const fn height(&self) -> i32 {
        self.bottom - self.top
    }

    pub const fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    /// Overlap test that treats zero-sized outlines as one unit thick.
    pub const fn touches(&self, other: &Self) -> bool {
        self.left <= other.right
            && other.left <= self.right
            && self.top <= other.bottom
            && other.top <= self.bottom
    }

    pub fn union(&self, other: &Self) -> Self {
        Self {
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ScaleError {
    #[error("scale must be a positive finite number, got {0}")]
    NotPositive(f64),
}

/// Uniform document ↔ view mapping.
///
/// Rectangles are converted corner by corner so that neighbouring zones
/// sharing an edge keep sharing it after rounding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleTransform {
    scale: f64,
}

impl Default for ScaleTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl ScaleTransform {
    pub const fn identity() -> Self {
        Self { scale: 1.0 }
    }

    /// Build a transform at `2^exponent`, clamped to the zoom range.
    pub fn from_exponent(exponent: i32) -> Self {
        Self {
            scale: 2f64.powi(exponent).clamp(MIN_SCALE, MAX_SCALE),
        }
    }

    /// # Errors
    /// Returns [`ScaleError::NotPositive`] for zero, negative or non-finite input.
    pub fn new(scale: f64) -> Result<Self, ScaleError> {
        let mut transform = Self::identity();
        transform.set_scale(scale)?;
        Ok(transform)
    }

    pub const fn scale(&self) -> f64 {
        self.scale
    }

    /// # Errors
    /// Returns [`ScaleError::NotPositive`] for zero, negative or non-finite input.
    pub fn set_scale(&mut self, scale: f64) -> Result<(), ScaleError> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(ScaleError::NotPositive(scale));
        }
        self.scale = scale.clamp(MIN_SCALE, MAX_SCALE);
        Ok(())
    }

    /// Double the scale. Returns false when already at the maximum.
    pub fn zoom_in(&mut self) -> bool {
        let next = (self.scale * 2.0).min(MAX_SCALE);
        let changed = next > self.scale;
        self.scale = next;
        changed
    }

    /// Halve the scale. Returns false when already at the minimum.
    pub fn zoom_out(&mut self) -> bool {
        let next = (self.scale / 2.0).max(MIN_SCALE);
        let changed = next < self.scale;
        self.scale = next;
        changed
    }

    pub fn to_view(&self, p: DocPoint) -> ViewPoint {
        ViewPoint::new(mul(p.x, self.scale), mul(p.y, self.scale))
    }

    pub fn to_document(&self, p: ViewPoint) -> DocPoint {
        DocPoint::new(div(p.x, self.scale), div(p.y, self.scale))
    }

    pub fn region_to_view(&self, r: Region) -> ViewRect {
        let tl = self.to_view(r.top_left());
        let br = self.to_view(r.bottom_right());
        ViewRect::new(tl.x, tl.y, br.x, br.y)
    }

    pub fn rect_to_document(&self, r: ViewRect) -> Region {
        let tl = self.to_document(ViewPoint::new(r.left, r.top));
        let br = self.to_document(ViewPoint::new(r.right, r.bottom));
        Region::new(tl.x, tl.y, br.x, br.y)
    }

    /// A view-space length expressed in document units, never below one.
    pub fn to_document_len(&self, len: i32) -> i32 {
        div(len, self.scale).max(1)
    }

    pub fn to_view_len(&self, len: i32) -> i32 {
        mul(len, self.scale)
    }
}

// `as` truncates toward zero and saturates at the i32 bounds.
#[allow(clippy::cast_possible_truncation)]
fn mul(v: i32, factor: f64) -> i32 {
    (f64::from(v) * factor) as i32
}

#[allow(clippy::cast_possible_truncation)]
fn div(v: i32, factor: f64) -> i32 {
    (f64::from(v) / factor) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_from_corners_normalizes_any_drag_direction() {
        let a = DocPoint::new(30, 5);
        let b = DocPoint::new(10, 25);
        assert_eq!(Region::from_corners(a, b), Region::new(10, 5, 30, 25));
        assert_eq!(Region::from_corners(b, a), Region::new(10, 5, 30, 25));
    }

    #[test]
    fn test_opposite_corner() {
        let r = Region::new(0, 0, 10, 20);
        assert_eq!(r.opposite(DocPoint::new(10, 20)), DocPoint::new(0, 0));
        assert_eq!(r.opposite(DocPoint::new(0, 20)), DocPoint::new(10, 0));
        assert_eq!(r.opposite(DocPoint::new(10, 0)), DocPoint::new(0, 20));
    }

    #[test]
    fn test_contains_point_is_half_open() {
        let r = Region::new(0, 0, 10, 10);
        assert!(r.contains_point(DocPoint::new(0, 0)));
        assert!(r.contains_point(DocPoint::new(9, 9)));
        assert!(!r.contains_point(DocPoint::new(10, 5)));
    }

    #[test]
    fn test_contains_region_allows_touching_edges() {
        let outer = Region::new(0, 0, 100, 100);
        assert!(outer.contains(&Region::new(0, 0, 100, 100)));
        assert!(outer.contains(&Region::new(10, 10, 20, 20)));
        assert!(!outer.contains(&Region::new(90, 90, 110, 100)));
    }

    #[test]
    fn test_parse_tuple() {
        let r: Region = "25,25,180,60".parse().unwrap();
        assert_eq!(r, Region::new(25, 25, 180, 60));
        assert_eq!(r.to_string(), "25,25,180,60");
    }

    #[test]
    fn test_parse_tuple_rejects_short_or_garbage() {
        assert_eq!("1,2,3".parse::<Region>(), Err(ParseRegionError::Arity(3)));
        assert!(matches!(
            "1,2,x,4".parse::<Region>(),
            Err(ParseRegionError::Coordinate(_))
        ));
    }

    #[test]
    fn test_to_view_truncates_toward_zero() {
        let t = ScaleTransform::new(0.5).unwrap();
        assert_eq!(t.to_view(DocPoint::new(7, -7)), ViewPoint::new(3, -3));
        assert_eq!(t.to_document(ViewPoint::new(3, 3)), DocPoint::new(6, 6));
    }

    #[test]
    fn test_region_conversion_goes_through_corners() {
        let t = ScaleTransform::new(0.5).unwrap();
        let left = Region::new(0, 0, 7, 4);
        let right = Region::new(7, 0, 12, 4);
        let lv = t.region_to_view(left);
        let rv = t.region_to_view(right);
        assert_eq!(lv.right, rv.left);
    }

    #[test]
    fn test_zoom_steps_double_and_halve() {
        let mut t = ScaleTransform::identity();
        assert!(t.zoom_in());
        assert!((t.scale() - 2.0).abs() < f64::EPSILON);
        assert!(t.zoom_out());
        assert!(t.zoom_out());
        assert!((t.scale() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zoom_stops_at_bounds() {
        let mut t = ScaleTransform::from_exponent(6);
        assert!(!t.zoom_in());
        let mut t = ScaleTransform::from_exponent(-6);
        assert!(!t.zoom_out());
        assert!(t.scale() > 0.0);
    }

    #[test]
    fn test_set_scale_rejects_non_positive() {
        let mut t = ScaleTransform::identity();
        assert!(t.set_scale(0.0).is_err());
        assert!(t.set_scale(-2.0).is_err());
        assert!(t.set_scale(f64::NAN).is_err());
        assert!((t.scale() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_document_len_never_zero() {
        let t = ScaleTransform::new(16.0).unwrap();
        assert_eq!(t.to_document_len(5), 1);
        let t = ScaleTransform::new(0.25).unwrap();
        assert_eq!(t.to_document_len(5), 20);
    }
}
