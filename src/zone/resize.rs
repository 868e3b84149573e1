use crate::geometry::{DocPoint, Region};

use super::ZoneId;

/// Rectangles narrower than this are dropped when a new-zone drag ends.
pub const MIN_NEW_WIDTH: i32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Left or right edge: only x moves.
    Horizontal,
    /// Top or bottom edge: only y moves.
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleKind {
    Corner,
    Side(Axis),
}

/// Find the handle of `region` within `tolerance` of `p`.
///
/// Corners are tried first, in the order top-left, top-right, bottom-left,
/// bottom-right. Edge midpoints are only considered when `side_handles` is on.
pub fn hit_handle(
    region: &Region,
    p: DocPoint,
    tolerance: i32,
    side_handles: bool,
) -> Option<(HandleKind, DocPoint)> {
    let near = |h: DocPoint| (h.x - p.x).abs() < tolerance && (h.y - p.y).abs() < tolerance;

    if let Some(corner) = region.corners().into_iter().find(|c| near(*c)) {
        return Some((HandleKind::Corner, corner));
    }
    if !side_handles {
        return None;
    }
    let mid_x = region.left + region.width() / 2;
    let mid_y = region.top + region.height() / 2;
    [
        (Axis::Vertical, DocPoint::new(mid_x, region.top)),
        (Axis::Horizontal, DocPoint::new(region.right, mid_y)),
        (Axis::Horizontal, DocPoint::new(region.left, mid_y)),
        (Axis::Vertical, DocPoint::new(mid_x, region.bottom)),
    ]
    .into_iter()
    .find(|(_, h)| near(*h))
    .map(|(axis, h)| (HandleKind::Side(axis), h))
}

/// State of one live drag. Each pointer step derives a new session; the
/// previous one is never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeSession {
    id: ZoneId,
    kind: HandleKind,
    anchor: DocPoint,
    handle: DocPoint,
    original: Option<Region>,
    current: Region,
}

/// What a finished drag turned into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeOutcome {
    Updated {
        id: ZoneId,
        original: Region,
        updated: Region,
    },
    Created {
        id: ZoneId,
        region: Region,
    },
    Discarded {
        id: ZoneId,
        region: Region,
    },
}

impl ResizeSession {
    /// Start resizing `region` from one of its handles.
    pub fn grab(id: ZoneId, region: Region, kind: HandleKind, handle: DocPoint) -> Self {
        let anchor = match kind {
            HandleKind::Corner => region.opposite(handle),
            HandleKind::Side(Axis::Horizontal) => {
                let x = if handle.x == region.left {
                    region.right
                } else {
                    region.left
                };
                DocPoint::new(x, region.top)
            }
            HandleKind::Side(Axis::Vertical) => {
                let y = if handle.y == region.top {
                    region.bottom
                } else {
                    region.top
                };
                DocPoint::new(region.left, y)
            }
        };
        Self {
            id,
            kind,
            anchor,
            handle,
            original: Some(region),
            current: region,
        }
    }

    /// Start drawing a brand new zone at `at`.
    pub fn create(id: ZoneId, at: DocPoint) -> Self {
        Self {
            id,
            kind: HandleKind::Corner,
            anchor: at,
            handle: at,
            original: None,
            current: Region::from_corners(at, at),
        }
    }

    /// The session after the handle moved to `pointer`.
    #[must_use]
    pub fn drag_to(&self, pointer: DocPoint) -> Self {
        let current = match (self.kind, self.original) {
            (HandleKind::Side(Axis::Horizontal), Some(base)) => Region {
                left: self.anchor.x.min(pointer.x),
                right: self.anchor.x.max(pointer.x),
                ..base
            },
            (HandleKind::Side(Axis::Vertical), Some(base)) => Region {
                top: self.anchor.y.min(pointer.y),
                bottom: self.anchor.y.max(pointer.y),
                ..base
            },
            _ => Region::from_corners(self.anchor, pointer),
        };
        Self {
            handle: pointer,
            current,
            ..*self
        }
    }

    pub const fn id(&self) -> ZoneId {
        self.id
    }

    pub const fn kind(&self) -> HandleKind {
        self.kind
    }

    pub const fn anchor(&self) -> DocPoint {
        self.anchor
    }

    pub const fn handle(&self) -> DocPoint {
        self.handle
    }

    pub const fn original(&self) -> Option<Region> {
        self.original
    }

    pub const fn current(&self) -> Region {
        self.current
    }

    pub const fn is_new(&self) -> bool {
        self.original.is_none()
    }

    /// End the drag.
    pub const fn finish(self) -> ResizeOutcome {
        match self.original {
            Some(original) => ResizeOutcome::Updated {
                id: self.id,
                original,
                updated: self.current,
            },
            None if self.current.width() > MIN_NEW_WIDTH => ResizeOutcome::Created {
                id: self.id,
                region: self.current,
            },
            None => ResizeOutcome::Discarded {
                id: self.id,
                region: self.current,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const ID: ZoneId = ZoneId(7);

    #[test]
    fn test_corner_hit_uses_strict_tolerance() {
        let r = Region::new(10, 10, 50, 50);
        assert_eq!(
            hit_handle(&r, DocPoint::new(54, 54), 5, false),
            Some((HandleKind::Corner, DocPoint::new(50, 50)))
        );
        assert_eq!(hit_handle(&r, DocPoint::new(55, 50), 5, false), None);
    }

    #[test]
    fn test_side_handles_disabled_by_default() {
        let r = Region::new(0, 0, 40, 40);
        assert_eq!(hit_handle(&r, DocPoint::new(20, 0), 5, false), None);
        assert_eq!(
            hit_handle(&r, DocPoint::new(20, 1), 5, true),
            Some((HandleKind::Side(Axis::Vertical), DocPoint::new(20, 0)))
        );
    }

    #[test]
    fn test_grab_corner_anchors_opposite_corner() {
        let r = Region::new(25, 25, 180, 60);
        let s = ResizeSession::grab(ID, r, HandleKind::Corner, DocPoint::new(180, 60));
        assert_eq!(s.anchor(), DocPoint::new(25, 25));
        let s = s.drag_to(DocPoint::new(190, 70));
        assert_eq!(s.current(), Region::new(25, 25, 190, 70));
    }

    #[test]
    fn test_drag_past_anchor_flips_without_negative_size() {
        let r = Region::new(10, 10, 20, 20);
        let s = ResizeSession::grab(ID, r, HandleKind::Corner, DocPoint::new(20, 20))
            .drag_to(DocPoint::new(0, 5));
        assert_eq!(s.current(), Region::new(0, 5, 10, 10));
        assert!(s.current().width() >= 0 && s.current().height() >= 0);
    }

    #[test]
    fn test_side_drag_keeps_other_axis() {
        let r = Region::new(10, 10, 20, 20);
        let s = ResizeSession::grab(
            ID,
            r,
            HandleKind::Side(Axis::Horizontal),
            DocPoint::new(20, 15),
        )
        .drag_to(DocPoint::new(35, 90));
        assert_eq!(s.current(), Region::new(10, 10, 35, 20));
    }

    #[test]
    fn test_finish_resize_always_reports_update() {
        let r = Region::new(0, 0, 10, 10);
        let s = ResizeSession::grab(ID, r, HandleKind::Corner, DocPoint::new(10, 10));
        assert_eq!(
            s.finish(),
            ResizeOutcome::Updated {
                id: ID,
                original: r,
                updated: r
            }
        );
    }

    #[test]
    fn test_finish_new_zone_threshold() {
        let s = ResizeSession::create(ID, DocPoint::new(5, 5)).drag_to(DocPoint::new(6, 40));
        assert!(matches!(s.finish(), ResizeOutcome::Discarded { .. }));

        let s = ResizeSession::create(ID, DocPoint::new(5, 5)).drag_to(DocPoint::new(7, 40));
        assert_eq!(
            s.finish(),
            ResizeOutcome::Created {
                id: ID,
                region: Region::new(5, 5, 7, 40)
            }
        );
    }

    proptest! {
        #[test]
        fn drag_normalizes_in_both_directions(
            ax in -500i32..500, ay in -500i32..500,
            bx in -500i32..500, by in -500i32..500,
        ) {
            let a = DocPoint::new(ax, ay);
            let b = DocPoint::new(bx, by);
            let forward = ResizeSession::create(ID, a).drag_to(b).current();
            let backward = ResizeSession::create(ID, b).drag_to(a).current();
            prop_assert_eq!(forward, backward);
            prop_assert_eq!(forward.left, ax.min(bx));
            prop_assert_eq!(forward.top, ay.min(by));
            prop_assert_eq!(forward.width(), (ax - bx).abs());
            prop_assert_eq!(forward.height(), (ay - by).abs());
        }
    }
}
