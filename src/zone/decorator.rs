use tracing::debug;

use crate::geometry::{DocPoint, Region, ScaleTransform, ViewPoint, ViewRect};

use super::resize::{ResizeOutcome, ResizeSession, hit_handle};
use super::{PaintOp, PaintStyle, Zone, ZoneEvent, ZoneId};

/// Half size, in view units, of the square drawn around a drag handle.
const HINT_HALF: i32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoratorOptions {
    /// Handle hit tolerance in view units. Converted to document units at
    /// the current scale so handles keep the same on-screen size.
    pub tolerance: i32,
    pub side_handles: bool,
}

impl Default for DecoratorOptions {
    fn default() -> Self {
        Self {
            tolerance: 5,
            side_handles: false,
        }
    }
}

/// Owns the zones painted over the image and turns pointer input into
/// [`ZoneEvent`]s.
///
/// Damage is recorded in document space and only converted to view space
/// when taken, so a zoom change never leaves stale view rectangles behind.
#[derive(Debug, Default)]
pub struct RegionDecorator {
    zones: Vec<Zone>,
    active: Option<ZoneId>,
    session: Option<ResizeSession>,
    hover: Option<DocPoint>,
    next_id: u64,
    events: Vec<ZoneEvent>,
    damage: Vec<Region>,
    options: DecoratorOptions,
}

impl RegionDecorator {
    pub fn new(options: DecoratorOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub const fn options(&self) -> DecoratorOptions {
        self.options
    }

    /// Replace every zone. Returns the ids assigned, in input order.
    ///
    /// Any live drag is abandoned since the zone it refers to is gone.
    pub fn set_regions(&mut self, regions: Vec<Region>) -> Vec<ZoneId> {
        for zone in &self.zones {
            self.damage.push(zone.region);
        }
        if let Some(session) = self.session.take() {
            debug!(zone = %session.id(), "drag abandoned by zone reload");
        }
        self.active = None;
        self.hover = None;
        self.zones = regions
            .into_iter()
            .map(|region| Zone {
                id: self.mint(),
                region,
            })
            .collect();
        self.damage.extend(self.zones.iter().map(|z| z.region));
        self.zones.iter().map(|z| z.id).collect()
    }

    /// Read-only view of the live zones, in encounter order.
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn zone(&self, id: ZoneId) -> Option<Zone> {
        self.zones.iter().find(|z| z.id == id).copied()
    }

    /// First zone with exactly these coordinates.
    pub fn find_by_region(&self, region: Region) -> Option<ZoneId> {
        self.zones.iter().find(|z| z.region == region).map(|z| z.id)
    }

    pub fn add_region(&mut self, region: Region) -> ZoneId {
        let id = self.mint();
        self.zones.push(Zone { id, region });
        self.damage.push(region);
        id
    }

    /// Put a zone back under its old id, e.g. after its markup could not
    /// be removed.
    pub fn restore(&mut self, zone: Zone) {
        if self.zone(zone.id).is_none() {
            self.zones.push(zone);
            self.damage.push(zone.region);
        }
    }

    pub fn replace_region(&mut self, id: ZoneId, region: Region) -> bool {
        let Some(zone) = self.zones.iter_mut().find(|z| z.id == id) else {
            return false;
        };
        self.damage.push(zone.region);
        self.damage.push(region);
        zone.region = region;
        true
    }

    /// Remove a zone and announce it to the markup side.
    pub fn remove(&mut self, id: ZoneId) -> Option<Zone> {
        let zone = self.detach(id)?;
        self.events.push(ZoneEvent::Removed { zone });
        Some(zone)
    }

    fn detach(&mut self, id: ZoneId) -> Option<Zone> {
        let idx = self.zones.iter().position(|z| z.id == id)?;
        let zone = self.zones.remove(idx);
        self.damage.push(zone.region);
        if self.active == Some(id) {
            self.active = None;
        }
        Some(zone)
    }

    pub const fn active(&self) -> Option<ZoneId> {
        self.active
    }

    pub fn active_zone(&self) -> Option<Zone> {
        self.active.and_then(|id| self.zone(id))
    }

    /// Mark a zone active (or clear). Unknown ids are ignored.
    pub fn set_active(&mut self, id: Option<ZoneId>) -> bool {
        if id.is_some_and(|id| self.zone(id).is_none()) {
            return false;
        }
        if let Some(old) = self.active_zone() {
            self.damage.push(old.region);
        }
        self.active = id;
        if let Some(new) = self.active_zone() {
            self.damage.push(new.region);
        }
        true
    }

    /// Smallest zone containing `p`; nested zones win over their parents.
    pub fn zone_at(&self, p: DocPoint) -> Option<Zone> {
        let mut best: Option<Zone> = None;
        for zone in self.zones.iter().filter(|z| z.region.contains_point(p)) {
            if best.is_none_or(|b| zone.region.area() < b.region.area()) {
                best = Some(*zone);
            }
        }
        best
    }

    /// Insertion anchor for a new zone: the zone starting closest above it.
    ///
    /// Zones that fully contain `region` are skipped. Among the rest the one
    /// with the smallest positive `region.top - zone.top` wins, the first
    /// encountered on ties.
    pub fn closest_to(&self, id: ZoneId, region: Region) -> Option<Zone> {
        self.zones
            .iter()
            .filter(|z| z.id != id && !z.region.contains(&region))
            .filter_map(|z| {
                let delta = region.top - z.region.top;
                (delta > 0).then_some((delta, *z))
            })
            .min_by_key(|(delta, _)| *delta)
            .map(|(_, zone)| zone)
    }

    pub const fn session(&self) -> Option<&ResizeSession> {
        self.session.as_ref()
    }

    pub const fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    pub fn pointer_down(&mut self, at: ViewPoint, scale: &ScaleTransform) {
        let p = scale.to_document(at);
        let tolerance = scale.to_document_len(self.options.tolerance);

        self.set_active(None);
        self.clear_hover(scale);

        let grabbed = self.zones.iter().find_map(|zone| {
            hit_handle(&zone.region, p, tolerance, self.options.side_handles)
                .map(|(kind, handle)| ResizeSession::grab(zone.id, zone.region, kind, handle))
        });
        let session = grabbed.unwrap_or_else(|| {
            let id = self.mint();
            let session = ResizeSession::create(id, p);
            self.zones.push(Zone {
                id,
                region: session.current(),
            });
            session
        });
        debug!(zone = %session.id(), new = session.is_new(), "drag start");
        self.damage.push(session.current());
        self.damage.push(hint_box(session.handle(), scale));
        self.session = Some(session);
    }

    pub fn pointer_drag(&mut self, at: ViewPoint, scale: &ScaleTransform) {
        let Some(old) = self.session else {
            return;
        };
        let next = old.drag_to(scale.to_document(at));
        self.damage.push(hint_box(old.handle(), scale));
        self.damage.push(hint_box(next.handle(), scale));
        self.replace_region(next.id(), next.current());
        self.session = Some(next);
    }

    pub fn pointer_up(&mut self, scale: &ScaleTransform) -> Option<ResizeOutcome> {
        let session = self.session.take()?;
        self.damage.push(hint_box(session.handle(), scale));
        let outcome = session.finish();
        match outcome {
            ResizeOutcome::Updated {
                id,
                original,
                updated,
            } => self.events.push(ZoneEvent::Updated {
                id,
                original,
                updated,
            }),
            ResizeOutcome::Created { id, region } => {
                let closest = self.closest_to(id, region);
                self.events.push(ZoneEvent::Added {
                    id,
                    region,
                    closest,
                });
            }
            ResizeOutcome::Discarded { id, .. } => {
                self.detach(id);
            }
        }
        debug!(?outcome, "drag end");
        Some(outcome)
    }

    /// Pointer moved with no button held: track the handle under it.
    pub fn pointer_moved(&mut self, at: ViewPoint, scale: &ScaleTransform) {
        if self.session.is_some() {
            return;
        }
        let p = scale.to_document(at);
        let tolerance = scale.to_document_len(self.options.tolerance);
        let hover = self.zones.iter().find_map(|zone| {
            hit_handle(&zone.region, p, tolerance, self.options.side_handles).map(|(_, h)| h)
        });
        if hover != self.hover {
            self.clear_hover(scale);
            if let Some(h) = hover {
                self.damage.push(hint_box(h, scale));
            }
            self.hover = hover;
        }
    }

    fn clear_hover(&mut self, scale: &ScaleTransform) {
        if let Some(h) = self.hover.take() {
            self.damage.push(hint_box(h, scale));
        }
    }

    /// Copy a zone just below itself, skipping slots already occupied by an
    /// identical copy. Refused when the copy would leave `bounds`.
    pub fn duplicate(&mut self, id: ZoneId, bounds: Option<Region>) -> Option<ZoneId> {
        let source = self.zone(id)?;
        let step = source.region.height() + 2;
        let mut closest = source;
        let mut copy = source.region.translate(0, step);
        while let Some(existing) = self.zones.iter().find(|z| z.region == copy) {
            closest = *existing;
            copy = copy.translate(0, step);
        }
        if bounds.is_some_and(|b| !b.contains(&copy)) {
            debug!(zone = %id, "duplicate would leave the image");
            return None;
        }
        let new_id = self.add_region(copy);
        self.events.push(ZoneEvent::Added {
            id: new_id,
            region: copy,
            closest: Some(closest),
        });
        Some(new_id)
    }

    /// Outlines and hint markers that intersect `clip`.
    pub fn paint(&self, clip: ViewRect, scale: &ScaleTransform) -> Vec<PaintOp> {
        let mut ops: Vec<PaintOp> = self
            .zones
            .iter()
            .map(|zone| PaintOp {
                rect: scale.region_to_view(zone.region),
                style: if self.active == Some(zone.id) {
                    PaintStyle::Active
                } else {
                    PaintStyle::Outline
                },
            })
            .filter(|op| op.rect.touches(&clip))
            .collect();

        let handle = self.session.map(|s| s.handle()).or(self.hover);
        if let Some(h) = handle {
            let rect = ViewRect::around(scale.to_view(h), HINT_HALF);
            if rect.touches(&clip) {
                ops.push(PaintOp {
                    rect,
                    style: PaintStyle::Hint,
                });
            }
        }
        ops
    }

    /// Drain zone events produced since the last call.
    pub fn take_events(&mut self) -> Vec<ZoneEvent> {
        std::mem::take(&mut self.events)
    }

    /// Drain the view-space boxes that need repainting.
    ///
    /// Each box is grown by one unit so the outline stroke is included.
    pub fn take_damage(&mut self, scale: &ScaleTransform) -> Vec<ViewRect> {
        std::mem::take(&mut self.damage)
            .into_iter()
            .map(|r| {
                let v = scale.region_to_view(r);
                ViewRect::new(v.left - 1, v.top - 1, v.right + 1, v.bottom + 1)
            })
            .collect()
    }

    fn mint(&mut self) -> ZoneId {
        self.next_id += 1;
        ZoneId(self.next_id)
    }
}

fn hint_box(handle: DocPoint, scale: &ScaleTransform) -> Region {
    let half = scale.to_document_len(HINT_HALF);
    Region::new(
        handle.x - half,
        handle.y - half,
        handle.x + half,
        handle.y + half,
    )
}
