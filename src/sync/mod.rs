//! Keeping zones and their markup in step.
//!
//! Forward: [`ZoneEvent`]s from the decorator become minimal text edits.
//! Reverse: the zone set is rebuilt from the markup after edits settle, and
//! the zone under the caret becomes active.
//!
//! Text locations are never cached. Every operation re-queries the document
//! and converts line/column ranges to offsets right before using them.

mod guard;
mod index;

pub use guard::{EditScope, SelfEditFlag};
pub use index::ZoneIndex;

use std::sync::mpsc::Sender;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::document::{BoundsError, DocumentAccess, DocumentNotice, Listener, QueryError};
use crate::geometry::Region;
use crate::markup::{
    TextEdit, TextRange, ZoneQuery, parse_tuples, plan_attribute_edits, zone_element,
};
use crate::zone::{RegionDecorator, Zone, ZoneEvent, ZoneId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("query failed: {0}")]
    Query(#[from] QueryError),
    #[error("no markup found for zone {0}")]
    LocationNotFound(Region),
    #[error("edit out of bounds: {0}")]
    Bounds(#[from] BoundsError),
    #[error("nowhere to insert the new zone: no neighbouring zone or image reference")]
    InsertAnchorMissing,
}

/// Apply edits from the last to the first so that each edit's offsets are
/// still valid when it runs. Returns the total change in length.
///
/// # Errors
///
/// Stops at the first edit that falls outside the buffer.
pub fn apply_in_reverse(
    doc: &mut dyn DocumentAccess,
    edits: &[TextEdit],
) -> Result<isize, BoundsError> {
    let mut ordered: Vec<&TextEdit> = edits.iter().collect();
    ordered.sort_by_key(|edit| std::cmp::Reverse(edit.start));
    let mut delta = 0;
    for edit in ordered {
        doc.delete_text(edit.start, edit.end)?;
        doc.insert_text(edit.start, &edit.text)?;
        delta += edit.delta();
    }
    Ok(delta)
}

/// Mirrors zone events into the markup and rebuilds zones from it.
#[derive(Debug, Default)]
pub struct MarkupSynchronizer {
    index: ZoneIndex,
    self_edit: SelfEditFlag,
    /// File name of the loaded image, used to find the fallback insertion
    /// anchor.
    image_name: Option<String>,
}

impl MarkupSynchronizer {
    pub fn new(image_name: Option<String>) -> Self {
        Self {
            image_name,
            ..Self::default()
        }
    }

    pub fn image_name(&self) -> Option<&str> {
        self.image_name.as_deref()
    }

    pub fn self_edit_flag(&self) -> SelfEditFlag {
        self.self_edit.clone()
    }

    pub const fn index(&self) -> &ZoneIndex {
        &self.index
    }

    /// A document listener that forwards notices to `sink`, except those
    /// caused by the synchronizer's own edits.
    pub fn forwarder(&self, sink: Sender<DocumentNotice>) -> Listener {
        let flag = self.self_edit.clone();
        Box::new(move |notice| {
            if !flag.is_set() {
                // The receiver only goes away during shutdown.
                let _ = sink.send(*notice);
            }
        })
    }

    /// Rebuild every zone from the markup.
    ///
    /// On a query failure the decorator is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Query`] when the zone list cannot be evaluated.
    pub fn reload(
        &mut self,
        doc: &dyn DocumentAccess,
        decorator: &mut RegionDecorator,
    ) -> Result<usize, SyncError> {
        let tuples = doc.evaluate(&ZoneQuery::Zones)?;
        let parsed = parse_tuples(&tuples);
        let ids = decorator.set_regions(parsed.iter().flatten().copied().collect());
        let count = ids.len();
        let mut ids = ids.into_iter();
        self.index = ZoneIndex::from_slots(
            parsed
                .iter()
                .map(|slot| slot.and_then(|_| ids.next()))
                .collect(),
        );
        info!(zones = count, elements = tuples.len(), "zones reloaded");
        Ok(count)
    }

    /// Make the zone enclosing the caret active.
    ///
    /// Returns the zone that became active. With the caret outside every
    /// zone the active zone is left as it was.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Query`] when the enclosing zone cannot be queried.
    pub fn sync_caret(
        &mut self,
        doc: &dyn DocumentAccess,
        decorator: &mut RegionDecorator,
    ) -> Result<Option<ZoneId>, SyncError> {
        let tuples = doc.evaluate(&ZoneQuery::EnclosingZone)?;
        let Some(tuple) = tuples.first() else {
            return Ok(None);
        };
        let region: Region = match tuple.parse() {
            Ok(region) => region,
            Err(err) => {
                debug!(%tuple, %err, "caret is in a zone with unreadable coordinates");
                return Ok(None);
            }
        };
        let here = doc.find_ranges(&ZoneQuery::EnclosingZone)?;
        let all = doc.find_ranges(&ZoneQuery::Zones)?;
        let id = here
            .first()
            .and_then(|range| all.iter().position(|r| r == range))
            .and_then(|ordinal| self.index.id_at(ordinal))
            .filter(|id| decorator.zone(*id).is_some_and(|z| z.region == region))
            .or_else(|| decorator.find_by_region(region));
        if let Some(id) = id {
            decorator.set_active(Some(id));
        }
        Ok(id)
    }

    /// Mirror one zone event into the markup.
    ///
    /// Failures leave the visible state as it was: a zone whose markup could
    /// not be removed is put back into the decorator.
    ///
    /// # Errors
    ///
    /// Any [`SyncError`]; the document is unchanged unless an edit failed
    /// half way, in which case the partial edit is still one undo step.
    pub fn apply(
        &mut self,
        doc: &mut dyn DocumentAccess,
        decorator: &mut RegionDecorator,
        event: &ZoneEvent,
    ) -> Result<(), SyncError> {
        let result = match *event {
            ZoneEvent::Updated {
                id,
                original,
                updated,
            } => self.update_zone(doc, id, original, updated),
            ZoneEvent::Added {
                id,
                region,
                closest,
            } => self.insert_zone(doc, id, region, closest),
            ZoneEvent::Removed { zone } => self.remove_zone(doc, zone),
        };
        match (&result, event) {
            (Err(err), ZoneEvent::Removed { zone }) => {
                warn!(%err, zone = %zone.id, "remove failed, keeping zone");
                decorator.restore(*zone);
            }
            (Err(err), _) => warn!(%err, ?event, "markup sync failed"),
            (Ok(()), ZoneEvent::Updated { id, .. } | ZoneEvent::Added { id, .. }) => {
                decorator.set_active(Some(*id));
            }
            (Ok(()), ZoneEvent::Removed { .. }) => {}
        }
        result
    }

    fn update_zone(
        &mut self,
        doc: &mut dyn DocumentAccess,
        id: ZoneId,
        original: Region,
        updated: Region,
    ) -> Result<(), SyncError> {
        if original == updated {
            debug!(zone = %id, "resize without movement, markup untouched");
            return Ok(());
        }
        let ordinal = self.locate(doc, id, original)?;
        let ranges = doc.find_ranges(&ZoneQuery::coordinates(ZoneQuery::NthZone(ordinal)))?;
        let (Some(first), Some(last)) = (ranges.first(), ranges.last()) else {
            return Err(SyncError::LocationNotFound(original));
        };

        let mut attrs = Vec::with_capacity(ranges.len());
        for range in &ranges {
            let (start, end) = doc.offsets(range)?;
            attrs.push((start, end, doc.text(start, end)?));
        }
        let edits = plan_attribute_edits(&attrs, updated);
        if edits.is_empty() {
            debug!(zone = %id, "markup already matches");
            return Ok(());
        }
        let select_start = doc.offset_of(first.start())?;
        let select_end = doc.offset_of(last.end())?;

        let mut scope = EditScope::open(doc, &self.self_edit);
        let delta = apply_in_reverse(&mut *scope, &edits)?;
        scope.select(select_start, select_end.saturating_add_signed(delta))?;
        debug!(zone = %id, %original, %updated, edits = edits.len(), "zone markup updated");
        Ok(())
    }

    fn insert_zone(
        &mut self,
        doc: &mut dyn DocumentAccess,
        id: ZoneId,
        region: Region,
        closest: Option<Zone>,
    ) -> Result<(), SyncError> {
        let anchor = self.insert_anchor(doc, closest)?;
        let at = doc.offset_of(anchor.end())?;
        let line_start = doc.line_start_offset(anchor.start_line)?;
        let indent: String = doc
            .text(line_start, doc.offset_of(anchor.start())?)?
            .chars()
            .take_while(|c| c.is_whitespace())
            .collect();
        let text = format!("\n{indent}{}", zone_element(region));

        let mut scope = EditScope::open(doc, &self.self_edit);
        scope.insert_text(at, &text)?;

        // Locate the new element again: its position is only known once the
        // text is in.
        let mut inserted = None;
        for range in scope.find_ranges(&ZoneQuery::ZoneAt(region))? {
            let offsets = scope.offsets(&range)?;
            if offsets.0 >= at {
                inserted = Some((range, offsets));
                break;
            }
        }
        let Some((range, (start, end))) = inserted else {
            return Err(SyncError::LocationNotFound(region));
        };
        scope.select(start, end)?;
        let ordinal = scope
            .find_ranges(&ZoneQuery::Zones)?
            .iter()
            .filter(|r| r.start() < range.start())
            .count();
        drop(scope);

        self.index.insert(ordinal, id);
        debug!(zone = %id, %region, ordinal, "zone markup inserted");
        Ok(())
    }

    fn remove_zone(&mut self, doc: &mut dyn DocumentAccess, zone: Zone) -> Result<(), SyncError> {
        let ordinal = self.locate(doc, zone.id, zone.region)?;
        let range = doc
            .find_ranges(&ZoneQuery::NthZone(ordinal))?
            .first()
            .copied()
            .ok_or(SyncError::LocationNotFound(zone.region))?;
        let (start, end) = doc.offsets(&range)?;

        let mut scope = EditScope::open(doc, &self.self_edit);
        scope.delete_text(start, end)?;
        drop(scope);

        self.index.remove(ordinal);
        debug!(zone = %zone.id, region = %zone.region, "zone markup removed");
        Ok(())
    }

    /// Where new markup goes: after the closest zone's element, else after
    /// the image reference.
    fn insert_anchor(
        &self,
        doc: &dyn DocumentAccess,
        closest: Option<Zone>,
    ) -> Result<TextRange, SyncError> {
        if let Some(zone) = closest {
            match self.locate(doc, zone.id, zone.region) {
                Ok(ordinal) => {
                    if let Some(range) = doc.find_ranges(&ZoneQuery::NthZone(ordinal))?.first() {
                        return Ok(*range);
                    }
                }
                Err(SyncError::LocationNotFound(_)) => {
                    debug!(zone = %zone.id, "closest zone has no markup, trying image reference");
                }
                Err(err) => return Err(err),
            }
        }
        if let Some(name) = &self.image_name
            && let Some(range) = doc
                .find_ranges(&ZoneQuery::GraphicByUrl(name.clone()))?
                .first()
        {
            return Ok(*range);
        }
        Err(SyncError::InsertAnchorMissing)
    }

    /// Document ordinal of a zone's element.
    ///
    /// The index is tried first and trusted only if the element there still
    /// reads `region`; otherwise the first element with those coordinates
    /// wins.
    fn locate(
        &self,
        doc: &dyn DocumentAccess,
        id: ZoneId,
        region: Region,
    ) -> Result<usize, SyncError> {
        let regions: Vec<Option<Region>> = doc
            .evaluate(&ZoneQuery::Zones)?
            .iter()
            .map(|tuple| tuple.parse().ok())
            .collect();
        if let Some(ordinal) = self.index.ordinal_of(id)
            && regions.get(ordinal).copied().flatten() == Some(region)
        {
            return Ok(ordinal);
        }
        let ordinal = regions
            .iter()
            .position(|r| *r == Some(region))
            .ok_or(SyncError::LocationNotFound(region))?;
        debug!(zone = %id, ordinal, "zone located by coordinates");
        Ok(ordinal)
    }
}
