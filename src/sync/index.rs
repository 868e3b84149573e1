use crate::zone::ZoneId;

/// Document-side index: which zone id sits at each zone element ordinal.
///
/// Slots for elements whose coordinates could not be read stay `None` so
/// ordinals keep matching the document. The index is a hint: every lookup
/// is checked against the live markup before it is trusted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZoneIndex {
    slots: Vec<Option<ZoneId>>,
}

impl ZoneIndex {
    pub const fn from_slots(slots: Vec<Option<ZoneId>>) -> Self {
        Self { slots }
    }

    pub fn ordinal_of(&self, id: ZoneId) -> Option<usize> {
        self.slots.iter().position(|slot| *slot == Some(id))
    }

    pub fn id_at(&self, ordinal: usize) -> Option<ZoneId> {
        self.slots.get(ordinal).copied().flatten()
    }

    /// Record a newly inserted element. Ordinals past the end append.
    pub fn insert(&mut self, ordinal: usize, id: ZoneId) {
        let ordinal = ordinal.min(self.slots.len());
        self.slots.insert(ordinal, Some(id));
    }

    pub fn remove(&mut self, ordinal: usize) -> Option<ZoneId> {
        (ordinal < self.slots.len())
            .then(|| self.slots.remove(ordinal))
            .flatten()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Region;
    use crate::zone::{DecoratorOptions, RegionDecorator};

    fn ids(n: usize) -> Vec<ZoneId> {
        let mut dec = RegionDecorator::new(DecoratorOptions::default());
        dec.set_regions(vec![Region::default(); n])
    }

    #[test]
    fn test_lookup_both_ways() {
        let ids = ids(2);
        let index = ZoneIndex::from_slots(vec![Some(ids[0]), None, Some(ids[1])]);
        assert_eq!(index.ordinal_of(ids[1]), Some(2));
        assert_eq!(index.id_at(1), None);
        assert_eq!(index.id_at(9), None);
    }

    #[test]
    fn test_insert_shifts_later_ordinals() {
        let ids = ids(3);
        let mut index = ZoneIndex::from_slots(vec![Some(ids[0]), Some(ids[1])]);
        index.insert(1, ids[2]);
        assert_eq!(index.ordinal_of(ids[1]), Some(2));
        index.insert(99, ids[0]);
        assert_eq!(index.len(), 4);
    }

    #[test]
    fn test_remove_out_of_range_is_none() {
        let ids = ids(1);
        let mut index = ZoneIndex::from_slots(vec![Some(ids[0])]);
        assert_eq!(index.remove(3), None);
        assert_eq!(index.remove(0), Some(ids[0]));
        assert!(index.is_empty());
    }
}
