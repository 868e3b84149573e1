use std::cell::Cell;
use std::ops::{Deref, DerefMut};
use std::rc::Rc;

use crate::document::DocumentAccess;

/// Shared "the synchronizer is editing" marker.
///
/// Listeners hold a clone and ignore notices while it is set, so programmatic
/// edits never re-arm the reload or caret timers.
#[derive(Debug, Clone, Default)]
pub struct SelfEditFlag(Rc<Cell<u32>>);

impl SelfEditFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_set(&self) -> bool {
        self.0.get() > 0
    }
}

/// One programmatic edit: an open undo group with the self-edit flag raised.
///
/// Dropping the scope closes the group and lowers the flag, whichever way
/// the edit ends.
pub struct EditScope<'a> {
    doc: &'a mut dyn DocumentAccess,
    flag: SelfEditFlag,
}

impl<'a> EditScope<'a> {
    pub fn open(doc: &'a mut dyn DocumentAccess, flag: &SelfEditFlag) -> Self {
        flag.0.set(flag.0.get() + 1);
        doc.begin_edit_group();
        Self {
            doc,
            flag: flag.clone(),
        }
    }
}

impl<'a> Deref for EditScope<'a> {
    type Target = dyn DocumentAccess + 'a;

    fn deref(&self) -> &Self::Target {
        &*self.doc
    }
}

impl DerefMut for EditScope<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.doc
    }
}

impl Drop for EditScope<'_> {
    fn drop(&mut self) {
        self.doc.end_edit_group();
        let depth = self.flag.0.get();
        self.flag.0.set(depth.saturating_sub(1));
    }
}
