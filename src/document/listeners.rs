use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use super::DocumentNotice;

pub type Listener = Box<dyn FnMut(&DocumentNotice)>;

#[derive(Default)]
struct Registry {
    listeners: RefCell<Vec<(u64, Listener)>>,
    /// Ids whose subscription was dropped while a notification was running.
    retired: RefCell<Vec<u64>>,
    next_id: Cell<u64>,
}

/// Listener list owned by a document.
#[derive(Default, Clone)]
pub struct ListenerRegistry {
    inner: Rc<Registry>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: Listener) -> Subscription {
        let id = self.inner.next_id.get() + 1;
        self.inner.next_id.set(id);
        self.inner.listeners.borrow_mut().push((id, listener));
        Subscription {
            id,
            registry: Rc::downgrade(&self.inner),
        }
    }

    /// Deliver a notice to every listener.
    ///
    /// A notice raised from inside a listener is dropped rather than
    /// delivered recursively.
    pub fn notify(&self, notice: &DocumentNotice) {
        let Ok(mut listeners) = self.inner.listeners.try_borrow_mut() else {
            return;
        };
        for (_, listener) in listeners.iter_mut() {
            listener(notice);
        }
        let retired = std::mem::take(&mut *self.inner.retired.borrow_mut());
        listeners.retain(|(id, _)| !retired.contains(id));
    }

    pub fn len(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.inner.listeners.try_borrow().map(|l| l.len()))
            .finish_non_exhaustive()
    }
}

/// A live listener registration. Dropping it unregisters the listener.
#[must_use = "the listener is removed as soon as the subscription is dropped"]
pub struct Subscription {
    id: u64,
    registry: Weak<Registry>,
}

impl Subscription {
    /// Whether the document that issued this subscription still exists.
    pub fn is_attached(&self) -> bool {
        self.registry.strong_count() > 0
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        if let Ok(mut listeners) = registry.listeners.try_borrow_mut() {
            listeners.retain(|(id, _)| *id != self.id);
        } else {
            registry.retired.borrow_mut().push(self.id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("attached", &self.is_attached())
            .finish()
    }
}
