//! Single-slot cooperative debouncing.
//!
//! Runs on the event loop's clock (`now_ms` since start) rather than on
//! threads: the loop schedules, polls [`CoalescingScheduler::next_deadline`]
//! for its wait timeout and drains [`CoalescingScheduler::take_due`].

/// Work the event loop defers until input goes quiet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncTask {
    /// Re-derive the active zone from the caret.
    SyncCaret,
    /// Rebuild every zone from the markup.
    ReloadZones,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Pending<K> {
    key: K,
    due_ms: u64,
}

/// At most one pending entry per key; scheduling a key again restarts its
/// quiet period instead of queueing a second run.
#[derive(Debug, Clone)]
pub struct CoalescingScheduler<K> {
    pending: Vec<Pending<K>>,
}

impl<K> Default for CoalescingScheduler<K> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
        }
    }
}

impl<K: Copy + Eq> CoalescingScheduler<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `key` once `delay_ms` have passed without it being scheduled again.
    pub fn schedule(&mut self, key: K, delay_ms: u64, now_ms: u64) {
        let due_ms = now_ms.saturating_add(delay_ms);
        if let Some(entry) = self.pending.iter_mut().find(|p| p.key == key) {
            entry.due_ms = due_ms;
        } else {
            self.pending.push(Pending { key, due_ms });
        }
    }

    /// Returns true if an entry was pending.
    pub fn cancel(&mut self, key: K) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.key != key);
        self.pending.len() != before
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Remove and return every entry due at `now_ms`, earliest first.
    pub fn take_due(&mut self, now_ms: u64) -> Vec<K> {
        let mut due: Vec<Pending<K>> = Vec::new();
        self.pending.retain(|p| {
            if p.due_ms <= now_ms {
                due.push(*p);
                false
            } else {
                true
            }
        });
        due.sort_by_key(|p| p.due_ms);
        due.into_iter().map(|p| p.key).collect()
    }

    pub fn is_pending(&self, key: K) -> bool {
        self.pending.iter().any(|p| p.key == key)
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    /// Earliest due time, for sizing the event poll timeout.
    pub fn next_deadline(&self) -> Option<u64> {
        self.pending.iter().map(|p| p.due_ms).min()
    }
}
