//! Per-key cache of decoded response data.

use std::collections::HashMap;

use formdeck_core::{CachedValue, Key};

/// Cache of the last successfully decoded response per key.
///
/// Every key owns a slot from initialization; a slot is either absent
/// (no data received, or cleared) or holds a [`CachedValue`]. Absent
/// is distinct from a failed request: an error leaves previously
/// cached data intact unless the caller clears it explicitly.
///
/// Nested-field edits go through [`update`](DataCache::update), which
/// replaces the slot's value as a whole so that slot-level change
/// observation stays accurate.
#[derive(Debug)]
pub struct DataCache {
    slots: HashMap<Key, Option<CachedValue>>,
}

impl DataCache {
    /// Create a cache with an absent slot for every key.
    #[must_use]
    pub fn new() -> DataCache {
        DataCache {
            slots: Key::ALL.into_iter().map(|key| (key, None)).collect(),
        }
    }

    /// The cached value for a key, if any.
    #[must_use]
    pub fn get(&self, key: Key) -> Option<&CachedValue> {
        self.slots.get(&key).and_then(Option::as_ref)
    }

    /// Whether the key has cached data.
    #[must_use]
    pub fn contains(&self, key: Key) -> bool {
        self.get(key).is_some()
    }

    /// Whether every listed key has cached data. Used to gate
    /// "data ready" decisions.
    #[must_use]
    pub fn has(&self, keys: &[Key]) -> bool {
        keys.iter().all(|&key| self.contains(key))
    }

    /// Store a value unconditionally. The caller must already have
    /// validated its cancellation token.
    pub fn set(&mut self, key: Key, value: CachedValue) {
        self.slots.insert(key, Some(value));
    }

    /// Edit the value cached for a key in place.
    ///
    /// The closure receives the current value; the edited value
    /// replaces the slot's contents wholesale. Returns `false` (and
    /// does not run the closure) if the slot is absent.
    pub fn update(&mut self, key: Key, f: impl FnOnce(&mut CachedValue)) -> bool {
        match self.slots.get_mut(&key) {
            Some(Some(value)) => {
                f(value);
                true
            },
            _ => false,
        }
    }

    /// Clear the slot for a key.
    pub fn clear(&mut self, key: Key) {
        self.slots.insert(key, None);
    }

    /// Clear every slot.
    pub fn clear_all(&mut self) {
        for slot in self.slots.values_mut() {
            *slot = None;
        }
    }
}

impl Default for DataCache {
    fn default() -> DataCache {
        DataCache::new()
    }
}
