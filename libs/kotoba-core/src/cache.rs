//! Small bounded cache with expiry.
//!
//! Owned by whoever needs it and passed in explicitly; there is no shared
//! global instance.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::hash::Hash;

#[derive(Debug, Clone)]
struct Slot<V> {
    value: V,
    inserted_at: DateTime<Utc>,
}

/// Bounded key/value cache whose entries expire after `ttl`.
#[derive(Debug, Clone)]
pub struct QueryCache<K, V> {
    capacity: usize,
    ttl: Duration,
    slots: HashMap<K, Slot<V>>,
}

impl<K: Eq + Hash + Clone, V: Clone> QueryCache<K, V> {
    /// A capacity of 0 disables caching.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            capacity,
            ttl,
            slots: HashMap::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn is_fresh(&self, slot: &Slot<V>, now: DateTime<Utc>) -> bool {
        now - slot.inserted_at < self.ttl
    }

    /// Cached value for `key` if it has not expired.
    pub fn get(&self, key: &K, now: DateTime<Utc>) -> Option<V> {
        self.slots
            .get(key)
            .filter(|slot| self.is_fresh(slot, now))
            .map(|slot| slot.value.clone())
    }

    pub fn insert(&mut self, key: K, value: V, now: DateTime<Utc>) {
        if self.capacity == 0 {
            return;
        }
        self.purge_expired(now);

        if !self.slots.contains_key(&key) && self.slots.len() >= self.capacity {
            let oldest = self
                .slots
                .iter()
                .min_by_key(|(_, slot)| slot.inserted_at)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                self.slots.remove(&oldest);
            }
        }

        self.slots.insert(key, Slot { value, inserted_at: now });
    }

    pub fn purge_expired(&mut self, now: DateTime<Utc>) {
        let ttl = self.ttl;
        self.slots.retain(|_, slot| now - slot.inserted_at < ttl);
    }

    pub fn invalidate(&mut self, key: &K) {
        self.slots.remove(key);
    }

    pub fn invalidate_all(&mut self) {
        self.slots.clear();
    }
}
