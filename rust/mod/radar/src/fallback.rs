use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use crate::model::Reading;

/// Bounded in-memory buffer of recent readings.
///
/// Used when the service runs without a database, or in hybrid mode when
/// the database cannot be reached. Holds at most `capacity` readings and
/// drops the oldest first.
pub struct FallbackStore {
    inner: Mutex<Inner>,
    capacity: usize,
}

struct Inner {
    readings: VecDeque<Reading>,
    next_id: i64,
}

impl FallbackStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                readings: VecDeque::with_capacity(capacity),
                next_id: 1,
            }),
            capacity: capacity.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A panic while holding the lock cannot leave the queue half-written.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Reserve the id the next appended reading will carry.
    pub fn next_id(&self) -> i64 {
        let mut inner = self.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        id
    }

    /// Append a reading, evicting the oldest while over capacity.
    pub fn push(&self, reading: Reading) {
        let mut inner = self.lock();
        inner.readings.push_back(reading);
        while inner.readings.len() > self.capacity {
            inner.readings.pop_front();
        }
    }

    /// Up to `n` readings, newest first.
    pub fn latest(&self, n: usize) -> Vec<Reading> {
        self.lock().readings.iter().rev().take(n).cloned().collect()
    }

    /// Newest-first readings matching `keep`, at most `limit`.
    pub fn select(&self, limit: usize, keep: impl Fn(&Reading) -> bool) -> Vec<Reading> {
        self.lock()
            .readings
            .iter()
            .rev()
            .filter(|r| keep(r))
            .take(limit)
            .cloned()
            .collect()
    }

    /// Remove everything. Returns how many readings were dropped.
    pub fn clear(&self) -> usize {
        let mut inner = self.lock();
        let n = inner.readings.len();
        inner.readings.clear();
        n
    }

    pub fn len(&self) -> usize {
        self.lock().readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(store: &FallbackStore, distance: f64) -> Reading {
        Reading {
            id: store.next_id(),
            angle: 10.0,
            distance,
            timestamp: None,
            created_at: "2026-10-18T00:00:00.000000Z".into(),
            device_id: "radar_01".into(),
            session_id: "default_session".into(),
            object_detected: false,
        }
    }

    #[test]
    fn never_exceeds_capacity() {
        let store = FallbackStore::new(100);
        for i in 0..150 {
            store.push(reading(&store, i as f64));
        }
        assert_eq!(store.len(), 100);
    }

    #[test]
    fn evicts_oldest_first() {
        let store = FallbackStore::new(3);
        for d in [1.0, 2.0, 3.0, 4.0, 5.0] {
            store.push(reading(&store, d));
        }
        let distances: Vec<f64> = store.latest(10).iter().map(|r| r.distance).collect();
        assert_eq!(distances, vec![5.0, 4.0, 3.0]);
    }

    #[test]
    fn ids_keep_increasing_after_eviction() {
        let store = FallbackStore::new(2);
        for d in [1.0, 2.0, 3.0] {
            store.push(reading(&store, d));
        }
        let ids: Vec<i64> = store.latest(2).iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 2]);
    }

    #[test]
    fn select_filters_and_limits() {
        let store = FallbackStore::new(10);
        for d in [1.0, 2.0, 3.0, 4.0] {
            store.push(reading(&store, d));
        }
        let picked = store.select(1, |r| r.distance < 3.0);
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].distance, 2.0);
    }

    #[test]
    fn clear_reports_dropped_count() {
        let store = FallbackStore::new(10);
        store.push(reading(&store, 1.0));
        store.push(reading(&store, 2.0));
        assert_eq!(store.clear(), 2);
        assert!(store.is_empty());
    }
}
