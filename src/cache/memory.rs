// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! In-process expiring map behind a single lock

use std::collections::HashMap;
use std::time::{Duration, Instant};

use bytes::Bytes;
use parking_lot::Mutex;

use super::Cache;

#[derive(Debug, Clone)]
struct Entry {
    deadline: Instant,
    value: Bytes,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.deadline
    }
}

/// Single-lock expiring map
///
/// Expired entries are only removed when they are looked up; there is no
/// background sweeper. Every operation takes the same mutex, so this is meant
/// for tests, examples and small single-process deployments.
#[derive(Debug, Default)]
pub struct MemoryCache {
    store: Mutex<HashMap<String, Entry>>,
}

impl MemoryCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, including expired ones not yet looked up
    pub fn len(&self) -> usize {
        self.store.lock().len()
    }

    /// Check if nothing is stored
    pub fn is_empty(&self) -> bool {
        self.store.lock().is_empty()
    }

    /// Remove an entry, returning its value if it was still live
    pub fn remove(&self, key: &str) -> Option<Bytes> {
        let entry = self.store.lock().remove(key)?;
        (!entry.is_expired(Instant::now())).then_some(entry.value)
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.store.lock().clear();
    }
}

impl Cache for MemoryCache {
    fn get(&self, key: &str) -> Option<Bytes> {
        let mut store = self.store.lock();
        let entry = store.get(key)?;
        if entry.is_expired(Instant::now()) {
            store.remove(key);
            return None;
        }
        Some(entry.value.clone())
    }

    fn set(&self, key: &str, value: Bytes, ttl: Duration) {
        let deadline = Instant::now() + ttl;
        self.store
            .lock()
            .insert(key.to_string(), Entry { deadline, value });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_missing_key() {
        let cache = MemoryCache::new();
        assert!(cache.get("never-set").is_none());
    }

    #[test]
    fn test_set_then_get_within_ttl() {
        let cache = MemoryCache::new();
        cache.set("k", Bytes::from_static(b"v"), Duration::from_secs(60));
        assert_eq!(cache.get("k"), Some(Bytes::from_static(b"v")));
        // Reads do not consume live entries
        assert_eq!(cache.get("k"), Some(Bytes::from_static(b"v")));
    }

    #[test]
    fn test_expired_entry_is_evicted_on_lookup() {
        let cache = MemoryCache::new();
        cache.set("k", Bytes::from_static(b"v"), Duration::ZERO);
        assert_eq!(cache.len(), 1);

        assert!(cache.get("k").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_expires_after_ttl_elapses() {
        let cache = MemoryCache::new();
        cache.set("k", Bytes::from_static(b"v"), Duration::from_millis(20));
        assert!(cache.get("k").is_some());

        std::thread::sleep(Duration::from_millis(40));
        assert!(cache.get("k").is_none());
    }

    #[test]
    fn test_set_overwrites_and_resets_deadline() {
        let cache = MemoryCache::new();
        cache.set("k", Bytes::from_static(b"old"), Duration::ZERO);
        cache.set("k", Bytes::from_static(b"new"), Duration::from_secs(60));
        assert_eq!(cache.get("k"), Some(Bytes::from_static(b"new")));
    }

    #[test]
    fn test_remove_and_clear() {
        let cache = MemoryCache::new();
        cache.set("a", Bytes::from_static(b"1"), Duration::from_secs(60));
        cache.set("b", Bytes::from_static(b"2"), Duration::from_secs(60));

        assert_eq!(cache.remove("a"), Some(Bytes::from_static(b"1")));
        assert!(cache.get("a").is_none());

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_shared_across_threads() {
        use std::sync::Arc;

        let cache = Arc::new(MemoryCache::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = cache.clone();
                std::thread::spawn(move || {
                    cache.set(&format!("k{}", i), Bytes::from(vec![i as u8]), Duration::from_secs(60));
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.len(), 8);
        assert_eq!(Cache::get(&cache, "k3"), Some(Bytes::from(vec![3u8])));
    }
}
