// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Expiring key/value storage used for cookie persistence
//!
//! Any backend satisfying [`Cache`] can hold session snapshots: the in-process
//! [`MemoryCache`] shipped here, an LRU, or a client for an external store.

mod memory;

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;

pub use memory::MemoryCache;

/// Expiring key/value store
///
/// `set` always succeeds and resets the entry's lifetime to `ttl`. `get`
/// returns `None` for keys never set and for entries whose lifetime is over.
pub trait Cache: Send + Sync {
    /// Look up a live entry
    fn get(&self, key: &str) -> Option<Bytes>;

    /// Insert or overwrite an entry
    fn set(&self, key: &str, value: Bytes, ttl: Duration);
}

impl<C: Cache + ?Sized> Cache for Arc<C> {
    fn get(&self, key: &str) -> Option<Bytes> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: Bytes, ttl: Duration) {
        (**self).set(key, value, ttl)
    }
}
