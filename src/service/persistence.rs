// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Cookie jar snapshots stored through a [`Cache`]

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;

use crate::cache::Cache;
use crate::http::CookieJar;

/// Loads and saves session jars under `prefix + session_id`
///
/// Failures never surface to the request: a snapshot that cannot be read
/// starts the session with an empty jar, one that cannot be written is
/// dropped. Both are logged.
pub struct CookiePersistence {
    cache: Arc<dyn Cache>,
    prefix: String,
    ttl: Duration,
}

impl CookiePersistence {
    pub fn new(cache: Arc<dyn Cache>, prefix: impl Into<String>, ttl: Duration) -> Self {
        Self {
            cache,
            prefix: prefix.into(),
            ttl,
        }
    }

    /// Cache key for a session
    pub fn key(&self, session_id: &str) -> String {
        format!("{}{}", self.prefix, session_id)
    }

    /// Raw snapshot bytes; None when missing or empty
    pub fn load(&self, session_id: &str) -> Option<Bytes> {
        self.cache
            .get(&self.key(session_id))
            .filter(|data| !data.is_empty())
    }

    /// Decoded jar; empty when missing or unreadable
    pub fn load_jar(&self, session_id: &str) -> CookieJar {
        let Some(data) = self.load(session_id) else {
            return CookieJar::new();
        };
        match CookieJar::from_snapshot(&data) {
            Ok(jar) => {
                tracing::debug!(session = %session_id, cookies = jar.len(), "loaded cookie jar");
                jar
            }
            Err(e) => {
                tracing::warn!(session = %session_id, error = %e, "discarding unreadable cookie jar");
                CookieJar::new()
            }
        }
    }

    /// Store the jar, resetting the snapshot's lifetime
    pub fn save(&self, session_id: &str, jar: &CookieJar) {
        match jar.to_snapshot() {
            Ok(data) => {
                tracing::debug!(session = %session_id, cookies = jar.len(), "saving cookie jar");
                self.cache.set(&self.key(session_id), Bytes::from(data), self.ttl);
            }
            Err(e) => {
                tracing::warn!(session = %session_id, error = %e, "failed to serialize cookie jar");
            }
        }
    }
}

impl fmt::Debug for CookiePersistence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CookiePersistence")
            .field("prefix", &self.prefix)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::http::Cookie;

    fn persistence(cache: Arc<MemoryCache>, ttl: Duration) -> CookiePersistence {
        CookiePersistence::new(cache, "http/", ttl)
    }

    #[test]
    fn test_save_then_load() {
        let cache = Arc::new(MemoryCache::new());
        let store = persistence(cache.clone(), Duration::from_secs(60));

        let jar = CookieJar::new();
        jar.add(Cookie::new("sid", "abc").domain("example.com"));
        store.save("alice", &jar);

        assert!(cache.get("http/alice").is_some());
        let bytes = store.load("alice").unwrap();
        let restored = CookieJar::from_snapshot(&bytes).unwrap();
        let sid = restored.get("sid").unwrap();
        assert_eq!(sid.value, "abc");
        assert_eq!(sid.domain, "example.com");
    }

    #[test]
    fn test_missing_and_empty_are_absent() {
        let cache = Arc::new(MemoryCache::new());
        let store = persistence(cache.clone(), Duration::from_secs(60));
        assert!(store.load("nobody").is_none());

        cache.set("http/empty", Bytes::new(), Duration::from_secs(60));
        assert!(store.load("empty").is_none());
    }

    #[test]
    fn test_expired_snapshot_is_gone() {
        let cache = Arc::new(MemoryCache::new());
        let store = persistence(cache, Duration::ZERO);

        let jar = CookieJar::new();
        jar.add(Cookie::new("sid", "abc").domain("example.com"));
        store.save("alice", &jar);
        assert!(store.load_jar("alice").is_empty());
    }

    #[test]
    fn test_unreadable_snapshot_gives_empty_jar() {
        let cache = Arc::new(MemoryCache::new());
        cache.set("http/alice", Bytes::from_static(b"garbage"), Duration::from_secs(60));
        let store = persistence(cache, Duration::from_secs(60));
        assert!(store.load_jar("alice").is_empty());
    }

    #[test]
    fn test_custom_prefix_used_for_both_directions() {
        let cache = Arc::new(MemoryCache::new());
        let store = CookiePersistence::new(cache.clone(), "cookies:", Duration::from_secs(60));

        store.save("alice", &CookieJar::new());
        assert!(cache.get("cookies:alice").is_some());
        assert!(cache.get("http/alice").is_none());
    }
}
