//! Short-lived page cache keyed by URL path.
//!
//! DESIGN
//! ======
//! Plain `HashMap<String, CacheEntry>` with a fixed TTL. Expired entries are
//! only removed when looked up; there is no capacity bound and no sweep, since
//! a session only ever visits a handful of tabs.

use std::collections::HashMap;
use std::time::Duration;

#[cfg(test)]
#[path = "cache_test.rs"]
mod cache_test;

/// Swappable content extracted from a fetched page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PagePayload {
    /// Inner HTML of the main content region.
    pub html: String,
    /// Text of the page `<title>`, empty when absent.
    pub title: String,
}

impl PagePayload {
    pub fn new(html: impl Into<String>, title: impl Into<String>) -> Self {
        Self { html: html.into(), title: title.into() }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    payload: PagePayload,
    fetched_at_ms: u64,
}

#[derive(Debug, Clone)]
pub struct PageCache {
    entries: HashMap<String, CacheEntry>,
    ttl: Duration,
}

impl PageCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self { entries: HashMap::new(), ttl }
    }

    /// Fresh entry for `path`. An expired entry is removed and reported absent.
    pub fn get(&mut self, path: &str, now_ms: u64) -> Option<&PagePayload> {
        let expired = self.is_expired(self.entries.get(path)?, now_ms);
        if expired {
            self.entries.remove(path);
            log::debug!("page cache: evicted stale {path}");
            return None;
        }
        self.entries.get(path).map(|entry| &entry.payload)
    }

    /// Whether a fresh entry exists. Evicts a stale one like [`Self::get`].
    pub fn contains_fresh(&mut self, path: &str, now_ms: u64) -> bool {
        self.get(path, now_ms).is_some()
    }

    /// Store `payload` for `path`, replacing any previous entry.
    pub fn insert(&mut self, path: impl Into<String>, payload: PagePayload, now_ms: u64) {
        self.entries.insert(path.into(), CacheEntry { payload, fetched_at_ms: now_ms });
    }

    /// Number of stored entries, stale ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn is_expired(&self, entry: &CacheEntry, now_ms: u64) -> bool {
        u128::from(now_ms.saturating_sub(entry.fetched_at_ms)) > self.ttl.as_millis()
    }
}
