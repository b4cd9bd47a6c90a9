//! Per-key TTL cache for GET results.
//!
//! Entries are `(payload, timestamp)` pairs keyed by endpoint name (plus
//! parameters for parameterized lookups). A missing or stale entry is
//! treated as absent. Geocode entries are inserted as permanent: an
//! address for fixed coordinates does not change, so those entries only
//! leave the cache through explicit busting or LRU eviction.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::debug;

/// Freshness policy for an inserted entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Entry goes stale once it is older than the cache TTL.
    Ttl,
    /// Entry never goes stale (reverse-geocode results).
    Permanent,
}

#[derive(Debug)]
struct Entry {
    payload: Value,
    stored_at: DateTime<Utc>,
    permanent: bool,
    last_used: u64,
}

/// In-memory TTL cache with an LRU bound.
#[derive(Debug)]
pub struct TtlCache {
    entries: HashMap<String, Entry>,
    ttl: Duration,
    capacity: usize,
    tick: u64,
}

impl TtlCache {
    /// Creates a cache with the given freshness window and entry bound.
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
            capacity: capacity.max(1),
            tick: 0,
        }
    }

    /// Returns the freshness window.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Adjusts the freshness window for subsequent reads.
    pub fn set_ttl(&mut self, ttl: Duration) {
        self.ttl = ttl;
    }

    /// Returns the payload for `key` if present and fresh at `now`.
    ///
    /// Stale entries are dropped on observation.
    pub fn get(&mut self, key: &str, now: DateTime<Utc>) -> Option<Value> {
        self.tick += 1;
        let tick = self.tick;
        let ttl = self.ttl;

        match self.entries.get_mut(key) {
            Some(entry) if entry.permanent || is_fresh(entry.stored_at, now, ttl) => {
                entry.last_used = tick;
                Some(entry.payload.clone())
            }
            Some(_) => {
                debug!(key = %key, "Cache entry stale, dropping");
                self.entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Stores a payload under `key` with the given policy.
    pub fn insert(&mut self, key: String, payload: Value, policy: CachePolicy, now: DateTime<Utc>) {
        self.tick += 1;

        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            self.evict_lru();
        }

        self.entries.insert(
            key,
            Entry {
                payload,
                stored_at: now,
                permanent: policy == CachePolicy::Permanent,
                last_used: self.tick,
            },
        );
    }

    /// Invalidates a single entry.
    pub fn bust(&mut self, key: &str) {
        self.entries.remove(key);
    }

    /// Invalidates every entry.
    pub fn bust_all(&mut self) {
        self.entries.clear();
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn evict_lru(&mut self) {
        let victim = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_used)
            .map(|(key, _)| key.clone());

        if let Some(key) = victim {
            debug!(key = %key, "Evicting least recently used cache entry");
            self.entries.remove(&key);
        }
    }
}

fn is_fresh(stored_at: DateTime<Utc>, now: DateTime<Utc>, ttl: Duration) -> bool {
    // Entries stamped in the future (clock adjustments) count as fresh.
    now.signed_duration_since(stored_at)
        .to_std()
        .map_or(true, |age| age <= ttl)
}

// ============================================================================
// Tests
// ============================================================================
