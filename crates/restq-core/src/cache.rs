//! Result cache for repeated queries.
//!
//! Responses are keyed by a fingerprint of the entity name and the canonical
//! query string, so two requests that render to the same text share an
//! entry. The engine itself never consults the cache; callers decide when a
//! cached response is acceptable.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use restq_proto::QueryRequest;
use tracing::debug;

/// Content-derived cache key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct QueryFingerprint {
    hash: [u8; 32],
}

impl QueryFingerprint {
    /// Fingerprint a request against an entity.
    ///
    /// The `cache` flag is not part of the key.
    pub fn from_request(entity: &str, request: &QueryRequest) -> Self {
        let mut canonical = request.clone();
        canonical.cache = false;
        Self::from_parts(entity, &canonical.to_query_string())
    }

    /// Fingerprint an entity name plus arbitrary canonical text.
    pub fn from_parts(entity: &str, canonical: &str) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(entity.as_bytes());
        hasher.update(&[0]);
        hasher.update(canonical.as_bytes());
        Self {
            hash: *hasher.finalize().as_bytes(),
        }
    }

    /// Hex form, for logging.
    pub fn to_hex(&self) -> String {
        blake3::Hash::from(self.hash).to_hex().to_string()
    }
}

/// Cached response with metadata.
#[derive(Debug)]
struct CachedEntry<V> {
    value: V,
    entity: String,
    created_at: Instant,
    hit_count: AtomicU64,
}

impl<V> CachedEntry<V> {
    fn record_hit(&self) -> u64 {
        self.hit_count.fetch_add(1, AtomicOrdering::Relaxed) + 1
    }

    fn hits(&self) -> u64 {
        self.hit_count.load(AtomicOrdering::Relaxed)
    }
}

/// Cache statistics.
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    expirations: AtomicU64,
}

impl CacheStats {
    /// Get hit count.
    pub fn hits(&self) -> u64 {
        self.hits.load(AtomicOrdering::Relaxed)
    }

    /// Get miss count.
    pub fn misses(&self) -> u64 {
        self.misses.load(AtomicOrdering::Relaxed)
    }

    /// Get eviction count.
    pub fn evictions(&self) -> u64 {
        self.evictions.load(AtomicOrdering::Relaxed)
    }

    /// Get count of entries dropped because their TTL ran out.
    pub fn expirations(&self) -> u64 {
        self.expirations.load(AtomicOrdering::Relaxed)
    }

    /// Calculate hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits() as f64;
        let total = hits + self.misses() as f64;
        if total > 0.0 {
            hits / total
        } else {
            0.0
        }
    }
}

/// Bounded, thread-safe response cache with a per-entry TTL.
///
/// At capacity the entry with the fewest hits is evicted.
pub struct ResultCache<V> {
    entries: RwLock<HashMap<QueryFingerprint, CachedEntry<V>>>,
    max_entries: usize,
    ttl: Duration,
    stats: CacheStats,
}

impl<V: Clone> ResultCache<V> {
    /// Create a new cache.
    pub fn new(max_entries: usize, ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_entries,
            ttl,
            stats: CacheStats::default(),
        }
    }

    /// Get a live entry.
    pub fn get(&self, fingerprint: &QueryFingerprint) -> Option<V> {
        {
            let guard = self.entries.read();
            match guard.get(fingerprint) {
                Some(entry) if entry.created_at.elapsed() < self.ttl => {
                    entry.record_hit();
                    self.stats.hits.fetch_add(1, AtomicOrdering::Relaxed);
                    return Some(entry.value.clone());
                }
                Some(_) => {}
                None => {
                    self.stats.misses.fetch_add(1, AtomicOrdering::Relaxed);
                    return None;
                }
            }
        }

        // Expired: drop it unless another writer already refreshed it.
        let mut guard = self.entries.write();
        if guard
            .get(fingerprint)
            .is_some_and(|entry| entry.created_at.elapsed() >= self.ttl)
        {
            guard.remove(fingerprint);
            self.stats.expirations.fetch_add(1, AtomicOrdering::Relaxed);
        }
        self.stats.misses.fetch_add(1, AtomicOrdering::Relaxed);
        None
    }

    /// Insert a response, evicting the least-hit entry when full.
    pub fn insert(&self, fingerprint: QueryFingerprint, entity: impl Into<String>, value: V) {
        if self.max_entries == 0 {
            return;
        }

        let mut guard = self.entries.write();
        if guard.len() >= self.max_entries && !guard.contains_key(&fingerprint) {
            self.evict_lru(&mut guard);
        }

        guard.insert(
            fingerprint,
            CachedEntry {
                value,
                entity: entity.into(),
                created_at: Instant::now(),
                hit_count: AtomicU64::new(0),
            },
        );
    }

    /// Drop every entry for an entity. Returns how many were dropped.
    pub fn invalidate(&self, entity: &str) -> usize {
        let mut guard = self.entries.write();
        let before = guard.len();
        guard.retain(|_, entry| entry.entity != entity);
        let dropped = before - guard.len();
        if dropped > 0 {
            debug!(entity, dropped, "invalidated cached results");
        }
        dropped
    }

    /// Evict the entry with the lowest hit count.
    fn evict_lru(&self, entries: &mut HashMap<QueryFingerprint, CachedEntry<V>>) {
        let evict_key = entries
            .iter()
            .min_by_key(|(_, entry)| entry.hits())
            .map(|(key, _)| *key);

        if let Some(key) = evict_key {
            entries.remove(&key);
            self.stats.evictions.fetch_add(1, AtomicOrdering::Relaxed);
        }
    }

    /// Get cache statistics.
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Get the current number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear all cached entries.
    pub fn clear(&self) {
        self.entries.write().clear();
    }
}
