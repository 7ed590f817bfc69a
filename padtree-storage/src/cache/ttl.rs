//! TTL cache keyed by pad path.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};

use padtree_core::{is_in_subtree, Pad};

/// Configuration for the pad cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// How long an entry stays valid after `set`.
    pub ttl: Duration,
    /// How often the background sweeper purges expired entries.
    pub sweep_interval: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300),
            sweep_interval: Duration::from_secs(60),
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the entry TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the sweep interval.
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }
}

/// Statistics about cache usage.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entry_count: u64,
    pub evictions: u64,
}

impl CacheStats {
    /// Hit rate between 0.0 and 1.0.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

struct CacheEntry {
    pad: Pad,
    expires_at: Instant,
}

/// In-memory read-through cache with absolute per-entry expiry.
///
/// Callers always receive clones; the map's entries are never handed out
/// by reference. An expired entry is treated as absent on lookup and
/// removed by the sweeper. All invalidation is best-effort: a poisoned
/// lock degrades the cache to a permanent miss rather than failing the
/// request.
pub struct PadCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    config: CacheConfig,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl PadCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            config,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(CacheConfig::default())
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Cached snapshot for `path`, if present and not expired.
    pub fn get(&self, path: &str) -> Option<Pad> {
        let entries = self.entries.read().ok()?;
        match entries.get(path) {
            Some(entry) if entry.expires_at > Instant::now() => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(entry.pad.clone())
            }
            _ => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Store or overwrite the entry for `path` with a fresh expiry.
    pub fn set(&self, path: &str, pad: Pad) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(
                path.to_string(),
                CacheEntry {
                    pad,
                    expires_at: Instant::now() + self.config.ttl,
                },
            );
        }
    }

    /// Remove exactly one entry.
    pub fn invalidate(&self, path: &str) {
        if let Ok(mut entries) = self.entries.write() {
            entries.remove(path);
        }
    }

    /// Remove `prefix` itself and every entry whose path is a strict
    /// segment-aligned descendant. The empty prefix clears everything.
    pub fn invalidate_prefix(&self, prefix: &str) {
        if let Ok(mut entries) = self.entries.write() {
            if prefix.is_empty() {
                entries.clear();
            } else {
                entries.retain(|path, _| !is_in_subtree(prefix, path));
            }
        }
    }

    /// Purge every expired entry; returns how many were removed.
    pub fn sweep(&self) -> usize {
        let Ok(mut entries) = self.entries.write() else {
            return 0;
        };
        let now = Instant::now();
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        let purged = before - entries.len();
        self.evictions.fetch_add(purged as u64, Ordering::Relaxed);
        purged
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entry_count: self.len() as u64,
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pad(path: &str, content: &str) -> Pad {
        Pad {
            path: path.to_string(),
            content: content.to_string(),
            updated_at: 1,
            created_at: 1,
        }
    }

    #[test]
    fn test_get_miss_then_hit() {
        let cache = PadCache::with_defaults();
        assert!(cache.get("a").is_none());
        cache.set("a", pad("a", "x"));
        assert_eq!(cache.get("a").unwrap().content, "x");

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_expired_entry_reads_as_absent() {
        let cache = PadCache::new(CacheConfig::new().with_ttl(Duration::ZERO));
        cache.set("a", pad("a", "x"));
        assert!(cache.get("a").is_none());
    }

    #[test]
    fn test_set_overwrites_and_refreshes() {
        let cache = PadCache::with_defaults();
        cache.set("a", pad("a", "x"));
        cache.set("a", pad("a", "y"));
        assert_eq!(cache.get("a").unwrap().content, "y");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_invalidate_removes_one() {
        let cache = PadCache::with_defaults();
        cache.set("a", pad("a", "1"));
        cache.set("b", pad("b", "2"));
        cache.invalidate("a");
        assert!(cache.get("a").is_none());
        assert!(cache.get("b").is_some());
    }

    #[test]
    fn test_invalidate_prefix_is_segment_aligned() {
        let cache = PadCache::with_defaults();
        cache.set("foo", pad("foo", "1"));
        cache.set("foo/x", pad("foo/x", "2"));
        cache.set("foobar", pad("foobar", "3"));

        cache.invalidate_prefix("foo");
        assert!(cache.get("foo").is_none());
        assert!(cache.get("foo/x").is_none());
        assert!(cache.get("foobar").is_some());
    }

    #[test]
    fn test_invalidate_empty_prefix_clears_all() {
        let cache = PadCache::with_defaults();
        cache.set("a", pad("a", "1"));
        cache.set("b/c", pad("b/c", "2"));
        cache.invalidate_prefix("");
        assert!(cache.is_empty());
    }

    #[test]
    fn test_sweep_purges_expired_only() {
        let cache = PadCache::new(CacheConfig::new().with_ttl(Duration::from_secs(60)));
        cache.set("fresh", pad("fresh", "1"));
        {
            // Plant an already-expired entry directly.
            let mut entries = cache.entries.write().unwrap();
            entries.insert(
                "stale".to_string(),
                CacheEntry {
                    pad: pad("stale", "2"),
                    expires_at: Instant::now() - Duration::from_secs(1),
                },
            );
        }

        assert_eq!(cache.sweep(), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats().evictions, 1);
    }
}
