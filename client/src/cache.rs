use crate::config::{CacheStrategy, Config};
use crate::remote::RemoteObject;
use lru::LruCache;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};
use tracing::trace;

/// Holds a cached `RemoteObject` and its expiration timestamp.
///
/// This is used exclusively by the `ObjectCache::Ttl` variant.
#[derive(Debug)]
pub struct TtlEntry {
    object: RemoteObject,
    expiry: Instant,
}

/// Client-side cache of remote object lookups, keyed by path.
///
/// Which variant is active comes from `Config::cache_strategy`. The
/// filesystem never reads this cache directly; it only decides, per lookup,
/// whether the HTTP client is allowed to answer from it.
#[derive(Debug)]
pub enum ObjectCache {
    /// Entries expire after a fixed `Duration`.
    Ttl { entries: HashMap<String, TtlEntry>, ttl: Duration },
    /// Least-recently-used eviction with a fixed capacity.
    Lru(LruCache<String, RemoteObject>),
    /// Caching disabled. Every `get` misses.
    None,
}

impl ObjectCache {
    pub fn new(config: &Config) -> Self {
        match config.cache_strategy {
            CacheStrategy::Ttl => ObjectCache::Ttl {
                entries: HashMap::new(),
                ttl: Duration::from_secs(config.cache_ttl_seconds),
            },
            CacheStrategy::Lru => {
                let capacity = NonZeroUsize::new(config.cache_lru_capacity).unwrap_or(NonZeroUsize::MIN);
                ObjectCache::Lru(LruCache::new(capacity))
            }
            CacheStrategy::None => ObjectCache::None,
        }
    }

    /// Returns a copy of the cached object for `path`, if any.
    ///
    /// - `Ttl`: expired entries are dropped on the way.
    /// - `Lru`: a hit marks the entry as recently used.
    /// - `None`: always misses.
    pub fn get(&mut self, path: &str) -> Option<RemoteObject> {
        match self {
            ObjectCache::Ttl { entries, .. } => {
                if let Some(entry) = entries.get(path) {
                    if entry.expiry > Instant::now() {
                        trace!(path, "object cache hit (ttl)");
                        return Some(entry.object.clone());
                    }
                    trace!(path, "object cache entry expired");
                    entries.remove(path);
                }
            }
            ObjectCache::Lru(cache) => {
                if let Some(object) = cache.get(path) {
                    trace!(path, "object cache hit (lru)");
                    return Some(object.clone());
                }
            }
            ObjectCache::None => {}
        }
        trace!(path, "object cache miss");
        None
    }

    pub fn put(&mut self, path: &str, object: RemoteObject) {
        match self {
            ObjectCache::Ttl { entries, ttl } => {
                let entry = TtlEntry { object, expiry: Instant::now() + *ttl };
                entries.insert(path.to_string(), entry);
            }
            ObjectCache::Lru(cache) => {
                cache.put(path.to_string(), object);
            }
            ObjectCache::None => {}
        }
    }

    /// Invalidates `path`. Called after the remote copy changed or vanished.
    pub fn remove(&mut self, path: &str) {
        match self {
            ObjectCache::Ttl { entries, .. } => {
                entries.remove(path);
            }
            ObjectCache::Lru(cache) => {
                cache.pop(path);
            }
            ObjectCache::None => {}
        }
    }

    /// Invalidates every entry strictly below `path`.
    pub fn remove_tree(&mut self, path: &str) {
        let prefix = format!("{}/", path.trim_end_matches('/'));
        match self {
            ObjectCache::Ttl { entries, .. } => {
                entries.retain(|key, _| !key.starts_with(&prefix));
            }
            ObjectCache::Lru(cache) => {
                let doomed: Vec<String> = cache
                    .iter()
                    .filter(|(key, _)| key.starts_with(&prefix))
                    .map(|(key, _)| key.clone())
                    .collect();
                for key in doomed {
                    cache.pop(&key);
                }
            }
            ObjectCache::None => {}
        }
        trace!(path, "object cache subtree invalidated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::DeviceMeta;

    fn device(name: &str) -> RemoteObject {
        RemoteObject::Device(DeviceMeta { name: name.into(), mount_points: vec![] })
    }

    fn config(strategy: CacheStrategy) -> Config {
        Config { cache_strategy: strategy, cache_lru_capacity: 2, ..Config::default() }
    }

    #[test]
    fn test_ttl_hit_then_remove() {
        let mut cache = ObjectCache::new(&config(CacheStrategy::Ttl));
        cache.put("/Dev", device("Dev"));
        assert_eq!(cache.get("/Dev"), Some(device("Dev")));
        cache.remove("/Dev");
        assert_eq!(cache.get("/Dev"), None);
    }

    #[test]
    fn test_ttl_zero_expires_immediately() {
        let mut cache = ObjectCache::new(&Config { cache_ttl_seconds: 0, ..config(CacheStrategy::Ttl) });
        cache.put("/Dev", device("Dev"));
        assert_eq!(cache.get("/Dev"), None);
    }

    #[test]
    fn test_lru_evicts_least_recent() {
        let mut cache = ObjectCache::new(&config(CacheStrategy::Lru));
        cache.put("/a", device("a"));
        cache.put("/b", device("b"));
        assert!(cache.get("/a").is_some());
        cache.put("/c", device("c"));
        assert!(cache.get("/b").is_none());
        assert!(cache.get("/a").is_some());
        assert!(cache.get("/c").is_some());
    }

    #[test]
    fn test_remove_tree_keeps_siblings() {
        for strategy in [CacheStrategy::Ttl, CacheStrategy::Lru] {
            let mut cache = ObjectCache::new(&Config { cache_lru_capacity: 10, ..config(strategy) });
            cache.put("/Dev/Sync/dir", device("dir"));
            cache.put("/Dev/Sync/dir/a.txt", device("a.txt"));
            cache.put("/Dev/Sync/dir/sub/b.txt", device("b.txt"));
            cache.put("/Dev/Sync/dirty.txt", device("dirty.txt"));

            cache.remove_tree("/Dev/Sync/dir");
            assert!(cache.get("/Dev/Sync/dir/a.txt").is_none());
            assert!(cache.get("/Dev/Sync/dir/sub/b.txt").is_none());
            assert!(cache.get("/Dev/Sync/dir").is_some());
            assert!(cache.get("/Dev/Sync/dirty.txt").is_some());
        }
    }

    #[test]
    fn test_disabled_cache_never_hits() {
        let mut cache = ObjectCache::new(&config(CacheStrategy::None));
        cache.put("/Dev", device("Dev"));
        assert_eq!(cache.get("/Dev"), None);
    }
}
