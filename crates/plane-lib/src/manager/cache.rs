//! Response cache
//!
//! Small TTL cache in front of the per-cluster collector calls. Entries are
//! evicted lazily on lookup; the map never grows beyond the working set of
//! distinct (organization, cluster, parameters) keys.

use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Default lifetime of a cached collector response.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60);

pub struct TtlCache<V> {
    entries: DashMap<String, (Instant, V)>,
    ttl: Duration,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        TtlCache {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Fetch a live entry, removing it if it has expired.
    pub fn get(&self, key: &str) -> Option<V> {
        let expired = match self.entries.get(key) {
            Some(entry) => {
                let (inserted_at, value) = entry.value();
                if inserted_at.elapsed() < self.ttl {
                    return Some(value.clone());
                }
                true
            }
            None => false,
        };
        if expired {
            self.entries.remove(key);
        }
        None
    }

    pub fn put(&self, key: String, value: V) {
        self.entries.insert(key, (Instant::now(), value));
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.len()
    }
}
