//! In-memory lookup cache with invalidation-aware fills and a TTL safety net.

use std::collections::HashMap;
use std::hash::{BuildHasher, Hash, RandomState};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use inkpress_core::ports::{Generation, Lookup, LookupCache};

/// Lookup cache configuration.
#[derive(Debug, Clone)]
pub struct LookupCacheConfig {
    /// Entries older than this are treated as misses. `None` disables expiry.
    pub ttl: Option<Duration>,
}

impl Default for LookupCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Some(Duration::from_secs(300)),
        }
    }
}

impl LookupCacheConfig {
    /// Load configuration from environment variables.
    /// `AUTHOR_CACHE_TTL_SECS=0` disables expiry.
    pub fn from_env() -> Self {
        let ttl = std::env::var("AUTHOR_CACHE_TTL_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(|secs| (secs > 0).then(|| Duration::from_secs(secs)))
            .unwrap_or(Self::default().ttl);
        Self { ttl }
    }
}

/// Shards per cache; a key always maps to the same shard.
const SHARDS: usize = 16;

/// Invalidation markers a shard keeps before collapsing them into its floor.
const MAX_MARKERS: usize = 256;

struct CacheEntry<V> {
    value: V,
    expires_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    fn is_live(&self) -> bool {
        self.expires_at.is_none_or(|exp| Instant::now() <= exp)
    }
}

/// A cached value, or a marker recording when the key was last invalidated.
struct Slot<V> {
    invalidated_at: u64,
    entry: Option<CacheEntry<V>>,
}

struct Shard<K, V> {
    slots: HashMap<K, Slot<V>>,
    /// Bumped by every invalidation in this shard.
    clock: u64,
    /// Fills observed before this point are refused for keys without a slot.
    floor: u64,
    markers: usize,
}

impl<K: Eq + Hash, V> Shard<K, V> {
    fn new() -> Self {
        Self {
            slots: HashMap::new(),
            clock: 0,
            floor: 0,
            markers: 0,
        }
    }

    /// Drop every marker and expired entry, raising the floor so misses
    /// observed before now stay refused.
    fn compact(&mut self) {
        self.slots
            .retain(|_, slot| slot.entry.as_ref().is_some_and(CacheEntry::is_live));
        self.floor = self.clock;
        self.markers = 0;
    }
}

/// In-memory lookup cache sharded over async RwLocks.
///
/// Reads share a shard lock; fills and invalidations take it exclusively, so
/// an invalidation and a fill of the same key never interleave while
/// unrelated keys in other shards proceed independently. A miss carries the
/// shard clock, and a fill is refused when its key was invalidated after it.
pub struct InMemoryLookupCache<K, V> {
    shards: Vec<RwLock<Shard<K, V>>>,
    hasher: RandomState,
    ttl: Option<Duration>,
}

impl<K, V> InMemoryLookupCache<K, V>
where
    K: Eq + Hash,
{
    pub fn new(config: LookupCacheConfig) -> Self {
        Self {
            shards: (0..SHARDS).map(|_| RwLock::new(Shard::new())).collect(),
            hasher: RandomState::new(),
            ttl: config.ttl,
        }
    }

    fn shard(&self, key: &K) -> &RwLock<Shard<K, V>> {
        let index = self.hasher.hash_one(key) as usize % self.shards.len();
        &self.shards[index]
    }

    /// Number of live (unexpired) entries.
    pub async fn len(&self) -> usize {
        let mut live = 0;
        for shard in &self.shards {
            let shard = shard.read().await;
            live += shard
                .slots
                .values()
                .filter(|slot| slot.entry.as_ref().is_some_and(CacheEntry::is_live))
                .count();
        }
        live
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Slots held across all shards, markers included.
    #[cfg(test)]
    async fn slot_count(&self) -> usize {
        let mut total = 0;
        for shard in &self.shards {
            total += shard.read().await.slots.len();
        }
        total
    }
}

impl<K, V> Default for InMemoryLookupCache<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new(LookupCacheConfig::default())
    }
}

#[async_trait]
impl<K, V> LookupCache<K, V> for InMemoryLookupCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    async fn lookup(&self, key: &K) -> Lookup<V> {
        let shard = self.shard(key).read().await;
        match shard.slots.get(key).and_then(|slot| slot.entry.as_ref()) {
            Some(entry) if entry.is_live() => Lookup::Hit(entry.value.clone()),
            _ => Lookup::Miss(Generation(shard.clock)),
        }
    }

    async fn fill(&self, key: K, value: V, seen: Generation) -> bool {
        let mut guard = self.shard(&key).write().await;
        let shard = &mut *guard;
        if seen.0 < shard.floor {
            return false;
        }

        let entry = CacheEntry {
            value,
            expires_at: self.ttl.map(|d| Instant::now() + d),
        };
        match shard.slots.get_mut(&key) {
            Some(slot) if slot.invalidated_at > seen.0 => return false,
            Some(slot) => {
                if slot.entry.is_none() {
                    shard.markers -= 1;
                }
                slot.entry = Some(entry);
            }
            None => {
                shard.slots.insert(
                    key,
                    Slot {
                        invalidated_at: 0,
                        entry: Some(entry),
                    },
                );
            }
        }
        true
    }

    async fn invalidate(&self, key: &K) {
        let mut guard = self.shard(key).write().await;
        let shard = &mut *guard;
        shard.clock += 1;
        let now = shard.clock;

        let was_marker = match shard.slots.get_mut(key) {
            Some(slot) => {
                slot.invalidated_at = now;
                slot.entry.take().is_none()
            }
            None => {
                shard.slots.insert(
                    key.clone(),
                    Slot {
                        invalidated_at: now,
                        entry: None,
                    },
                );
                false
            }
        };
        if !was_marker {
            shard.markers += 1;
        }
        if shard.markers > MAX_MARKERS {
            shard.compact();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn cache() -> InMemoryLookupCache<i32, String> {
        InMemoryLookupCache::new(LookupCacheConfig { ttl: None })
    }

    #[tokio::test]
    async fn test_fill_and_hit() {
        let cache = cache();
        let Lookup::Miss(seen) = cache.lookup(&1).await else {
            panic!("empty cache should miss");
        };
        assert!(cache.fill(1, "ada".to_string(), seen).await);
        assert_eq!(cache.lookup(&1).await, Lookup::Hit("ada".to_string()));
    }

    #[tokio::test]
    async fn test_invalidate_removes_entry() {
        let cache = cache();
        cache.fill(1, "ada".to_string(), Generation(0)).await;
        cache.invalidate(&1).await;
        assert_eq!(cache.lookup(&1).await, Lookup::Miss(Generation(1)));
    }

    #[tokio::test]
    async fn test_fill_after_invalidation_is_discarded() {
        let cache = cache();
        // Reader misses before the write...
        let Lookup::Miss(seen) = cache.lookup(&7).await else {
            panic!("expected miss");
        };
        // ...the writer commits and invalidates...
        cache.invalidate(&7).await;
        // ...and the reader's stale value must not land.
        assert!(!cache.fill(7, "stale".to_string(), seen).await);
        assert!(matches!(cache.lookup(&7).await, Lookup::Miss(_)));
    }

    #[tokio::test]
    async fn test_entries_expire_after_ttl() {
        let cache = InMemoryLookupCache::new(LookupCacheConfig {
            ttl: Some(Duration::from_millis(20)),
        });
        cache.fill(1, "ada".to_string(), Generation(0)).await;
        assert_eq!(cache.len().await, 1);

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(matches!(cache.lookup(&1).await, Lookup::Miss(_)));
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_concurrent_invalidations_leave_no_entry() {
        let cache = Arc::new(cache());
        cache.fill(3, "old".to_string(), Generation(0)).await;

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                tokio::spawn(async move { cache.invalidate(&3).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(cache.lookup(&3).await, Lookup::Miss(Generation(8)));
    }

    #[tokio::test]
    async fn test_invalidating_unknown_keys_stays_bounded() {
        let cache = cache();
        let Lookup::Miss(seen) = cache.lookup(&5).await else {
            panic!("expected miss");
        };
        cache.invalidate(&5).await;

        for id in 0..10_000 {
            cache.invalidate(&id).await;
        }

        assert!(cache.slot_count().await <= SHARDS * (MAX_MARKERS + 1));
        // The marker for 5 may be gone, but the read that predates it is still refused.
        assert!(!cache.fill(5, "stale".to_string(), seen).await);
    }

    #[tokio::test]
    async fn test_invalidation_of_another_key_keeps_fill() {
        let cache = cache();
        let Lookup::Miss(seen) = cache.lookup(&1).await else {
            panic!("expected miss");
        };
        cache.invalidate(&2).await;

        assert!(cache.fill(1, "ada".to_string(), seen).await);
        assert_eq!(cache.lookup(&1).await, Lookup::Hit("ada".to_string()));
    }
}
