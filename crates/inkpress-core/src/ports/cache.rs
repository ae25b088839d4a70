use async_trait::async_trait;

/// Invalidation counter observed on a cache miss.
///
/// A fill is dropped when its key was invalidated after this generation was
/// observed, which keeps a slow reader from re-inserting data from before a
/// write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Generation(pub u64);

/// Result of a cache lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<V> {
    Hit(V),
    Miss(Generation),
}

/// Lookup cache trait - read-through cache for single entities by id.
#[async_trait]
pub trait LookupCache<K, V>: Send + Sync
where
    K: Send + Sync + 'static,
    V: Send + 'static,
{
    /// Return the cached value, or the current generation on a miss.
    async fn lookup(&self, key: &K) -> Lookup<V>;

    /// Populate a key after a miss. Returns false when the key was
    /// invalidated since `seen` and the value was discarded.
    async fn fill(&self, key: K, value: V, seen: Generation) -> bool;

    /// Drop the entry for a key and refuse fills that predate this call.
    async fn invalidate(&self, key: &K);
}
