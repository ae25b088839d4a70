//! Lookup cache implementations.

mod memory;

pub use memory::{InMemoryLookupCache, LookupCacheConfig};
