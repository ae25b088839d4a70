//! # Inkpress Infrastructure
//!
//! Concrete implementations of the ports defined in `inkpress-core`:
//! the blog store (PostgreSQL or in-memory) and the author lookup cache.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory only
//! - `postgres` - PostgreSQL database support via SeaORM

pub mod cache;
pub mod database;
pub mod memory;

// Re-exports - In-Memory
pub use cache::{InMemoryLookupCache, LookupCacheConfig};
pub use database::DatabaseConfig;
pub use memory::InMemoryBlogStore;

// Re-exports - PostgreSQL
#[cfg(feature = "postgres")]
pub use database::{DatabaseConnections, PostgresBlogStore};
