//! Application state - shared across all handlers.

use std::sync::Arc;

use inkpress_core::ContentRepository;
use inkpress_core::domain::{Author, AuthorId};
use inkpress_core::ports::{BlogStore, LookupCache};
use inkpress_infra::{DatabaseConfig, InMemoryBlogStore, InMemoryLookupCache, LookupCacheConfig};

#[cfg(feature = "postgres")]
use inkpress_infra::{DatabaseConnections, PostgresBlogStore};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub content: ContentRepository,
    #[cfg(feature = "postgres")]
    pub db: Option<Arc<DatabaseConnections>>,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(db_config: Option<&DatabaseConfig>, cache_config: LookupCacheConfig) -> Self {
        let author_cache: Arc<dyn LookupCache<AuthorId, Author>> =
            Arc::new(InMemoryLookupCache::new(cache_config));

        #[cfg(feature = "postgres")]
        let (db, store): (Option<Arc<DatabaseConnections>>, Arc<dyn BlogStore>) = {
            if let Some(config) = db_config {
                match DatabaseConnections::init(config).await {
                    Ok(connections) => {
                        let conn = Arc::new(connections);
                        let store = Arc::new(PostgresBlogStore::new(conn.main.clone()));
                        (Some(conn), store)
                    }
                    Err(e) => {
                        tracing::error!(
                            "Failed to connect to database: {}. Using in-memory fallback.",
                            e
                        );
                        (None, Arc::new(InMemoryBlogStore::new()))
                    }
                }
            } else {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
                (None, Arc::new(InMemoryBlogStore::new()))
            }
        };

        #[cfg(not(feature = "postgres"))]
        let store: Arc<dyn BlogStore> = {
            if db_config.is_some() {
                tracing::warn!("DATABASE_URL ignored: built without the postgres feature");
            }
            tracing::info!("Running without postgres feature - using in-memory store");
            Arc::new(InMemoryBlogStore::new())
        };

        tracing::info!("Application state initialized");

        Self {
            content: ContentRepository::new(store, author_cache),
            #[cfg(feature = "postgres")]
            db,
        }
    }

    /// Which store backs the repository.
    pub fn storage_kind(&self) -> &'static str {
        #[cfg(feature = "postgres")]
        if self.db.is_some() {
            return "postgres";
        }
        "memory"
    }

    /// State over a fresh in-memory store, for handler tests.
    #[cfg(test)]
    pub fn in_memory() -> Self {
        let author_cache: Arc<dyn LookupCache<AuthorId, Author>> =
            Arc::new(InMemoryLookupCache::new(LookupCacheConfig { ttl: None }));
        Self {
            content: ContentRepository::new(Arc::new(InMemoryBlogStore::new()), author_cache),
            #[cfg(feature = "postgres")]
            db: None,
        }
    }
}
