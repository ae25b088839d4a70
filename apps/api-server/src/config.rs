//! Application configuration loaded from environment variables.

use std::env;

use inkpress_infra::{DatabaseConfig, LookupCacheConfig};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Worker threads; `None` lets actix use one per core.
    pub workers: Option<usize>,
    /// Seconds in-flight requests get to finish on shutdown.
    pub shutdown_timeout: u64,
    /// `None` runs the server on the in-memory store.
    pub database: Option<DatabaseConfig>,
    pub author_cache: LookupCacheConfig,
}

fn parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.parse().ok())
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = env::var("DATABASE_URL").ok().map(|url| {
            let defaults = DatabaseConfig::new(url);
            DatabaseConfig {
                max_connections: parsed("DB_MAX_CONNECTIONS").unwrap_or(defaults.max_connections),
                min_connections: parsed("DB_MIN_CONNECTIONS").unwrap_or(defaults.min_connections),
                sqlx_logging: parsed("DB_SQLX_LOGGING").unwrap_or(defaults.sqlx_logging),
                ..defaults
            }
        });

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parsed("PORT").unwrap_or(8080),
            workers: parsed("WORKERS").filter(|n: &usize| *n > 0),
            shutdown_timeout: parsed("SHUTDOWN_TIMEOUT_SECS").unwrap_or(30),
            database,
            author_cache: LookupCacheConfig::from_env(),
        }
    }
}
