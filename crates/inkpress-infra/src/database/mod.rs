//! Database connection management and the PostgreSQL blog store.

mod connections;

#[cfg(feature = "postgres")]
pub mod entity;
#[cfg(feature = "postgres")]
mod errors;
#[cfg(feature = "postgres")]
mod filter;
#[cfg(feature = "postgres")]
mod ledger;
#[cfg(feature = "postgres")]
mod postgres_store;

pub use connections::DatabaseConfig;

#[cfg(feature = "postgres")]
pub use connections::DatabaseConnections;
#[cfg(feature = "postgres")]
pub use postgres_store::PostgresBlogStore;

#[cfg(feature = "postgres")]
#[cfg(test)]
mod tests;
