//! # Inkpress Core
//!
//! The domain layer of the Inkpress blog content repository.
//! Entities, the error taxonomy, storage/cache ports, and the pure pieces of
//! the repository: query specification, pagination, tag lifecycle, slug
//! index and author ranking. No infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod pagination;
pub mod ports;
pub mod query;
pub mod service;
pub mod tags;

pub use error::{DomainError, RepoError};
pub use pagination::{PageRequest, PaginationResult};
pub use query::PostQuery;
pub use service::ContentRepository;
