//! Domain-level error types.

use thiserror::Error;

use crate::domain::EntityKind;

/// Domain errors - the outcomes callers of the content repository handle.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: EntityKind, id: i32 },

    #[error("Entity not found: {entity} with slug '{slug}'")]
    SlugNotFound { entity: EntityKind, slug: String },

    #[error("Slug '{slug}' is already used by another {entity}")]
    SlugConflict { entity: EntityKind, slug: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{entity} with id {id} is still referenced by posts")]
    InUse { entity: EntityKind, id: i32 },

    #[error("Storage failure: {0}")]
    Storage(#[source] RepoError),
}

impl DomainError {
    pub fn not_found(entity: EntityKind, id: i32) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn slug_not_found(entity: EntityKind, slug: impl Into<String>) -> Self {
        Self::SlugNotFound {
            entity,
            slug: slug.into(),
        }
    }
}

impl From<RepoError> for DomainError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::SlugConflict { entity, slug } => Self::SlugConflict { entity, slug },
            RepoError::InUse { entity, id } => Self::InUse { entity, id },
            other => {
                tracing::error!(error = %other, "Storage operation failed");
                Self::Storage(other)
            }
        }
    }
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Unique slug violated: {entity} '{slug}'")]
    SlugConflict { entity: EntityKind, slug: String },

    #[error("Referenced {entity} {id} cannot be removed")]
    InUse { entity: EntityKind, id: i32 },

    #[error("Constraint violation: {0}")]
    Constraint(String),
}
