use std::sync::Arc;

use crate::domain::{EntityKind, Slug};
use crate::error::{DomainError, RepoError};
use crate::ports::BlogStore;

/// Advisory slug uniqueness check.
///
/// A negative answer can go stale before the write lands; the store's unique
/// index still rejects the duplicate as [`RepoError::SlugConflict`].
#[derive(Clone)]
pub struct SlugIndex {
    store: Arc<dyn BlogStore>,
}

impl SlugIndex {
    pub fn new(store: Arc<dyn BlogStore>) -> Self {
        Self { store }
    }

    /// Whether `slug` belongs to a `kind` entity other than `owner`.
    pub async fn is_taken(
        &self,
        kind: EntityKind,
        slug: &Slug,
        owner: Option<i32>,
    ) -> Result<bool, RepoError> {
        self.store.slug_exists(kind, slug.as_str(), owner).await
    }

    /// Normalize `raw` and make sure no other `kind` entity holds it.
    pub async fn claim(
        &self,
        kind: EntityKind,
        raw: &str,
        owner: Option<i32>,
    ) -> Result<Slug, DomainError> {
        let slug = Slug::parse(raw)?;
        if self.is_taken(kind, &slug, owner).await? {
            tracing::debug!(entity = %kind, slug = %slug, ?owner, "Slug already taken");
            return Err(DomainError::SlugConflict {
                entity: kind,
                slug: slug.into_inner(),
            });
        }
        Ok(slug)
    }
}
