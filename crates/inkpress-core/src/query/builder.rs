use chrono::{DateTime, Utc};

use crate::domain::{EntityKind, Slug};
use crate::error::RepoError;
use crate::ports::BlogStore;

use super::{PostFilter, PostQuery};

/// Outcome of resolving one id-or-slug field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Narrowing {
    Any,
    Only(i32),
    Nothing,
}

/// Turns a [`PostQuery`] into a [`PostFilter`], resolving slugs through the
/// store. Yields `None` when the query provably matches nothing (an unknown
/// slug, an id/slug pair naming different entities, an impossible month).
pub struct QueryBuilder<'a> {
    store: &'a dyn BlogStore,
}

impl<'a> QueryBuilder<'a> {
    pub fn new(store: &'a dyn BlogStore) -> Self {
        Self { store }
    }

    pub async fn build(
        &self,
        query: &PostQuery,
        now: DateTime<Utc>,
    ) -> Result<Option<PostFilter>, RepoError> {
        if query.month.is_some_and(|m| !(1..=12).contains(&m)) {
            return Ok(None);
        }

        let mut filter = PostFilter {
            keyword: query
                .keyword
                .as_deref()
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_lowercase),
            year: query.year,
            month: query.month,
            published_before: query.published_only.then_some(now),
            ..Default::default()
        };

        let fields = [
            (EntityKind::Category, query.category_id, query.category_slug.as_deref()),
            (EntityKind::Author, query.author_id, query.author_slug.as_deref()),
            (EntityKind::Tag, query.tag_id, query.tag_slug.as_deref()),
        ];

        for (kind, id, slug) in fields {
            let resolved = match self.narrow(kind, id, slug).await? {
                Narrowing::Any => None,
                Narrowing::Only(id) => Some(id),
                Narrowing::Nothing => {
                    tracing::debug!(entity = %kind, ?id, ?slug, "Post query cannot match");
                    return Ok(None);
                }
            };
            match kind {
                EntityKind::Category => filter.category_id = resolved,
                EntityKind::Author => filter.author_id = resolved,
                EntityKind::Tag => filter.tag_id = resolved,
                EntityKind::Post => {}
            }
        }

        Ok(Some(filter))
    }

    async fn narrow(
        &self,
        kind: EntityKind,
        id: Option<i32>,
        slug: Option<&str>,
    ) -> Result<Narrowing, RepoError> {
        let by_slug = match slug.map(str::trim).filter(|s| !s.is_empty()) {
            None => None,
            Some(raw) => {
                let Some(slug) = Slug::normalize(raw) else {
                    return Ok(Narrowing::Nothing);
                };
                match self.lookup_id(kind, slug.as_str()).await? {
                    Some(found) => Some(found),
                    None => return Ok(Narrowing::Nothing),
                }
            }
        };

        Ok(match (id, by_slug) {
            (None, None) => Narrowing::Any,
            (Some(id), None) | (None, Some(id)) => Narrowing::Only(id),
            (Some(a), Some(b)) if a == b => Narrowing::Only(a),
            (Some(_), Some(_)) => Narrowing::Nothing,
        })
    }

    async fn lookup_id(&self, kind: EntityKind, slug: &str) -> Result<Option<i32>, RepoError> {
        Ok(match kind {
            EntityKind::Category => self.store.find_category_by_slug(slug).await?.map(|c| c.id),
            EntityKind::Author => self.store.find_author_by_slug(slug).await?.map(|a| a.id),
            EntityKind::Tag => self.store.find_tag_by_slug(slug).await?.map(|t| t.id),
            EntityKind::Post => self.store.find_post_by_slug(slug).await?.map(|p| p.id),
        })
    }
}
