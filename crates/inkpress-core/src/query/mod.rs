//! Post query specification: the caller-facing [`PostQuery`], its resolved
//! [`PostFilter`] predicate and the default post ordering.

mod builder;
mod filter;

use serde::{Deserialize, Serialize};

use crate::domain::{AuthorId, CategoryId, TagId};

pub use builder::QueryBuilder;
pub use filter::{PostFilter, compare_posts, sort_posts};

/// Transient multi-field post filter. Every field is optional; each present,
/// non-blank field narrows the result with an AND condition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostQuery {
    pub keyword: Option<String>,
    pub category_id: Option<CategoryId>,
    pub category_slug: Option<String>,
    pub author_id: Option<AuthorId>,
    pub author_slug: Option<String>,
    pub tag_id: Option<TagId>,
    pub tag_slug: Option<String>,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub published_only: bool,
}

impl PostQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    pub fn category_id(mut self, id: CategoryId) -> Self {
        self.category_id = Some(id);
        self
    }

    pub fn category_slug(mut self, slug: impl Into<String>) -> Self {
        self.category_slug = Some(slug.into());
        self
    }

    pub fn author_id(mut self, id: AuthorId) -> Self {
        self.author_id = Some(id);
        self
    }

    pub fn author_slug(mut self, slug: impl Into<String>) -> Self {
        self.author_slug = Some(slug.into());
        self
    }

    pub fn tag_id(mut self, id: TagId) -> Self {
        self.tag_id = Some(id);
        self
    }

    pub fn tag_slug(mut self, slug: impl Into<String>) -> Self {
        self.tag_slug = Some(slug.into());
        self
    }

    pub fn year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn month(mut self, month: u32) -> Self {
        self.month = Some(month);
        self
    }

    pub fn published_only(mut self) -> Self {
        self.published_only = true;
        self
    }
}
