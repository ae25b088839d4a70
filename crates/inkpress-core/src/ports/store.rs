use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    Author, AuthorId, AuthorInput, Category, CategoryId, CategoryInput, EntityKind, Post, PostId,
    PostWrite, Tag, TagId, TagInput,
};
use crate::error::RepoError;
use crate::pagination::{PageRequest, PaginationResult};
use crate::query::PostFilter;
use crate::tags::{TagSpec, TagSyncReport};

/// How a publish-state update changes the flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishChange {
    Set(bool),
    Toggle,
}

/// Which foreign key published posts are counted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostGrouping {
    Author,
    Category,
    Tag,
}

/// A committed post write and what the tag sync did.
#[derive(Debug, Clone)]
pub struct SavedPost {
    pub post: Post,
    pub tag_sync: TagSyncReport,
}

/// Outcome of replacing an author's image URL.
#[derive(Debug, Clone)]
pub struct ImageUrlChange {
    pub author: Author,
    /// The URL that was replaced; the caller removes that file.
    pub previous: Option<String>,
}

/// Storage port for the five blog collections.
///
/// Implementations enforce slug uniqueness per entity type and run every
/// multi-statement write in one transaction. Methods that target a single id
/// return `None`/`false` when it does not exist.
#[async_trait]
pub trait BlogStore: Send + Sync {
    // Authors
    async fn list_authors(&self) -> Result<Vec<Author>, RepoError>;

    async fn page_authors(
        &self,
        name: Option<&str>,
        page: PageRequest,
    ) -> Result<PaginationResult<Author>, RepoError>;

    async fn find_author(&self, id: AuthorId) -> Result<Option<Author>, RepoError>;

    async fn find_author_by_slug(&self, slug: &str) -> Result<Option<Author>, RepoError>;

    /// Insert (`input.id == None`, stamped with `joined`) or replace an author.
    async fn save_author(
        &self,
        input: AuthorInput,
        joined: DateTime<Utc>,
    ) -> Result<Option<Author>, RepoError>;

    /// Fails with [`RepoError::InUse`] while posts reference the author.
    async fn delete_author(&self, id: AuthorId) -> Result<bool, RepoError>;

    async fn set_author_image_url(
        &self,
        id: AuthorId,
        image_url: Option<String>,
    ) -> Result<Option<ImageUrlChange>, RepoError>;

    // Categories
    async fn list_categories(&self) -> Result<Vec<Category>, RepoError>;

    async fn find_category(&self, id: CategoryId) -> Result<Option<Category>, RepoError>;

    async fn find_category_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError>;

    async fn save_category(&self, input: CategoryInput) -> Result<Option<Category>, RepoError>;

    /// Fails with [`RepoError::InUse`] while posts reference the category.
    async fn delete_category(&self, id: CategoryId) -> Result<bool, RepoError>;

    // Tags
    async fn list_tags(&self) -> Result<Vec<Tag>, RepoError>;

    async fn find_tag_by_slug(&self, slug: &str) -> Result<Option<Tag>, RepoError>;

    async fn save_tag(&self, input: TagInput) -> Result<Option<Tag>, RepoError>;

    /// Removes the tag and its post associations; posts are kept.
    async fn delete_tag(&self, id: TagId) -> Result<bool, RepoError>;

    // Posts
    /// One consistent snapshot: count and page come from the same read.
    /// Items carry their details.
    async fn page_posts(
        &self,
        filter: &PostFilter,
        page: PageRequest,
    ) -> Result<PaginationResult<Post>, RepoError>;

    async fn find_post(&self, id: PostId, include_details: bool)
    -> Result<Option<Post>, RepoError>;

    async fn find_post_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError>;

    /// Insert or update a post and synchronize its tags as one atomic unit.
    /// `None` when updating an id that does not exist.
    async fn save_post(
        &self,
        write: PostWrite,
        tags: &[TagSpec],
    ) -> Result<Option<SavedPost>, RepoError>;

    /// Removes the post and its tag associations, never the tags.
    async fn delete_post(&self, id: PostId) -> Result<bool, RepoError>;

    /// Apply a publish change and stamp `modified_date` with `at`.
    async fn update_post_published(
        &self,
        id: PostId,
        change: PublishChange,
        at: DateTime<Utc>,
    ) -> Result<Option<Post>, RepoError>;

    async fn increase_view_count(&self, id: PostId) -> Result<bool, RepoError>;

    // Cross-cutting
    /// Whether `slug` belongs to an entity of `kind` other than `exclude`.
    async fn slug_exists(
        &self,
        kind: EntityKind,
        slug: &str,
        exclude: Option<i32>,
    ) -> Result<bool, RepoError>;

    /// Published post counts keyed by the grouping id. Ids without
    /// published posts are absent.
    async fn post_counts(&self, grouping: PostGrouping) -> Result<HashMap<i32, u64>, RepoError>;
}
