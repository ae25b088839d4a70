use std::sync::Arc;

use crate::domain::{
    Author, AuthorId, AuthorInput, AuthorItem, Category, CategoryId, CategoryInput, CategoryItem,
    EntityKind, Post, PostId, PostInput, PostWrite, Slug, Tag, TagId, TagInput, TagItem,
};
use crate::error::DomainError;
use crate::pagination::{PageRequest, PaginationResult};
use crate::ports::{
    BlogStore, Clock, ImageUrlChange, Lookup, LookupCache, PostGrouping, PublishChange,
    SystemClock,
};
use crate::query::{PostQuery, QueryBuilder};
use crate::tags::normalize_tag_names;

use super::ranking::{rank_authors, with_post_counts};
use super::slug_index::SlugIndex;

/// The public face of the blog core: CRUD, paged queries and rankings over
/// authors, categories, tags and posts.
///
/// Cheap to clone; every clone shares the same store, cache and clock.
#[derive(Clone)]
pub struct ContentRepository {
    store: Arc<dyn BlogStore>,
    authors: Arc<dyn LookupCache<AuthorId, Author>>,
    slugs: SlugIndex,
    clock: Arc<dyn Clock>,
}

impl ContentRepository {
    pub fn new(
        store: Arc<dyn BlogStore>,
        author_cache: Arc<dyn LookupCache<AuthorId, Author>>,
    ) -> Self {
        Self {
            slugs: SlugIndex::new(store.clone()),
            store,
            authors: author_cache,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    // ---- Posts ----

    pub async fn get_paged_posts(
        &self,
        query: &PostQuery,
        page: PageRequest,
    ) -> Result<PaginationResult<Post>, DomainError> {
        let builder = QueryBuilder::new(self.store.as_ref());
        match builder.build(query, self.clock.now()).await? {
            Some(filter) => Ok(self.store.page_posts(&filter, page).await?),
            None => Ok(PaginationResult::empty(page)),
        }
    }

    pub async fn get_post_by_id(
        &self,
        id: PostId,
        include_details: bool,
    ) -> Result<Post, DomainError> {
        self.store
            .find_post(id, include_details)
            .await?
            .ok_or_else(|| DomainError::not_found(EntityKind::Post, id))
    }

    pub async fn get_post_by_slug(&self, slug: &str) -> Result<Post, DomainError> {
        let Some(normalized) = Slug::normalize(slug) else {
            return Err(DomainError::slug_not_found(EntityKind::Post, slug));
        };
        self.store
            .find_post_by_slug(normalized.as_str())
            .await?
            .ok_or_else(|| DomainError::slug_not_found(EntityKind::Post, slug))
    }

    /// Insert (`input.id == None`) or update a post, then bring its tags to
    /// exactly `tag_names`. Post fields and associations commit together.
    pub async fn create_or_update_post<S: AsRef<str>>(
        &self,
        mut input: PostInput,
        tag_names: &[S],
    ) -> Result<Post, DomainError> {
        let specs = normalize_tag_names(tag_names);
        let id = input.id;

        input.slug = self
            .slugs
            .claim(EntityKind::Post, &input.slug, id)
            .await?
            .into_inner();
        self.require_author(input.author_id).await?;
        self.require_category(input.category_id).await?;

        let write = PostWrite {
            input,
            at: self.clock.now(),
        };
        let saved = self.store.save_post(write, &specs).await?.ok_or_else(|| {
            DomainError::not_found(EntityKind::Post, id.unwrap_or_default())
        })?;

        tracing::info!(
            post_id = saved.post.id,
            created = id.is_none(),
            tags_created = saved.tag_sync.created,
            tags_added = saved.tag_sync.added,
            tags_removed = saved.tag_sync.removed,
            "Post saved"
        );
        Ok(saved.post)
    }

    pub async fn delete_post(&self, id: PostId) -> Result<bool, DomainError> {
        let deleted = self.store.delete_post(id).await?;
        if deleted {
            tracing::info!(post_id = id, "Post deleted");
        }
        Ok(deleted)
    }

    pub async fn set_post_published(
        &self,
        id: PostId,
        published: bool,
    ) -> Result<Post, DomainError> {
        self.change_published(id, PublishChange::Set(published)).await
    }

    pub async fn toggle_post_published(&self, id: PostId) -> Result<Post, DomainError> {
        self.change_published(id, PublishChange::Toggle).await
    }

    pub async fn increase_view_count(&self, id: PostId) -> Result<bool, DomainError> {
        Ok(self.store.increase_view_count(id).await?)
    }

    async fn change_published(
        &self,
        id: PostId,
        change: PublishChange,
    ) -> Result<Post, DomainError> {
        let post = self
            .store
            .update_post_published(id, change, self.clock.now())
            .await?
            .ok_or_else(|| DomainError::not_found(EntityKind::Post, id))?;
        tracing::info!(post_id = id, published = post.published, "Post publish state changed");
        Ok(post)
    }

    /// Advisory check used by forms before submitting a write. `id` is the
    /// entity being edited; `None` (or 0) for a new one.
    pub async fn is_slug_existed(
        &self,
        kind: EntityKind,
        id: Option<i32>,
        slug: &str,
    ) -> Result<bool, DomainError> {
        let Some(slug) = Slug::normalize(slug) else {
            return Ok(false);
        };
        let owner = id.filter(|id| *id > 0);
        Ok(self.slugs.is_taken(kind, &slug, owner).await?)
    }

    // ---- Authors ----

    pub async fn get_authors(&self) -> Result<Vec<AuthorItem>, DomainError> {
        let authors = self.store.list_authors().await?;
        let counts = self.store.post_counts(PostGrouping::Author).await?;
        Ok(with_post_counts(authors, &counts, |a| a.id, |author, post_count| {
            AuthorItem { author, post_count }
        }))
    }

    pub async fn get_paged_authors(
        &self,
        name: Option<&str>,
        page: PageRequest,
    ) -> Result<PaginationResult<Author>, DomainError> {
        let name = name.map(str::trim).filter(|n| !n.is_empty());
        Ok(self.store.page_authors(name, page).await?)
    }

    /// Read-through cached lookup.
    pub async fn get_author_by_id(&self, id: AuthorId) -> Result<Author, DomainError> {
        let seen = match self.authors.lookup(&id).await {
            Lookup::Hit(author) => return Ok(author),
            Lookup::Miss(generation) => generation,
        };

        let author = self
            .store
            .find_author(id)
            .await?
            .ok_or_else(|| DomainError::not_found(EntityKind::Author, id))?;

        if !self.authors.fill(id, author.clone(), seen).await {
            tracing::debug!(author_id = id, "Discarded cache fill raced by a write");
        }
        Ok(author)
    }

    pub async fn get_author_by_slug(&self, slug: &str) -> Result<Author, DomainError> {
        let found = match Slug::normalize(slug) {
            Some(normalized) => self.store.find_author_by_slug(normalized.as_str()).await?,
            None => None,
        };
        found.ok_or_else(|| DomainError::slug_not_found(EntityKind::Author, slug))
    }

    pub async fn add_or_update_author(&self, mut input: AuthorInput) -> Result<Author, DomainError> {
        let id = input.id;
        input.slug = self
            .slugs
            .claim(EntityKind::Author, &input.slug, id)
            .await?
            .into_inner();

        let saved = self.store.save_author(input, self.clock.now()).await?;
        if let Some(id) = id {
            self.authors.invalidate(&id).await;
        }
        let author =
            saved.ok_or_else(|| DomainError::not_found(EntityKind::Author, id.unwrap_or_default()))?;

        tracing::info!(author_id = author.id, created = id.is_none(), "Author saved");
        Ok(author)
    }

    pub async fn delete_author(&self, id: AuthorId) -> Result<bool, DomainError> {
        let deleted = self.store.delete_author(id).await?;
        self.authors.invalidate(&id).await;
        if deleted {
            tracing::info!(author_id = id, "Author deleted");
        }
        Ok(deleted)
    }

    /// Replace an author's image. The returned change carries the previous
    /// URL so the caller can remove that file now that the write committed.
    pub async fn set_author_image_url(
        &self,
        id: AuthorId,
        image_url: Option<String>,
    ) -> Result<ImageUrlChange, DomainError> {
        let change = self.store.set_author_image_url(id, image_url).await?;
        self.authors.invalidate(&id).await;
        change.ok_or_else(|| DomainError::not_found(EntityKind::Author, id))
    }

    pub async fn get_authors_with_most_posts(
        &self,
        limit: i64,
    ) -> Result<Vec<AuthorItem>, DomainError> {
        if limit <= 0 {
            return Ok(Vec::new());
        }
        let counts = self.store.post_counts(PostGrouping::Author).await?;
        let authors = self.store.list_authors().await?;
        Ok(rank_authors(authors, &counts, limit))
    }

    async fn require_author(&self, id: AuthorId) -> Result<(), DomainError> {
        match self.store.find_author(id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::not_found(EntityKind::Author, id)),
        }
    }

    // ---- Categories ----

    pub async fn get_categories(&self) -> Result<Vec<CategoryItem>, DomainError> {
        let categories = self.store.list_categories().await?;
        let counts = self.store.post_counts(PostGrouping::Category).await?;
        Ok(with_post_counts(categories, &counts, |c| c.id, |category, post_count| {
            CategoryItem {
                category,
                post_count,
            }
        }))
    }

    pub async fn get_category_by_id(&self, id: CategoryId) -> Result<Category, DomainError> {
        self.store
            .find_category(id)
            .await?
            .ok_or_else(|| DomainError::not_found(EntityKind::Category, id))
    }

    pub async fn get_category_by_slug(&self, slug: &str) -> Result<Category, DomainError> {
        let found = match Slug::normalize(slug) {
            Some(normalized) => self.store.find_category_by_slug(normalized.as_str()).await?,
            None => None,
        };
        found.ok_or_else(|| DomainError::slug_not_found(EntityKind::Category, slug))
    }

    pub async fn add_or_update_category(
        &self,
        mut input: CategoryInput,
    ) -> Result<Category, DomainError> {
        let id = input.id;
        input.slug = self
            .slugs
            .claim(EntityKind::Category, &input.slug, id)
            .await?
            .into_inner();

        let category = self
            .store
            .save_category(input)
            .await?
            .ok_or_else(|| DomainError::not_found(EntityKind::Category, id.unwrap_or_default()))?;
        tracing::info!(category_id = category.id, created = id.is_none(), "Category saved");
        Ok(category)
    }

    pub async fn delete_category(&self, id: CategoryId) -> Result<bool, DomainError> {
        Ok(self.store.delete_category(id).await?)
    }

    async fn require_category(&self, id: CategoryId) -> Result<(), DomainError> {
        match self.store.find_category(id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::not_found(EntityKind::Category, id)),
        }
    }

    // ---- Tags ----

    pub async fn get_tags(&self) -> Result<Vec<TagItem>, DomainError> {
        let tags = self.store.list_tags().await?;
        let counts = self.store.post_counts(PostGrouping::Tag).await?;
        Ok(with_post_counts(tags, &counts, |t| t.id, |tag, post_count| {
            TagItem { tag, post_count }
        }))
    }

    pub async fn get_tag_by_slug(&self, slug: &str) -> Result<Tag, DomainError> {
        let found = match Slug::normalize(slug) {
            Some(normalized) => self.store.find_tag_by_slug(normalized.as_str()).await?,
            None => None,
        };
        found.ok_or_else(|| DomainError::slug_not_found(EntityKind::Tag, slug))
    }

    pub async fn add_or_update_tag(&self, mut input: TagInput) -> Result<Tag, DomainError> {
        let id = input.id;
        input.slug = self
            .slugs
            .claim(EntityKind::Tag, &input.slug, id)
            .await?
            .into_inner();

        self.store
            .save_tag(input)
            .await?
            .ok_or_else(|| DomainError::not_found(EntityKind::Tag, id.unwrap_or_default()))
    }

    pub async fn delete_tag(&self, id: TagId) -> Result<bool, DomainError> {
        Ok(self.store.delete_tag(id).await?)
    }
}
