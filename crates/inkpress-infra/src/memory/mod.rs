//! In-memory blog store - used by tests and as the fallback when no database
//! is configured. Data is lost on process restart.

mod tables;

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use inkpress_core::domain::{
    Author, AuthorId, AuthorInput, Category, CategoryId, CategoryInput, EntityKind, Post, PostId,
    PostWrite, Tag, TagId, TagInput,
};
use inkpress_core::error::RepoError;
use inkpress_core::pagination::{PageRequest, PaginationResult, paginate};
use inkpress_core::ports::{BlogStore, ImageUrlChange, PostGrouping, PublishChange, SavedPost};
use inkpress_core::query::{PostFilter, sort_posts};
use inkpress_core::tags::{TagSpec, sync_post_tags};

use tables::{Tables, TablesLedger};

/// Blog store over in-process collections behind one async RwLock.
///
/// Reads share a snapshot under the read guard. Writes clone the tables,
/// mutate the draft and swap it in only on success, so a failed multi-step
/// write leaves nothing behind.
#[derive(Default)]
pub struct InMemoryBlogStore {
    tables: RwLock<Tables>,
}

impl InMemoryBlogStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn read<T>(&self, f: impl FnOnce(&Tables) -> T) -> T {
        let tables = self.tables.read().await;
        f(&tables)
    }

    async fn write<T>(
        &self,
        f: impl FnOnce(&mut Tables) -> Result<T, RepoError>,
    ) -> Result<T, RepoError> {
        let mut tables = self.tables.write().await;
        let mut draft = tables.clone();
        let out = f(&mut draft)?;
        *tables = draft;
        Ok(out)
    }
}

fn by_name<T>(items: impl Iterator<Item = T>, key: impl Fn(&T) -> (String, i32)) -> Vec<T> {
    let mut items: Vec<T> = items.collect();
    items.sort_by_key(|item| key(item));
    items
}

#[async_trait]
impl BlogStore for InMemoryBlogStore {
    async fn list_authors(&self) -> Result<Vec<Author>, RepoError> {
        Ok(self
            .read(|t| {
                by_name(t.authors.values().cloned(), |a| {
                    (a.full_name.to_lowercase(), a.id)
                })
            })
            .await)
    }

    async fn page_authors(
        &self,
        name: Option<&str>,
        page: PageRequest,
    ) -> Result<PaginationResult<Author>, RepoError> {
        let needle = name.map(str::to_lowercase);
        Ok(self
            .read(|t| {
                let matching = t.authors.values().filter(|a| match &needle {
                    Some(needle) => a.full_name.to_lowercase().contains(needle.as_str()),
                    None => true,
                });
                let ordered = by_name(matching.cloned(), |a| (a.full_name.to_lowercase(), a.id));
                paginate(&ordered, page)
            })
            .await)
    }

    async fn find_author(&self, id: AuthorId) -> Result<Option<Author>, RepoError> {
        Ok(self.read(|t| t.authors.get(&id).cloned()).await)
    }

    async fn find_author_by_slug(&self, slug: &str) -> Result<Option<Author>, RepoError> {
        Ok(self
            .read(|t| t.authors.values().find(|a| a.slug == slug).cloned())
            .await)
    }

    async fn save_author(
        &self,
        input: AuthorInput,
        joined: DateTime<Utc>,
    ) -> Result<Option<Author>, RepoError> {
        self.write(|t| {
            t.check_slug(EntityKind::Author, &input.slug, input.id)?;
            let (id, joined_date) = match input.id {
                None => (t.next_id(EntityKind::Author), joined),
                Some(id) => match t.authors.get(&id) {
                    Some(existing) => (id, existing.joined_date),
                    None => return Ok(None),
                },
            };
            let author = Author {
                id,
                full_name: input.full_name,
                email: input.email,
                bio: input.bio,
                slug: input.slug,
                image_url: input.image_url,
                joined_date,
            };
            t.authors.insert(id, author.clone());
            Ok(Some(author))
        })
        .await
    }

    async fn delete_author(&self, id: AuthorId) -> Result<bool, RepoError> {
        self.write(|t| {
            if !t.authors.contains_key(&id) {
                return Ok(false);
            }
            if t.has_posts_where(|p| p.author_id == id) {
                return Err(RepoError::InUse {
                    entity: EntityKind::Author,
                    id,
                });
            }
            t.authors.remove(&id);
            Ok(true)
        })
        .await
    }

    async fn set_author_image_url(
        &self,
        id: AuthorId,
        image_url: Option<String>,
    ) -> Result<Option<ImageUrlChange>, RepoError> {
        self.write(|t| {
            let Some(author) = t.authors.get_mut(&id) else {
                return Ok(None);
            };
            let previous = std::mem::replace(&mut author.image_url, image_url);
            Ok(Some(ImageUrlChange {
                author: author.clone(),
                previous,
            }))
        })
        .await
    }

    async fn list_categories(&self) -> Result<Vec<Category>, RepoError> {
        Ok(self
            .read(|t| by_name(t.categories.values().cloned(), |c| (c.name.to_lowercase(), c.id)))
            .await)
    }

    async fn find_category(&self, id: CategoryId) -> Result<Option<Category>, RepoError> {
        Ok(self.read(|t| t.categories.get(&id).cloned()).await)
    }

    async fn find_category_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        Ok(self
            .read(|t| t.categories.values().find(|c| c.slug == slug).cloned())
            .await)
    }

    async fn save_category(&self, input: CategoryInput) -> Result<Option<Category>, RepoError> {
        self.write(|t| {
            t.check_slug(EntityKind::Category, &input.slug, input.id)?;
            let id = match input.id {
                None => t.next_id(EntityKind::Category),
                Some(id) if t.categories.contains_key(&id) => id,
                Some(_) => return Ok(None),
            };
            let category = Category {
                id,
                name: input.name,
                description: input.description,
                slug: input.slug,
                show_on_menu: input.show_on_menu,
            };
            t.categories.insert(id, category.clone());
            Ok(Some(category))
        })
        .await
    }

    async fn delete_category(&self, id: CategoryId) -> Result<bool, RepoError> {
        self.write(|t| {
            if !t.categories.contains_key(&id) {
                return Ok(false);
            }
            if t.has_posts_where(|p| p.category_id == id) {
                return Err(RepoError::InUse {
                    entity: EntityKind::Category,
                    id,
                });
            }
            t.categories.remove(&id);
            Ok(true)
        })
        .await
    }

    async fn list_tags(&self) -> Result<Vec<Tag>, RepoError> {
        Ok(self
            .read(|t| by_name(t.tags.values().cloned(), |tag| (tag.name.to_lowercase(), tag.id)))
            .await)
    }

    async fn find_tag_by_slug(&self, slug: &str) -> Result<Option<Tag>, RepoError> {
        Ok(self
            .read(|t| t.tags.values().find(|tag| tag.slug == slug).cloned())
            .await)
    }

    async fn save_tag(&self, input: TagInput) -> Result<Option<Tag>, RepoError> {
        self.write(|t| {
            t.check_slug(EntityKind::Tag, &input.slug, input.id)?;
            let id = match input.id {
                None => t.next_id(EntityKind::Tag),
                Some(id) if t.tags.contains_key(&id) => id,
                Some(_) => return Ok(None),
            };
            let tag = Tag {
                id,
                name: input.name,
                slug: input.slug,
                description: input.description,
            };
            t.tags.insert(id, tag.clone());
            Ok(Some(tag))
        })
        .await
    }

    async fn delete_tag(&self, id: TagId) -> Result<bool, RepoError> {
        self.write(|t| {
            if t.tags.remove(&id).is_none() {
                return Ok(false);
            }
            t.post_tags.retain(|(_, tag_id)| *tag_id != id);
            Ok(true)
        })
        .await
    }

    async fn page_posts(
        &self,
        filter: &PostFilter,
        page: PageRequest,
    ) -> Result<PaginationResult<Post>, RepoError> {
        Ok(self
            .read(|t| {
                let mut matching: Vec<Post> = t
                    .posts
                    .values()
                    .filter(|p| filter.matches(p, &t.tag_ids_of(p.id)))
                    .cloned()
                    .collect();
                sort_posts(&mut matching);
                paginate(&matching, page).map(|post| t.with_details(post))
            })
            .await)
    }

    async fn find_post(
        &self,
        id: PostId,
        include_details: bool,
    ) -> Result<Option<Post>, RepoError> {
        Ok(self
            .read(|t| {
                let post = t.posts.get(&id).cloned()?;
                Some(if include_details {
                    t.with_details(post)
                } else {
                    post
                })
            })
            .await)
    }

    async fn find_post_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        Ok(self
            .read(|t| {
                let post = t.posts.values().find(|p| p.slug == slug).cloned()?;
                Some(t.with_details(post))
            })
            .await)
    }

    async fn save_post(
        &self,
        write: PostWrite,
        tags: &[TagSpec],
    ) -> Result<Option<SavedPost>, RepoError> {
        let mut tables = self.tables.write().await;
        let mut draft = tables.clone();
        let PostWrite { input, at } = write;

        draft.check_slug(EntityKind::Post, &input.slug, input.id)?;
        if !draft.authors.contains_key(&input.author_id) {
            return Err(RepoError::Constraint(format!(
                "posts.author_id references missing author {}",
                input.author_id
            )));
        }
        if !draft.categories.contains_key(&input.category_id) {
            return Err(RepoError::Constraint(format!(
                "posts.category_id references missing category {}",
                input.category_id
            )));
        }

        let (id, posted_date, modified_date, view_count) = match input.id {
            None => (draft.next_id(EntityKind::Post), at, None, 0),
            Some(id) => match draft.posts.get(&id) {
                Some(existing) => (id, existing.posted_date, Some(at), existing.view_count),
                None => return Ok(None),
            },
        };

        let post = Post {
            id,
            title: input.title,
            short_description: input.short_description,
            description: input.description,
            meta: input.meta,
            slug: input.slug,
            image_url: input.image_url,
            published: input.published,
            posted_date,
            modified_date,
            view_count,
            author_id: input.author_id,
            category_id: input.category_id,
            details: None,
        };
        draft.posts.insert(id, post.clone());

        let tag_sync = sync_post_tags(&mut TablesLedger::new(&mut draft), id, tags).await?;
        let post = draft.with_details(post);

        *tables = draft;
        Ok(Some(SavedPost { post, tag_sync }))
    }

    async fn delete_post(&self, id: PostId) -> Result<bool, RepoError> {
        self.write(|t| {
            if t.posts.remove(&id).is_none() {
                return Ok(false);
            }
            t.post_tags.retain(|(post_id, _)| *post_id != id);
            Ok(true)
        })
        .await
    }

    async fn update_post_published(
        &self,
        id: PostId,
        change: PublishChange,
        at: DateTime<Utc>,
    ) -> Result<Option<Post>, RepoError> {
        self.write(|t| {
            let Some(post) = t.posts.get_mut(&id) else {
                return Ok(None);
            };
            post.published = match change {
                PublishChange::Set(published) => published,
                PublishChange::Toggle => !post.published,
            };
            post.modified_date = Some(at);
            Ok(Some(post.clone()))
        })
        .await
    }

    async fn increase_view_count(&self, id: PostId) -> Result<bool, RepoError> {
        self.write(|t| match t.posts.get_mut(&id) {
            Some(post) => {
                post.view_count += 1;
                Ok(true)
            }
            None => Ok(false),
        })
        .await
    }

    async fn slug_exists(
        &self,
        kind: EntityKind,
        slug: &str,
        exclude: Option<i32>,
    ) -> Result<bool, RepoError> {
        Ok(self
            .read(|t| {
                t.slug_owner(kind, slug)
                    .is_some_and(|owner| Some(owner) != exclude)
            })
            .await)
    }

    async fn post_counts(&self, grouping: PostGrouping) -> Result<HashMap<i32, u64>, RepoError> {
        Ok(self
            .read(|t| {
                let mut counts = HashMap::new();
                for post in t.posts.values().filter(|p| p.published) {
                    match grouping {
                        PostGrouping::Author => *counts.entry(post.author_id).or_insert(0) += 1,
                        PostGrouping::Category => {
                            *counts.entry(post.category_id).or_insert(0) += 1
                        }
                        PostGrouping::Tag => {
                            for tag_id in t.tag_ids_of(post.id) {
                                *counts.entry(tag_id).or_insert(0) += 1;
                            }
                        }
                    }
                }
                counts
            })
            .await)
    }
}
