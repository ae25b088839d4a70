//! PostgreSQL blog store.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, Func, Order, SimpleExpr};
use sea_orm::{
    AccessMode, ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait,
    DatabaseTransaction, DbConn, DbErr, EntityTrait, IntoActiveModel, IsolationLevel, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select, Set,
    TransactionTrait,
};

use inkpress_core::domain::{
    Author, AuthorId, AuthorInput, Category, CategoryId, CategoryInput, EntityKind, Post,
    PostDetails, PostId, PostWrite, Tag, TagId, TagInput,
};
use inkpress_core::error::RepoError;
use inkpress_core::pagination::{PageRequest, PageWindow, PaginationResult};
use inkpress_core::ports::{BlogStore, ImageUrlChange, PostGrouping, PublishChange, SavedPost};
use inkpress_core::query::PostFilter;
use inkpress_core::tags::{TagSpec, sync_post_tags};

use super::entity::{author, category, post, post_tag, tag};
use super::errors::{delete_err, query_err, write_err};
use super::filter::{like_pattern, lower_like, post_condition};
use super::ledger::TxnLedger;

/// Blog store backed by PostgreSQL through SeaORM.
///
/// Paged reads run in a read-only REPEATABLE READ transaction so the count
/// and the page see one snapshot. Multi-statement writes run in one
/// transaction; dropping the future before commit rolls it back.
pub struct PostgresBlogStore {
    pub(crate) db: DbConn,
}

impl PostgresBlogStore {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    async fn begin(&self) -> Result<DatabaseTransaction, RepoError> {
        self.db.begin().await.map_err(query_err)
    }

    async fn snapshot(&self) -> Result<DatabaseTransaction, RepoError> {
        self.db
            .begin_with_config(
                Some(IsolationLevel::RepeatableRead),
                Some(AccessMode::ReadOnly),
            )
            .await
            .map_err(query_err)
    }

    async fn post_with_details<C: ConnectionTrait>(
        db: &C,
        model: post::Model,
    ) -> Result<Post, RepoError> {
        let mut posts = load_details(db, vec![model]).await?;
        posts
            .pop()
            .ok_or_else(|| RepoError::Query("post vanished while loading details".to_string()))
    }

    async fn page<E, C>(
        db: &C,
        select: Select<E>,
        page: PageRequest,
    ) -> Result<(PageWindow, Vec<E::Model>), RepoError>
    where
        E: EntityTrait,
        E::Model: Send + Sync,
        C: ConnectionTrait,
    {
        let total = select.clone().count(db).await.map_err(query_err)?;
        let window = page.window(total);
        let models = select
            .offset(window.offset)
            .limit(window.limit())
            .all(db)
            .await
            .map_err(query_err)?;
        Ok((window, models))
    }
}

fn lower_order<C: ColumnTrait>(column: C) -> SimpleExpr {
    Func::lower(Expr::col(column)).into()
}

/// Attach author, category and tags to each post with one query per table.
/// Input order is preserved.
async fn load_details<C: ConnectionTrait>(
    db: &C,
    models: Vec<post::Model>,
) -> Result<Vec<Post>, RepoError> {
    if models.is_empty() {
        return Ok(Vec::new());
    }

    let author_ids: BTreeSet<i32> = models.iter().map(|m| m.author_id).collect();
    let category_ids: BTreeSet<i32> = models.iter().map(|m| m.category_id).collect();
    let post_ids: BTreeSet<i32> = models.iter().map(|m| m.id).collect();

    let authors: HashMap<AuthorId, Author> = author::Entity::find()
        .filter(author::Column::Id.is_in(author_ids))
        .all(db)
        .await
        .map_err(query_err)?
        .into_iter()
        .map(|m| (m.id, m.into()))
        .collect();

    let categories: HashMap<CategoryId, Category> = category::Entity::find()
        .filter(category::Column::Id.is_in(category_ids))
        .all(db)
        .await
        .map_err(query_err)?
        .into_iter()
        .map(|m| (m.id, m.into()))
        .collect();

    let links = post_tag::Entity::find()
        .filter(post_tag::Column::PostId.is_in(post_ids))
        .find_also_related(tag::Entity)
        .all(db)
        .await
        .map_err(query_err)?;

    let mut tags_by_post: HashMap<PostId, Vec<Tag>> = HashMap::new();
    for (link, tag) in links {
        if let Some(tag) = tag {
            tags_by_post.entry(link.post_id).or_default().push(tag.into());
        }
    }

    Ok(models
        .into_iter()
        .map(|model| {
            let author = authors.get(&model.author_id).cloned();
            let category = categories.get(&model.category_id).cloned();
            let mut tags = tags_by_post.remove(&model.id).unwrap_or_default();
            tags.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

            let post: Post = model.into();
            match (author, category) {
                (Some(author), Some(category)) => post.with_details(PostDetails {
                    author,
                    category,
                    tags,
                }),
                _ => post,
            }
        })
        .collect())
}

async fn slug_taken<E, C>(
    db: &C,
    slug_column: E::Column,
    id_column: E::Column,
    slug: &str,
    exclude: Option<i32>,
) -> Result<bool, RepoError>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    let mut select = E::find().filter(slug_column.eq(slug));
    if let Some(id) = exclude {
        select = select.filter(id_column.ne(id));
    }
    Ok(select.one(db).await.map_err(query_err)?.is_some())
}

/// `None` for an update that matched no row.
fn updated<M>(
    result: Result<M, DbErr>,
    map: impl FnOnce(DbErr) -> RepoError,
) -> Result<Option<M>, RepoError> {
    match result {
        Ok(model) => Ok(Some(model)),
        Err(DbErr::RecordNotUpdated) => Ok(None),
        Err(err) => Err(map(err)),
    }
}

#[async_trait]
impl BlogStore for PostgresBlogStore {
    async fn list_authors(&self) -> Result<Vec<Author>, RepoError> {
        let models = author::Entity::find()
            .order_by(lower_order(author::Column::FullName), Order::Asc)
            .order_by_asc(author::Column::Id)
            .all(&self.db)
            .await
            .map_err(query_err)?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn page_authors(
        &self,
        name: Option<&str>,
        page: PageRequest,
    ) -> Result<PaginationResult<Author>, RepoError> {
        let mut select = author::Entity::find();
        if let Some(name) = name {
            select = select.filter(lower_like(author::Column::FullName, &like_pattern(name)));
        }
        let select = select
            .order_by(lower_order(author::Column::FullName), Order::Asc)
            .order_by_asc(author::Column::Id);

        let txn = self.snapshot().await?;
        let (window, models) = Self::page(&txn, select, page).await?;
        txn.commit().await.map_err(query_err)?;

        Ok(window.into_result(models.into_iter().map(Into::into).collect()))
    }

    async fn find_author(&self, id: AuthorId) -> Result<Option<Author>, RepoError> {
        let found = author::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(query_err)?;
        Ok(found.map(Into::into))
    }

    async fn find_author_by_slug(&self, slug: &str) -> Result<Option<Author>, RepoError> {
        let found = author::Entity::find()
            .filter(author::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(query_err)?;
        Ok(found.map(Into::into))
    }

    async fn save_author(
        &self,
        input: AuthorInput,
        joined: DateTime<Utc>,
    ) -> Result<Option<Author>, RepoError> {
        let slug = input.slug.clone();
        let mut active = author::ActiveModel {
            id: NotSet,
            full_name: Set(input.full_name),
            email: Set(input.email),
            bio: Set(input.bio),
            slug: Set(input.slug),
            image_url: Set(input.image_url),
            joined_date: NotSet,
        };

        let saved = match input.id {
            None => {
                active.joined_date = Set(joined.into());
                Some(
                    active
                        .insert(&self.db)
                        .await
                        .map_err(write_err(EntityKind::Author, &slug))?,
                )
            }
            Some(id) => {
                active.id = Set(id);
                updated(
                    active.update(&self.db).await,
                    write_err(EntityKind::Author, &slug),
                )?
            }
        };
        Ok(saved.map(Into::into))
    }

    async fn delete_author(&self, id: AuthorId) -> Result<bool, RepoError> {
        let txn = self.begin().await?;
        if author::Entity::find_by_id(id)
            .one(&txn)
            .await
            .map_err(query_err)?
            .is_none()
        {
            return Ok(false);
        }
        let referencing = post::Entity::find()
            .filter(post::Column::AuthorId.eq(id))
            .count(&txn)
            .await
            .map_err(query_err)?;
        if referencing > 0 {
            return Err(RepoError::InUse {
                entity: EntityKind::Author,
                id,
            });
        }
        author::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(delete_err(EntityKind::Author, id))?;
        txn.commit().await.map_err(query_err)?;
        Ok(true)
    }

    async fn set_author_image_url(
        &self,
        id: AuthorId,
        image_url: Option<String>,
    ) -> Result<Option<ImageUrlChange>, RepoError> {
        let txn = self.begin().await?;
        let Some(existing) = author::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(query_err)?
        else {
            return Ok(None);
        };

        let previous = existing.image_url.clone();
        let mut active = existing.into_active_model();
        active.image_url = Set(image_url);
        let model = active.update(&txn).await.map_err(query_err)?;
        txn.commit().await.map_err(query_err)?;

        Ok(Some(ImageUrlChange {
            author: model.into(),
            previous,
        }))
    }

    async fn list_categories(&self) -> Result<Vec<Category>, RepoError> {
        let models = category::Entity::find()
            .order_by(lower_order(category::Column::Name), Order::Asc)
            .order_by_asc(category::Column::Id)
            .all(&self.db)
            .await
            .map_err(query_err)?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn find_category(&self, id: CategoryId) -> Result<Option<Category>, RepoError> {
        let found = category::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(query_err)?;
        Ok(found.map(Into::into))
    }

    async fn find_category_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let found = category::Entity::find()
            .filter(category::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(query_err)?;
        Ok(found.map(Into::into))
    }

    async fn save_category(&self, input: CategoryInput) -> Result<Option<Category>, RepoError> {
        let slug = input.slug.clone();
        let mut active = category::ActiveModel {
            id: NotSet,
            name: Set(input.name),
            description: Set(input.description),
            slug: Set(input.slug),
            show_on_menu: Set(input.show_on_menu),
        };

        let saved = match input.id {
            None => Some(
                active
                    .insert(&self.db)
                    .await
                    .map_err(write_err(EntityKind::Category, &slug))?,
            ),
            Some(id) => {
                active.id = Set(id);
                updated(
                    active.update(&self.db).await,
                    write_err(EntityKind::Category, &slug),
                )?
            }
        };
        Ok(saved.map(Into::into))
    }

    async fn delete_category(&self, id: CategoryId) -> Result<bool, RepoError> {
        let txn = self.begin().await?;
        if category::Entity::find_by_id(id)
            .one(&txn)
            .await
            .map_err(query_err)?
            .is_none()
        {
            return Ok(false);
        }
        let referencing = post::Entity::find()
            .filter(post::Column::CategoryId.eq(id))
            .count(&txn)
            .await
            .map_err(query_err)?;
        if referencing > 0 {
            return Err(RepoError::InUse {
                entity: EntityKind::Category,
                id,
            });
        }
        category::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(delete_err(EntityKind::Category, id))?;
        txn.commit().await.map_err(query_err)?;
        Ok(true)
    }

    async fn list_tags(&self) -> Result<Vec<Tag>, RepoError> {
        let models = tag::Entity::find()
            .order_by(lower_order(tag::Column::Name), Order::Asc)
            .order_by_asc(tag::Column::Id)
            .all(&self.db)
            .await
            .map_err(query_err)?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn find_tag_by_slug(&self, slug: &str) -> Result<Option<Tag>, RepoError> {
        let found = tag::Entity::find()
            .filter(tag::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(query_err)?;
        Ok(found.map(Into::into))
    }

    async fn save_tag(&self, input: TagInput) -> Result<Option<Tag>, RepoError> {
        let slug = input.slug.clone();
        let mut active = tag::ActiveModel {
            id: NotSet,
            name: Set(input.name),
            slug: Set(input.slug),
            description: Set(input.description),
        };

        let saved = match input.id {
            None => Some(
                active
                    .insert(&self.db)
                    .await
                    .map_err(write_err(EntityKind::Tag, &slug))?,
            ),
            Some(id) => {
                active.id = Set(id);
                updated(
                    active.update(&self.db).await,
                    write_err(EntityKind::Tag, &slug),
                )?
            }
        };
        Ok(saved.map(Into::into))
    }

    async fn delete_tag(&self, id: TagId) -> Result<bool, RepoError> {
        let txn = self.begin().await?;
        post_tag::Entity::delete_many()
            .filter(post_tag::Column::TagId.eq(id))
            .exec(&txn)
            .await
            .map_err(query_err)?;
        let removed = tag::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(query_err)?;
        txn.commit().await.map_err(query_err)?;
        Ok(removed.rows_affected > 0)
    }

    async fn page_posts(
        &self,
        filter: &PostFilter,
        page: PageRequest,
    ) -> Result<PaginationResult<Post>, RepoError> {
        let select = post::Entity::find()
            .filter(post_condition(filter))
            .order_by_desc(post::Column::PostedDate)
            .order_by_desc(post::Column::Id);

        let txn = self.snapshot().await?;
        let (window, models) = Self::page(&txn, select, page).await?;
        let posts = load_details(&txn, models).await?;
        txn.commit().await.map_err(query_err)?;

        tracing::debug!(total = window.total_count, page = window.page, "Paged posts");
        Ok(window.into_result(posts))
    }

    async fn find_post(
        &self,
        id: PostId,
        include_details: bool,
    ) -> Result<Option<Post>, RepoError> {
        if !include_details {
            let found = post::Entity::find_by_id(id)
                .one(&self.db)
                .await
                .map_err(query_err)?;
            return Ok(found.map(Into::into));
        }

        let txn = self.snapshot().await?;
        let found = post::Entity::find_by_id(id)
            .one(&txn)
            .await
            .map_err(query_err)?;
        let post = match found {
            Some(model) => Some(Self::post_with_details(&txn, model).await?),
            None => None,
        };
        txn.commit().await.map_err(query_err)?;
        Ok(post)
    }

    async fn find_post_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        let txn = self.snapshot().await?;
        let found = post::Entity::find()
            .filter(post::Column::Slug.eq(slug))
            .one(&txn)
            .await
            .map_err(query_err)?;
        let post = match found {
            Some(model) => Some(Self::post_with_details(&txn, model).await?),
            None => None,
        };
        txn.commit().await.map_err(query_err)?;
        Ok(post)
    }

    async fn save_post(
        &self,
        write: PostWrite,
        tags: &[TagSpec],
    ) -> Result<Option<SavedPost>, RepoError> {
        let PostWrite { input, at } = write;
        let slug = input.slug.clone();
        let txn = self.begin().await?;

        let model = match input.id {
            None => post::ActiveModel {
                id: NotSet,
                title: Set(input.title),
                short_description: Set(input.short_description),
                description: Set(input.description),
                meta: Set(input.meta),
                slug: Set(input.slug),
                image_url: Set(input.image_url),
                published: Set(input.published),
                posted_date: Set(at.into()),
                modified_date: Set(None),
                view_count: Set(0),
                author_id: Set(input.author_id),
                category_id: Set(input.category_id),
            }
            .insert(&txn)
            .await
            .map_err(write_err(EntityKind::Post, &slug))?,
            Some(id) => {
                let Some(existing) = post::Entity::find_by_id(id)
                    .lock_exclusive()
                    .one(&txn)
                    .await
                    .map_err(query_err)?
                else {
                    return Ok(None);
                };
                let mut active = existing.into_active_model();
                active.title = Set(input.title);
                active.short_description = Set(input.short_description);
                active.description = Set(input.description);
                active.meta = Set(input.meta);
                active.slug = Set(input.slug);
                active.image_url = Set(input.image_url);
                active.published = Set(input.published);
                active.modified_date = Set(Some(at.into()));
                active.author_id = Set(input.author_id);
                active.category_id = Set(input.category_id);
                active
                    .update(&txn)
                    .await
                    .map_err(write_err(EntityKind::Post, &slug))?
            }
        };

        let tag_sync = sync_post_tags(&mut TxnLedger::new(&txn), model.id, tags).await?;
        let post = Self::post_with_details(&txn, model).await?;
        txn.commit().await.map_err(query_err)?;

        Ok(Some(SavedPost { post, tag_sync }))
    }

    async fn delete_post(&self, id: PostId) -> Result<bool, RepoError> {
        let txn = self.begin().await?;
        post_tag::Entity::delete_many()
            .filter(post_tag::Column::PostId.eq(id))
            .exec(&txn)
            .await
            .map_err(query_err)?;
        let removed = post::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(query_err)?;
        txn.commit().await.map_err(query_err)?;
        Ok(removed.rows_affected > 0)
    }

    async fn update_post_published(
        &self,
        id: PostId,
        change: PublishChange,
        at: DateTime<Utc>,
    ) -> Result<Option<Post>, RepoError> {
        let txn = self.begin().await?;
        let Some(existing) = post::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(query_err)?
        else {
            return Ok(None);
        };

        let published = match change {
            PublishChange::Set(published) => published,
            PublishChange::Toggle => !existing.published,
        };
        let mut active = existing.into_active_model();
        active.published = Set(published);
        active.modified_date = Set(Some(at.into()));
        let model = active.update(&txn).await.map_err(query_err)?;
        txn.commit().await.map_err(query_err)?;

        Ok(Some(model.into()))
    }

    async fn increase_view_count(&self, id: PostId) -> Result<bool, RepoError> {
        let result = post::Entity::update_many()
            .col_expr(
                post::Column::ViewCount,
                Expr::col(post::Column::ViewCount).add(1),
            )
            .filter(post::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(query_err)?;
        Ok(result.rows_affected > 0)
    }

    async fn slug_exists(
        &self,
        kind: EntityKind,
        slug: &str,
        exclude: Option<i32>,
    ) -> Result<bool, RepoError> {
        match kind {
            EntityKind::Author => {
                slug_taken::<author::Entity, _>(
                    &self.db,
                    author::Column::Slug,
                    author::Column::Id,
                    slug,
                    exclude,
                )
                .await
            }
            EntityKind::Category => {
                slug_taken::<category::Entity, _>(
                    &self.db,
                    category::Column::Slug,
                    category::Column::Id,
                    slug,
                    exclude,
                )
                .await
            }
            EntityKind::Tag => {
                slug_taken::<tag::Entity, _>(
                    &self.db,
                    tag::Column::Slug,
                    tag::Column::Id,
                    slug,
                    exclude,
                )
                .await
            }
            EntityKind::Post => {
                slug_taken::<post::Entity, _>(
                    &self.db,
                    post::Column::Slug,
                    post::Column::Id,
                    slug,
                    exclude,
                )
                .await
            }
        }
    }

    async fn post_counts(&self, grouping: PostGrouping) -> Result<HashMap<i32, u64>, RepoError> {
        let rows: Vec<(i32, i64)> = match grouping {
            PostGrouping::Author | PostGrouping::Category => {
                let key = match grouping {
                    PostGrouping::Author => post::Column::AuthorId,
                    _ => post::Column::CategoryId,
                };
                post::Entity::find()
                    .select_only()
                    .column(key)
                    .column_as(Expr::col((post::Entity, post::Column::Id)).count(), "post_count")
                    .filter(post::Column::Published.eq(true))
                    .group_by(key)
                    .into_tuple()
                    .all(&self.db)
                    .await
                    .map_err(query_err)?
            }
            PostGrouping::Tag => post_tag::Entity::find()
                .select_only()
                .column(post_tag::Column::TagId)
                .column_as(
                    Expr::col((post_tag::Entity, post_tag::Column::PostId)).count(),
                    "post_count",
                )
                .join(JoinType::InnerJoin, post_tag::Relation::Post.def())
                .filter(post::Column::Published.eq(true))
                .group_by(post_tag::Column::TagId)
                .into_tuple()
                .all(&self.db)
                .await
                .map_err(query_err)?,
        };

        Ok(rows
            .into_iter()
            .map(|(id, count)| (id, count.max(0) as u64))
            .collect())
    }
}
