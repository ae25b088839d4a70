use std::collections::BTreeSet;

use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveValue::NotSet, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter, Set,
};

use inkpress_core::domain::{EntityKind, PostId, Tag, TagId};
use inkpress_core::error::RepoError;
use inkpress_core::tags::{TagLedger, TagSpec};

use super::entity::{post_tag, tag};
use super::errors::{link_err, query_err, write_err};

/// Tag ledger bound to an open transaction; nothing lands until the caller commits.
pub(crate) struct TxnLedger<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxnLedger<'a> {
    pub(crate) fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }
}

#[async_trait]
impl TagLedger for TxnLedger<'_> {
    async fn find_tag_by_slug(&mut self, slug: &str) -> Result<Option<Tag>, RepoError> {
        let found = tag::Entity::find()
            .filter(tag::Column::Slug.eq(slug))
            .one(self.txn)
            .await
            .map_err(query_err)?;
        Ok(found.map(Into::into))
    }

    async fn create_tag(&mut self, spec: &TagSpec) -> Result<Option<Tag>, RepoError> {
        // A concurrent first use of the same tag waits on the unique index and
        // then inserts nothing.
        let inserted = tag::Entity::insert(tag::ActiveModel {
            id: NotSet,
            name: Set(spec.name.clone()),
            slug: Set(spec.slug.clone()),
            description: Set(None),
        })
        .on_conflict(OnConflict::column(tag::Column::Slug).do_nothing().to_owned())
        .exec_without_returning(self.txn)
        .await
        .map_err(write_err(EntityKind::Tag, &spec.slug))?;

        if inserted == 0 {
            tracing::debug!(slug = %spec.slug, "Tag created by a concurrent writer");
            return Ok(None);
        }
        self.find_tag_by_slug(&spec.slug).await
    }

    async fn post_tag_ids(&mut self, post_id: PostId) -> Result<BTreeSet<TagId>, RepoError> {
        let links = post_tag::Entity::find()
            .filter(post_tag::Column::PostId.eq(post_id))
            .all(self.txn)
            .await
            .map_err(query_err)?;
        Ok(links.into_iter().map(|link| link.tag_id).collect())
    }

    async fn link_tags(&mut self, post_id: PostId, tag_ids: &[TagId]) -> Result<(), RepoError> {
        if tag_ids.is_empty() {
            return Ok(());
        }
        let rows = tag_ids.iter().map(|tag_id| post_tag::ActiveModel {
            post_id: Set(post_id),
            tag_id: Set(*tag_id),
        });
        post_tag::Entity::insert_many(rows)
            .exec_without_returning(self.txn)
            .await
            .map_err(link_err)?;
        Ok(())
    }

    async fn unlink_tags(&mut self, post_id: PostId, tag_ids: &[TagId]) -> Result<(), RepoError> {
        if tag_ids.is_empty() {
            return Ok(());
        }
        post_tag::Entity::delete_many()
            .filter(post_tag::Column::PostId.eq(post_id))
            .filter(post_tag::Column::TagId.is_in(tag_ids.iter().copied()))
            .exec(self.txn)
            .await
            .map_err(query_err)?;
        Ok(())
    }
}
