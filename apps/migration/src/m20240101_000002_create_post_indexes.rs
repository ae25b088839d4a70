use sea_orm_migration::prelude::*;

use crate::m20240101_000001_create_blog_tables::{Posts, PostsTags};

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Indexes backing the default post order and the foreign-key filters.
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name("idx_posts_posted_date_id")
                    .table(Posts::Table)
                    .col((Posts::PostedDate, IndexOrder::Desc))
                    .col((Posts::Id, IndexOrder::Desc))
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_posts_author_id")
                    .table(Posts::Table)
                    .col(Posts::AuthorId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_posts_category_id")
                    .table(Posts::Table)
                    .col(Posts::CategoryId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_posts_tags_tag_id")
                    .table(PostsTags::Table)
                    .col(PostsTags::TagId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for name in [
            "idx_posts_tags_tag_id",
            "idx_posts_category_id",
            "idx_posts_author_id",
            "idx_posts_posted_date_id",
        ] {
            manager
                .drop_index(Index::drop().name(name).to_owned())
                .await?;
        }
        Ok(())
    }
}
