use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;

use inkpress_core::domain::{
    Author, AuthorId, Category, CategoryId, EntityKind, Post, PostDetails, PostId, Tag, TagId,
};
use inkpress_core::error::RepoError;
use inkpress_core::tags::{TagLedger, TagSpec};

#[derive(Debug, Clone, Copy, Default)]
struct Sequences {
    author: i32,
    category: i32,
    tag: i32,
    post: i32,
}

/// The five collections. Cloned for copy-on-write transactions.
#[derive(Debug, Clone, Default)]
pub(crate) struct Tables {
    pub(crate) authors: BTreeMap<AuthorId, Author>,
    pub(crate) categories: BTreeMap<CategoryId, Category>,
    pub(crate) tags: BTreeMap<TagId, Tag>,
    /// Stored without details.
    pub(crate) posts: BTreeMap<PostId, Post>,
    pub(crate) post_tags: BTreeSet<(PostId, TagId)>,
    seq: Sequences,
}

impl Tables {
    pub(crate) fn next_id(&mut self, kind: EntityKind) -> i32 {
        let counter = match kind {
            EntityKind::Author => &mut self.seq.author,
            EntityKind::Category => &mut self.seq.category,
            EntityKind::Tag => &mut self.seq.tag,
            EntityKind::Post => &mut self.seq.post,
        };
        *counter += 1;
        *counter
    }

    pub(crate) fn slug_owner(&self, kind: EntityKind, slug: &str) -> Option<i32> {
        match kind {
            EntityKind::Author => self.authors.values().find(|a| a.slug == slug).map(|a| a.id),
            EntityKind::Category => self
                .categories
                .values()
                .find(|c| c.slug == slug)
                .map(|c| c.id),
            EntityKind::Tag => self.tags.values().find(|t| t.slug == slug).map(|t| t.id),
            EntityKind::Post => self.posts.values().find(|p| p.slug == slug).map(|p| p.id),
        }
    }

    /// Unique-index check: `slug` may only be held by `owner`.
    pub(crate) fn check_slug(
        &self,
        kind: EntityKind,
        slug: &str,
        owner: Option<i32>,
    ) -> Result<(), RepoError> {
        match self.slug_owner(kind, slug) {
            Some(id) if Some(id) != owner => Err(RepoError::SlugConflict {
                entity: kind,
                slug: slug.to_string(),
            }),
            _ => Ok(()),
        }
    }

    pub(crate) fn tag_ids_of(&self, post_id: PostId) -> Vec<TagId> {
        self.post_tags
            .range((post_id, TagId::MIN)..=(post_id, TagId::MAX))
            .map(|(_, tag_id)| *tag_id)
            .collect()
    }

    pub(crate) fn with_details(&self, post: Post) -> Post {
        let author = self.authors.get(&post.author_id).cloned();
        let category = self.categories.get(&post.category_id).cloned();
        let (Some(author), Some(category)) = (author, category) else {
            return post;
        };
        let mut tags: Vec<Tag> = self
            .tag_ids_of(post.id)
            .into_iter()
            .filter_map(|id| self.tags.get(&id).cloned())
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

        post.with_details(PostDetails {
            author,
            category,
            tags,
        })
    }

    pub(crate) fn has_posts_where(&self, pred: impl Fn(&Post) -> bool) -> bool {
        self.posts.values().any(pred)
    }
}

/// Tag ledger over a draft copy of the tables.
pub(crate) struct TablesLedger<'a> {
    tables: &'a mut Tables,
}

impl<'a> TablesLedger<'a> {
    pub(crate) fn new(tables: &'a mut Tables) -> Self {
        Self { tables }
    }
}

#[async_trait]
impl TagLedger for TablesLedger<'_> {
    async fn find_tag_by_slug(&mut self, slug: &str) -> Result<Option<Tag>, RepoError> {
        Ok(self.tables.tags.values().find(|t| t.slug == slug).cloned())
    }

    async fn create_tag(&mut self, spec: &TagSpec) -> Result<Option<Tag>, RepoError> {
        if self.tables.slug_owner(EntityKind::Tag, &spec.slug).is_some() {
            return Ok(None);
        }
        let tag = Tag {
            id: self.tables.next_id(EntityKind::Tag),
            name: spec.name.clone(),
            slug: spec.slug.clone(),
            description: None,
        };
        self.tables.tags.insert(tag.id, tag.clone());
        Ok(Some(tag))
    }

    async fn post_tag_ids(&mut self, post_id: PostId) -> Result<BTreeSet<TagId>, RepoError> {
        Ok(self.tables.tag_ids_of(post_id).into_iter().collect())
    }

    async fn link_tags(&mut self, post_id: PostId, tag_ids: &[TagId]) -> Result<(), RepoError> {
        for tag_id in tag_ids {
            if !self.tables.tags.contains_key(tag_id) {
                return Err(RepoError::Constraint(format!(
                    "posts_tags references missing tag {tag_id}"
                )));
            }
            self.tables.post_tags.insert((post_id, *tag_id));
        }
        Ok(())
    }

    async fn unlink_tags(&mut self, post_id: PostId, tag_ids: &[TagId]) -> Result<(), RepoError> {
        for tag_id in tag_ids {
            self.tables.post_tags.remove(&(post_id, *tag_id));
        }
        Ok(())
    }
}
