//! Tag lifecycle: free-text tag lists become persisted tags, and a post's
//! associations are moved to the target set by a minimal diff.

use std::collections::{BTreeSet, HashSet};

use async_trait::async_trait;

use crate::domain::{EntityKind, PostId, Slug, Tag, TagId};
use crate::error::RepoError;

/// A normalized tag request: the slug to look up and the display name used
/// if the tag has to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSpec {
    pub slug: String,
    pub name: String,
}

/// Split a raw tag field on `,`, `;` and line breaks, dropping blanks.
pub fn split_tag_list(raw: &str) -> Vec<String> {
    raw.split([',', ';', '\r', '\n'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Normalize tag names to specs. Names sharing a slug collapse to the first
/// occurrence; names without slug characters are skipped.
pub fn normalize_tag_names<S: AsRef<str>>(names: &[S]) -> Vec<TagSpec> {
    let mut seen = HashSet::new();
    names
        .iter()
        .filter_map(|name| {
            let name = name.as_ref().trim();
            let slug = Slug::normalize(name)?.into_inner();
            seen.insert(slug.clone()).then(|| TagSpec {
                slug,
                name: name.to_string(),
            })
        })
        .collect()
}

/// Association changes needed to move from one tag-id set to another.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagDiff {
    pub add: Vec<TagId>,
    pub remove: Vec<TagId>,
}

impl TagDiff {
    pub fn between(current: &BTreeSet<TagId>, target: &BTreeSet<TagId>) -> Self {
        Self {
            add: target.difference(current).copied().collect(),
            remove: current.difference(target).copied().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty()
    }
}

/// What a tag sync changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TagSyncReport {
    pub created: usize,
    pub added: usize,
    pub removed: usize,
}

impl TagSyncReport {
    pub fn is_noop(&self) -> bool {
        self.created == 0 && self.added == 0 && self.removed == 0
    }
}

/// Tag operations scoped to one open write (a transaction or a locked
/// in-memory table set).
#[async_trait]
pub trait TagLedger: Send {
    async fn find_tag_by_slug(&mut self, slug: &str) -> Result<Option<Tag>, RepoError>;

    /// Insert a new tag. `None` when another writer claimed the slug first;
    /// the caller reads that tag back instead.
    async fn create_tag(&mut self, spec: &TagSpec) -> Result<Option<Tag>, RepoError>;

    async fn post_tag_ids(&mut self, post_id: PostId) -> Result<BTreeSet<TagId>, RepoError>;

    async fn link_tags(&mut self, post_id: PostId, tag_ids: &[TagId]) -> Result<(), RepoError>;

    async fn unlink_tags(&mut self, post_id: PostId, tag_ids: &[TagId]) -> Result<(), RepoError>;
}

/// Resolve `specs` to tags (creating missing ones) and bring the post's
/// associations to exactly that set. Unchanged associations are not touched
/// and tags are never deleted.
pub async fn sync_post_tags<L>(
    ledger: &mut L,
    post_id: PostId,
    specs: &[TagSpec],
) -> Result<TagSyncReport, RepoError>
where
    L: TagLedger + ?Sized,
{
    let mut report = TagSyncReport::default();
    let mut target = BTreeSet::new();

    for spec in specs {
        let tag = match ledger.find_tag_by_slug(&spec.slug).await? {
            Some(tag) => tag,
            None => match ledger.create_tag(spec).await? {
                Some(tag) => {
                    report.created += 1;
                    tag
                }
                None => ledger.find_tag_by_slug(&spec.slug).await?.ok_or_else(|| {
                    RepoError::SlugConflict {
                        entity: EntityKind::Tag,
                        slug: spec.slug.clone(),
                    }
                })?,
            },
        };
        target.insert(tag.id);
    }

    let current = ledger.post_tag_ids(post_id).await?;
    let diff = TagDiff::between(&current, &target);

    if !diff.remove.is_empty() {
        ledger.unlink_tags(post_id, &diff.remove).await?;
    }
    if !diff.add.is_empty() {
        ledger.link_tags(post_id, &diff.add).await?;
    }

    report.added = diff.add.len();
    report.removed = diff.remove.len();
    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[derive(Default)]
    struct FakeLedger {
        tags: BTreeMap<String, Tag>,
        /// Slugs another writer inserts just before this ledger tries to.
        raced: BTreeSet<String>,
        links: BTreeSet<(PostId, TagId)>,
        link_calls: usize,
        unlink_calls: usize,
    }

    #[async_trait]
    impl TagLedger for FakeLedger {
        async fn find_tag_by_slug(&mut self, slug: &str) -> Result<Option<Tag>, RepoError> {
            Ok(self.tags.get(slug).cloned())
        }

        async fn create_tag(&mut self, spec: &TagSpec) -> Result<Option<Tag>, RepoError> {
            let tag = Tag {
                id: self.tags.len() as TagId + 1,
                name: spec.name.clone(),
                slug: spec.slug.clone(),
                description: None,
            };
            self.tags.insert(spec.slug.clone(), tag.clone());
            Ok((!self.raced.contains(&spec.slug)).then_some(tag))
        }

        async fn post_tag_ids(&mut self, post_id: PostId) -> Result<BTreeSet<TagId>, RepoError> {
            Ok(self
                .links
                .iter()
                .filter(|(p, _)| *p == post_id)
                .map(|(_, t)| *t)
                .collect())
        }

        async fn link_tags(&mut self, post_id: PostId, tag_ids: &[TagId]) -> Result<(), RepoError> {
            self.link_calls += 1;
            self.links.extend(tag_ids.iter().map(|t| (post_id, *t)));
            Ok(())
        }

        async fn unlink_tags(
            &mut self,
            post_id: PostId,
            tag_ids: &[TagId],
        ) -> Result<(), RepoError> {
            self.unlink_calls += 1;
            self.links
                .retain(|(p, t)| *p != post_id || !tag_ids.contains(t));
            Ok(())
        }
    }

    fn slugs_of(ledger: &FakeLedger, post_id: PostId) -> BTreeSet<String> {
        ledger
            .links
            .iter()
            .filter(|(p, _)| *p == post_id)
            .filter_map(|(_, t)| ledger.tags.values().find(|tag| tag.id == *t))
            .map(|tag| tag.slug.clone())
            .collect()
    }

    #[test]
    fn splits_on_all_separators() {
        assert_eq!(
            split_tag_list("rust, async;\r\nweb,, ;"),
            vec!["rust", "async", "web"]
        );
    }

    #[test]
    fn normalization_deduplicates_by_slug() {
        let specs = normalize_tag_names(&["Dot Net", "dot-net", "Backend", "  "]);
        assert_eq!(
            specs,
            vec![
                TagSpec {
                    slug: "dot-net".to_string(),
                    name: "Dot Net".to_string()
                },
                TagSpec {
                    slug: "backend".to_string(),
                    name: "Backend".to_string()
                },
            ]
        );
    }

    #[test]
    fn diff_leaves_intersection_alone() {
        let current = BTreeSet::from([1, 2, 3]);
        let target = BTreeSet::from([2, 3, 4]);
        let diff = TagDiff::between(&current, &target);

        assert_eq!(diff.add, vec![4]);
        assert_eq!(diff.remove, vec![1]);
        assert!(TagDiff::between(&target, &target).is_empty());
    }

    #[tokio::test]
    async fn second_identical_sync_is_a_noop() {
        let mut ledger = FakeLedger::default();
        let specs = normalize_tag_names(&["dotnet", "backend"]);

        let first = sync_post_tags(&mut ledger, 7, &specs).await.unwrap();
        assert_eq!(
            first,
            TagSyncReport {
                created: 2,
                added: 2,
                removed: 0
            }
        );

        let second = sync_post_tags(&mut ledger, 7, &specs).await.unwrap();
        assert!(second.is_noop());
        assert_eq!((ledger.link_calls, ledger.unlink_calls), (1, 0));
    }

    #[tokio::test]
    async fn retagging_swaps_only_the_changed_tag() {
        let mut ledger = FakeLedger::default();
        sync_post_tags(&mut ledger, 1, &normalize_tag_names(&["dotnet", "backend"]))
            .await
            .unwrap();

        let report = sync_post_tags(&mut ledger, 1, &normalize_tag_names(&["dotnet", "frontend"]))
            .await
            .unwrap();

        assert_eq!(
            report,
            TagSyncReport {
                created: 1,
                added: 1,
                removed: 1
            }
        );
        assert_eq!(
            slugs_of(&ledger, 1),
            BTreeSet::from(["dotnet".to_string(), "frontend".to_string()])
        );
        assert!(ledger.tags.contains_key("backend"));
    }

    #[tokio::test]
    async fn tag_created_concurrently_is_reused() {
        let mut ledger = FakeLedger {
            raced: BTreeSet::from(["rust".to_string()]),
            ..Default::default()
        };

        let report = sync_post_tags(&mut ledger, 4, &normalize_tag_names(&["Rust", "async"]))
            .await
            .unwrap();

        assert_eq!(report.created, 1);
        assert_eq!(report.added, 2);
        assert_eq!(
            slugs_of(&ledger, 4),
            BTreeSet::from(["async".to_string(), "rust".to_string()])
        );
    }
}
