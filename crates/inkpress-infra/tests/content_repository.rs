//! End-to-end behaviour of the content repository over the in-memory store.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Duration, TimeZone, Utc};

use inkpress_core::domain::{
    Author, AuthorId, AuthorInput, Category, CategoryInput, EntityKind, Post, PostInput, TagInput,
};
use inkpress_core::ports::{Clock, LookupCache};
use inkpress_core::{ContentRepository, DomainError, PageRequest, PostQuery};
use inkpress_infra::{InMemoryBlogStore, InMemoryLookupCache, LookupCacheConfig};

/// Advances one minute per reading so writes get distinct timestamps.
struct SteppingClock {
    base: DateTime<Utc>,
    ticks: AtomicI64,
}

impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        let n = self.ticks.fetch_add(1, Ordering::SeqCst);
        self.base + Duration::minutes(n)
    }
}

fn repository() -> ContentRepository {
    let store = Arc::new(InMemoryBlogStore::new());
    let cache: Arc<dyn LookupCache<AuthorId, Author>> =
        Arc::new(InMemoryLookupCache::new(LookupCacheConfig { ttl: None }));
    let clock = Arc::new(SteppingClock {
        base: Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap(),
        ticks: AtomicI64::new(0),
    });
    ContentRepository::new(store, cache).with_clock(clock)
}

async fn author(repo: &ContentRepository, name: &str) -> Author {
    repo.add_or_update_author(AuthorInput {
        full_name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
        slug: name.to_string(),
        ..Default::default()
    })
    .await
    .unwrap()
}

async fn category(repo: &ContentRepository, name: &str) -> Category {
    repo.add_or_update_category(CategoryInput {
        name: name.to_string(),
        description: format!("All about {name}"),
        slug: name.to_string(),
        show_on_menu: true,
        ..Default::default()
    })
    .await
    .unwrap()
}

fn post_input(title: &str, author_id: i32, category_id: i32) -> PostInput {
    PostInput {
        title: title.to_string(),
        short_description: format!("{title} in brief"),
        description: format!("The full story of {title}"),
        slug: title.to_string(),
        published: true,
        author_id,
        category_id,
        ..Default::default()
    }
}

async fn post(repo: &ContentRepository, title: &str, author_id: i32, category_id: i32) -> Post {
    repo.create_or_update_post(post_input(title, author_id, category_id), &["general"])
        .await
        .unwrap()
}

fn tag_slugs(post: &Post) -> Vec<String> {
    post.tag_slugs().into_iter().map(str::to_string).collect()
}

#[tokio::test]
async fn paging_by_category_returns_the_requested_slice() {
    let repo = repository();
    let writer = author(&repo, "Ada Lovelace").await;
    category(&repo, "News").await;
    category(&repo, "Events").await;
    let target = category(&repo, "Guides").await;
    assert_eq!(target.id, 3);

    for n in 1..=12 {
        post(&repo, &format!("Guide {n}"), writer.id, target.id).await;
    }

    let page = repo
        .get_paged_posts(&PostQuery::new().category_id(3), PageRequest::new(2, 5))
        .await
        .unwrap();

    assert_eq!(page.total_count, 12);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.page_number, 2);
    let titles: Vec<&str> = page.items.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, ["Guide 7", "Guide 6", "Guide 5", "Guide 4", "Guide 3"]);
    assert!(page.items.iter().all(|p| p.details.is_some()));
}

#[tokio::test]
async fn out_of_range_page_is_clamped_to_the_last_page() {
    let repo = repository();
    let writer = author(&repo, "Ada Lovelace").await;
    let news = category(&repo, "News").await;
    for n in 1..=3 {
        post(&repo, &format!("Note {n}"), writer.id, news.id).await;
    }

    let page = repo
        .get_paged_posts(&PostQuery::new(), PageRequest::new(99, 2))
        .await
        .unwrap();

    assert_eq!(page.page_number, 2);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.items.len(), 1);
    assert!(!page.has_next_page());
}

#[tokio::test]
async fn unknown_slug_yields_an_empty_page() {
    let repo = repository();
    let writer = author(&repo, "Ada Lovelace").await;
    let news = category(&repo, "News").await;
    post(&repo, "Only post", writer.id, news.id).await;

    let page = repo
        .get_paged_posts(
            &PostQuery::new().category_slug("does-not-exist"),
            PageRequest::default(),
        )
        .await
        .unwrap();

    assert!(page.items.is_empty());
    assert_eq!(page.total_count, 0);
    assert_eq!(page.total_pages, 0);
}

#[tokio::test]
async fn keyword_and_published_only_narrow_the_listing() {
    let repo = repository();
    let writer = author(&repo, "Ada Lovelace").await;
    let news = category(&repo, "News").await;
    post(&repo, "Learning Rust", writer.id, news.id).await;
    post(&repo, "Gardening tips", writer.id, news.id).await;
    let mut draft = post_input("Rust drafts", writer.id, news.id);
    draft.published = false;
    repo.create_or_update_post(draft, &["rust"]).await.unwrap();

    let all_rust = repo
        .get_paged_posts(&PostQuery::new().keyword("RUST"), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(all_rust.total_count, 2);

    let published_rust = repo
        .get_paged_posts(
            &PostQuery::new().keyword("rust").published_only(),
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(published_rust.total_count, 1);
    assert_eq!(published_rust.items[0].title, "Learning Rust");
}

#[tokio::test]
async fn tag_slug_filter_matches_tagged_posts() {
    let repo = repository();
    let writer = author(&repo, "Ada Lovelace").await;
    let news = category(&repo, "News").await;
    repo.create_or_update_post(post_input("Tagged", writer.id, news.id), &["Rust", "async"])
        .await
        .unwrap();
    post(&repo, "Untagged", writer.id, news.id).await;

    let page = repo
        .get_paged_posts(&PostQuery::new().tag_slug("rust"), PageRequest::default())
        .await
        .unwrap();

    assert_eq!(page.total_count, 1);
    assert_eq!(page.items[0].title, "Tagged");
}

#[tokio::test]
async fn duplicate_author_slug_is_rejected() {
    let repo = repository();
    let john = author(&repo, "John Doe").await;
    assert_eq!(john.slug, "john-doe");

    let err = repo
        .add_or_update_author(AuthorInput {
            full_name: "Another John".to_string(),
            email: "another@example.com".to_string(),
            slug: "John Doe".to_string(),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::SlugConflict { entity: EntityKind::Author, ref slug } if slug == "john-doe"
    ));

    // Keeping one's own slug on update is not a conflict.
    let renamed = repo
        .add_or_update_author(AuthorInput {
            id: Some(john.id),
            full_name: "John A. Doe".to_string(),
            email: john.email.clone(),
            slug: "john-doe".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(renamed.full_name, "John A. Doe");
    assert_eq!(renamed.joined_date, john.joined_date);

    assert!(
        repo.is_slug_existed(EntityKind::Author, None, "john-doe")
            .await
            .unwrap()
    );
    assert!(
        !repo
            .is_slug_existed(EntityKind::Author, Some(john.id), "john-doe")
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn retagging_swaps_tags_and_keeps_the_old_tag_around() {
    let repo = repository();
    let writer = author(&repo, "Ada Lovelace").await;
    let news = category(&repo, "News").await;

    let created = repo
        .create_or_update_post(post_input("Stack", writer.id, news.id), &["dotnet", "backend"])
        .await
        .unwrap();
    assert_eq!(tag_slugs(&created), ["backend", "dotnet"]);

    let mut update = post_input("Stack", writer.id, news.id);
    update.id = Some(created.id);
    let updated = repo
        .create_or_update_post(update.clone(), &["dotnet", "frontend"])
        .await
        .unwrap();
    assert_eq!(tag_slugs(&updated), ["dotnet", "frontend"]);
    assert_eq!(updated.posted_date, created.posted_date);
    assert!(updated.modified_date.is_some());

    let tags = repo.get_tags().await.unwrap();
    assert_eq!(tags.len(), 3);
    let backend = tags.iter().find(|t| t.tag.slug == "backend").unwrap();
    assert_eq!(backend.post_count, 0);

    // Saving the same list again creates nothing.
    repo.create_or_update_post(update, &["Frontend", "dotnet", "dotnet"])
        .await
        .unwrap();
    assert_eq!(repo.get_tags().await.unwrap().len(), 3);
}

#[tokio::test]
async fn deleting_a_post_keeps_its_tags() {
    let repo = repository();
    let writer = author(&repo, "Ada Lovelace").await;
    let news = category(&repo, "News").await;
    let created = repo
        .create_or_update_post(post_input("Short lived", writer.id, news.id), &["ephemeral"])
        .await
        .unwrap();

    assert!(repo.delete_post(created.id).await.unwrap());
    assert!(!repo.delete_post(created.id).await.unwrap());

    let tag = repo.get_tag_by_slug("ephemeral").await.unwrap();
    assert_eq!(tag.name, "ephemeral");
    assert!(matches!(
        repo.get_post_by_id(created.id, false).await,
        Err(DomainError::NotFound { entity: EntityKind::Post, .. })
    ));
}

#[tokio::test]
async fn authors_with_most_posts_break_ties_by_id() {
    let repo = repository();
    let first = author(&repo, "First Writer").await;
    let second = author(&repo, "Second Writer").await;
    let third = author(&repo, "Third Writer").await;
    let news = category(&repo, "News").await;

    for (writer, count) in [(&third, 3), (&second, 5), (&first, 5)] {
        for n in 0..count {
            post(&repo, &format!("{} {n}", writer.full_name), writer.id, news.id).await;
        }
    }

    let top = repo.get_authors_with_most_posts(2).await.unwrap();
    let ids: Vec<i32> = top.iter().map(|item| item.author.id).collect();
    assert_eq!(ids, [first.id, second.id]);
    assert!(top.iter().all(|item| item.post_count == 5));

    assert!(repo.get_authors_with_most_posts(0).await.unwrap().is_empty());
}

#[tokio::test]
async fn cached_author_reflects_committed_updates() {
    let repo = repository();
    let ada = author(&repo, "Ada Lovelace").await;

    let cached = repo.get_author_by_id(ada.id).await.unwrap();
    assert_eq!(cached.full_name, "Ada Lovelace");

    repo.add_or_update_author(AuthorInput {
        id: Some(ada.id),
        full_name: "Augusta Ada King".to_string(),
        email: ada.email.clone(),
        slug: ada.slug.clone(),
        ..Default::default()
    })
    .await
    .unwrap();
    let after_update = repo.get_author_by_id(ada.id).await.unwrap();
    assert_eq!(after_update.full_name, "Augusta Ada King");

    let change = repo
        .set_author_image_url(ada.id, Some("/images/ada.png".to_string()))
        .await
        .unwrap();
    assert_eq!(change.previous, None);
    let after_image = repo.get_author_by_id(ada.id).await.unwrap();
    assert_eq!(after_image.image_url.as_deref(), Some("/images/ada.png"));
}

#[tokio::test]
async fn referenced_author_and_category_cannot_be_deleted() {
    let repo = repository();
    let writer = author(&repo, "Ada Lovelace").await;
    let news = category(&repo, "News").await;
    let created = post(&repo, "Anchor", writer.id, news.id).await;

    assert!(matches!(
        repo.delete_author(writer.id).await,
        Err(DomainError::InUse { entity: EntityKind::Author, .. })
    ));
    assert!(matches!(
        repo.delete_category(news.id).await,
        Err(DomainError::InUse { entity: EntityKind::Category, .. })
    ));

    repo.delete_post(created.id).await.unwrap();
    assert!(repo.delete_author(writer.id).await.unwrap());
    assert!(repo.delete_category(news.id).await.unwrap());
}

#[tokio::test]
async fn publish_changes_stamp_modified_date_only() {
    let repo = repository();
    let writer = author(&repo, "Ada Lovelace").await;
    let news = category(&repo, "News").await;
    let created = post(&repo, "Flip", writer.id, news.id).await;
    assert!(created.modified_date.is_none());

    let hidden = repo.set_post_published(created.id, false).await.unwrap();
    assert!(!hidden.published);
    assert_eq!(hidden.posted_date, created.posted_date);
    assert!(hidden.modified_date.is_some());

    let shown = repo.toggle_post_published(created.id).await.unwrap();
    assert!(shown.published);

    assert!(repo.increase_view_count(created.id).await.unwrap());
    let reloaded = repo.get_post_by_slug("flip").await.unwrap();
    assert_eq!(reloaded.view_count, 1);
}

#[tokio::test]
async fn post_for_missing_author_is_rejected() {
    let repo = repository();
    let news = category(&repo, "News").await;

    let err = repo
        .create_or_update_post(post_input("Orphan", 42, news.id), &["x"])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::NotFound { entity: EntityKind::Author, id: 42 }
    ));
    assert!(repo.get_tags().await.unwrap().is_empty());
}

#[tokio::test]
async fn tag_crud_round_trip() {
    let repo = repository();
    let tag = repo
        .add_or_update_tag(TagInput {
            name: "Web Assembly".to_string(),
            slug: "Web Assembly".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(tag.slug, "web-assembly");

    assert!(repo.delete_tag(tag.id).await.unwrap());
    assert!(matches!(
        repo.get_tag_by_slug("web-assembly").await,
        Err(DomainError::SlugNotFound { .. })
    ));
}

#[tokio::test]
async fn concurrent_authors_with_one_slug_admit_exactly_one() {
    let repo = repository();
    let input = |email: &str| AuthorInput {
        full_name: "John Doe".to_string(),
        email: email.to_string(),
        slug: "john-doe".to_string(),
        ..Default::default()
    };

    let (first, second) = tokio::join!(
        repo.add_or_update_author(input("john@example.com")),
        repo.add_or_update_author(input("doe@example.com")),
    );

    let outcomes = [first, second];
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(outcomes.iter().any(|r| matches!(
        r,
        Err(DomainError::SlugConflict { entity: EntityKind::Author, .. })
    )));
    assert_eq!(repo.get_authors().await.unwrap().len(), 1);
}
