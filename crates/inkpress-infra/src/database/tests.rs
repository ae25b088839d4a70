use chrono::{TimeZone, Utc};
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, TransactionTrait};

use inkpress_core::domain::EntityKind;
use inkpress_core::ports::BlogStore;
use inkpress_core::tags::{TagLedger, TagSpec};

use super::entity::{author, post, tag};
use super::ledger::TxnLedger;
use super::postgres_store::PostgresBlogStore;

fn post_model(id: i32) -> post::Model {
    let posted = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
    post::Model {
        id,
        title: "Hello SeaORM".to_owned(),
        short_description: "Short".to_owned(),
        description: "Body".to_owned(),
        meta: String::new(),
        slug: "hello-seaorm".to_owned(),
        image_url: None,
        published: true,
        posted_date: posted.into(),
        modified_date: None,
        view_count: 4,
        author_id: 1,
        category_id: 2,
    }
}

#[tokio::test]
async fn test_find_post_without_details() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![post_model(7)]])
        .into_connection();
    let store = PostgresBlogStore::new(db);

    let post = store.find_post(7, false).await.unwrap().unwrap();

    assert_eq!(post.id, 7);
    assert_eq!(post.title, "Hello SeaORM");
    assert_eq!(post.view_count, 4);
    assert!(post.details.is_none());
}

#[tokio::test]
async fn test_find_post_missing_is_none() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![Vec::<post::Model>::new()])
        .into_connection();
    let store = PostgresBlogStore::new(db);

    assert!(store.find_post(99, false).await.unwrap().is_none());
}

#[tokio::test]
async fn test_slug_exists_reports_other_owner() {
    let joined = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![
            vec![author::Model {
                id: 1,
                full_name: "John Doe".to_owned(),
                email: "john@example.com".to_owned(),
                bio: None,
                slug: "john-doe".to_owned(),
                image_url: None,
                joined_date: joined.into(),
            }],
            vec![],
        ])
        .into_connection();
    let store = PostgresBlogStore::new(db);

    assert!(
        store
            .slug_exists(EntityKind::Author, "john-doe", Some(2))
            .await
            .unwrap()
    );
    assert!(
        !store
            .slug_exists(EntityKind::Author, "john-doe", Some(1))
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn test_increase_view_count_reports_missing_post() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            },
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            },
        ])
        .into_connection();
    let store = PostgresBlogStore::new(db);

    assert!(store.increase_view_count(3).await.unwrap());
    assert!(!store.increase_view_count(4).await.unwrap());
}

#[tokio::test]
async fn test_delete_post_removes_links_then_row() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 2,
            },
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            },
        ])
        .into_connection();
    let store = PostgresBlogStore::new(db);

    assert!(store.delete_post(5).await.unwrap());
}

fn rust_spec() -> TagSpec {
    TagSpec {
        slug: "rust".to_owned(),
        name: "Rust".to_owned(),
    }
}

#[tokio::test]
async fn test_ledger_creates_missing_tag() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .append_query_results(vec![vec![tag::Model {
            id: 11,
            name: "Rust".to_owned(),
            slug: "rust".to_owned(),
            description: None,
        }]])
        .into_connection();
    let txn = db.begin().await.unwrap();

    let created = TxnLedger::new(&txn).create_tag(&rust_spec()).await.unwrap();

    assert_eq!(created.map(|t| t.id), Some(11));
}

#[tokio::test]
async fn test_ledger_yields_to_concurrent_tag_insert() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();
    let txn = db.begin().await.unwrap();

    let created = TxnLedger::new(&txn).create_tag(&rust_spec()).await.unwrap();

    assert!(created.is_none());
}
