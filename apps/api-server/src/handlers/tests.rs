use actix_web::{App, http::StatusCode, test, web};
use serde_json::{Value, json};

use crate::observability::RequestIdMiddleware;
use crate::state::AppState;

use super::configure_routes;

macro_rules! app {
    () => {
        test::init_service(
            App::new()
                .wrap(RequestIdMiddleware)
                .app_data(web::Data::new(AppState::in_memory()))
                .configure(configure_routes),
        )
        .await
    };
}

#[actix_web::test]
async fn test_health_echoes_request_id() {
    let app = app!();
    let req = test::TestRequest::get()
        .uri("/api/health")
        .insert_header(("x-request-id", "probe-1"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get("x-request-id").unwrap(), "probe-1");
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["storage"], "memory");
    assert_eq!(body["request_id"], "probe-1");
}

#[actix_web::test]
async fn test_post_lifecycle_over_http() {
    let app = app!();

    let req = test::TestRequest::post()
        .uri("/api/authors")
        .set_json(json!({"full_name": "Ada Lovelace", "email": "ada@example.com"}))
        .to_request();
    let author: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(author["data"]["slug"], "ada-lovelace");

    let req = test::TestRequest::post()
        .uri("/api/categories")
        .set_json(json!({"name": "Engines", "description": "Analytical"}))
        .to_request();
    let category: Value = test::call_and_read_body_json(&app, req).await;

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .set_json(json!({
            "title": "Notes on the Engine",
            "short_description": "Sketch",
            "description": "Bernoulli numbers",
            "published": true,
            "author_id": author["data"]["id"],
            "category_id": category["data"]["id"],
            "tags": "math, history"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    assert_eq!(created["data"]["slug"], "notes-on-the-engine");
    assert_eq!(created["data"]["details"]["tags"].as_array().unwrap().len(), 2);

    let req = test::TestRequest::get()
        .uri("/api/tags/math/posts")
        .to_request();
    let page: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page["data"]["total_count"], 1);

    let req = test::TestRequest::get()
        .uri("/api/posts?keyword=bernoulli&page=1&page_size=5")
        .to_request();
    let page: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page["data"]["items"][0]["title"], "Notes on the Engine");
    assert_eq!(page["data"]["page_size"], 5);

    let req = test::TestRequest::get()
        .uri("/api/slugs/posts/exists?slug=Notes%20on%20the%20Engine")
        .to_request();
    let exists: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(exists["data"]["exists"], true);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/authors/{}", author["data"]["id"]))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["type"], "/problems/entity-in-use");
}

#[actix_web::test]
async fn test_duplicate_slug_is_conflict() {
    let app = app!();
    for expected in [StatusCode::CREATED, StatusCode::CONFLICT] {
        let req = test::TestRequest::post()
            .uri("/api/tags")
            .set_json(json!({"name": "Rust"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), expected);
    }
}

#[actix_web::test]
async fn test_missing_post_is_problem_details() {
    let app = app!();
    let req = test::TestRequest::get().uri("/api/posts/42").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], 404);
    assert_eq!(body["type"], "/problems/not-found");
}

#[actix_web::test]
async fn test_unknown_slug_entity_is_bad_request() {
    let app = app!();
    let req = test::TestRequest::get()
        .uri("/api/slugs/comments/exists?slug=x")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_body_errors_are_problem_details() {
    let app = app!();

    let req = test::TestRequest::post()
        .uri("/api/tags")
        .set_json(json!({"slug": "no-name"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], 422);

    let req = test::TestRequest::get().uri("/api/posts/abc").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
