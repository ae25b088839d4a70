//! Tag handlers.

use actix_web::{HttpResponse, web};

use inkpress_core::PostQuery;
use inkpress_core::domain::TagInput;
use inkpress_shared::ApiResponse;
use inkpress_shared::dto::{Affected, PageParams, TagRequest};

use crate::middleware::error::AppResult;
use crate::state::AppState;

use super::posts::published_page;

fn tag_input(id: Option<i32>, req: TagRequest) -> TagInput {
    let slug = req
        .slug
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| req.name.clone());
    TagInput {
        id,
        name: req.name,
        slug,
        description: req.description,
    }
}

/// GET /api/tags
pub async fn list(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let tags = state.content.get_tags().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(tags)))
}

/// GET /api/tags/{slug}/posts
pub async fn posts(
    state: web::Data<AppState>,
    path: web::Path<String>,
    paging: web::Query<PageParams>,
) -> AppResult<HttpResponse> {
    let query = PostQuery::new().tag_slug(path.into_inner());
    published_page(&state, query, &paging).await
}

/// POST /api/tags
pub async fn create(
    state: web::Data<AppState>,
    body: web::Json<TagRequest>,
) -> AppResult<HttpResponse> {
    let tag = state
        .content
        .add_or_update_tag(tag_input(None, body.into_inner()))
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(tag)))
}

/// PUT /api/tags/{id}
pub async fn update(
    state: web::Data<AppState>,
    path: web::Path<i32>,
    body: web::Json<TagRequest>,
) -> AppResult<HttpResponse> {
    let tag = state
        .content
        .add_or_update_tag(tag_input(Some(path.into_inner()), body.into_inner()))
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(tag)))
}

/// DELETE /api/tags/{id}
pub async fn delete(state: web::Data<AppState>, path: web::Path<i32>) -> AppResult<HttpResponse> {
    let affected = state.content.delete_tag(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(Affected { affected })))
}
