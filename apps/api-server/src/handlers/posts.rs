//! Post handlers.

use actix_web::{HttpResponse, web};
use serde::Deserialize;

use inkpress_core::domain::PostInput;
use inkpress_core::tags::split_tag_list;
use inkpress_core::{PageRequest, PostQuery};
use inkpress_shared::ApiResponse;
use inkpress_shared::dto::{Affected, PageParams, PostListParams, PostRequest, PublishRequest};

use crate::middleware::error::AppResult;
use crate::state::AppState;

/// `?details=true` attaches author, category and tags.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DetailParams {
    pub details: bool,
}

fn post_query(params: &PostListParams) -> PostQuery {
    PostQuery {
        keyword: params.keyword.clone(),
        category_id: params.category_id,
        category_slug: params.category_slug.clone(),
        author_id: params.author_id,
        author_slug: params.author_slug.clone(),
        tag_id: params.tag_id,
        tag_slug: params.tag_slug.clone(),
        year: params.year,
        month: params.month,
        published_only: params.published_only,
    }
}

fn post_input(id: Option<i32>, req: PostRequest) -> (PostInput, Vec<String>) {
    let tags = split_tag_list(&req.tags);
    let slug = req
        .slug
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| req.title.clone());
    let input = PostInput {
        id,
        title: req.title,
        short_description: req.short_description,
        description: req.description,
        meta: req.meta,
        slug,
        image_url: req.image_url,
        published: req.published,
        author_id: req.author_id,
        category_id: req.category_id,
    };
    (input, tags)
}

/// Published posts narrowed by `query`, for the per-entity listings.
pub(super) async fn published_page(
    state: &AppState,
    query: PostQuery,
    paging: &PageParams,
) -> AppResult<HttpResponse> {
    let page = state
        .content
        .get_paged_posts(
            &query.published_only(),
            PageRequest::new(paging.page, paging.page_size),
        )
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(page)))
}

/// GET /api/posts
pub async fn list(
    state: web::Data<AppState>,
    params: web::Query<PostListParams>,
) -> AppResult<HttpResponse> {
    let page = state
        .content
        .get_paged_posts(
            &post_query(&params),
            PageRequest::new(params.page, params.page_size),
        )
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(page)))
}

/// POST /api/posts
pub async fn create(
    state: web::Data<AppState>,
    body: web::Json<PostRequest>,
) -> AppResult<HttpResponse> {
    let (input, tags) = post_input(None, body.into_inner());
    let post = state.content.create_or_update_post(input, &tags).await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(post)))
}

/// GET /api/posts/{id}
pub async fn get(
    state: web::Data<AppState>,
    path: web::Path<i32>,
    params: web::Query<DetailParams>,
) -> AppResult<HttpResponse> {
    let post = state
        .content
        .get_post_by_id(path.into_inner(), params.details)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(post)))
}

/// GET /api/posts/byslug/{slug}
pub async fn get_by_slug(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let post = state.content.get_post_by_slug(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(post)))
}

/// PUT /api/posts/{id}
pub async fn update(
    state: web::Data<AppState>,
    path: web::Path<i32>,
    body: web::Json<PostRequest>,
) -> AppResult<HttpResponse> {
    let (input, tags) = post_input(Some(path.into_inner()), body.into_inner());
    let post = state.content.create_or_update_post(input, &tags).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(post)))
}

/// DELETE /api/posts/{id}
pub async fn delete(state: web::Data<AppState>, path: web::Path<i32>) -> AppResult<HttpResponse> {
    let affected = state.content.delete_post(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(Affected { affected })))
}

/// POST /api/posts/{id}/published
pub async fn set_published(
    state: web::Data<AppState>,
    path: web::Path<i32>,
    body: web::Json<PublishRequest>,
) -> AppResult<HttpResponse> {
    let post = state
        .content
        .set_post_published(path.into_inner(), body.published)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(post)))
}

/// POST /api/posts/{id}/toggle-published
pub async fn toggle_published(
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let post = state.content.toggle_post_published(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(post)))
}

/// POST /api/posts/{id}/views
pub async fn increase_views(
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let affected = state.content.increase_view_count(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(Affected { affected })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_input_falls_back_to_title_slug() {
        let req = PostRequest {
            title: "Hello World".to_string(),
            short_description: "s".to_string(),
            description: "d".to_string(),
            meta: String::new(),
            slug: Some("  ".to_string()),
            image_url: None,
            published: true,
            author_id: 1,
            category_id: 2,
            tags: "rust; async,\nweb".to_string(),
        };
        let (input, tags) = post_input(Some(4), req);
        assert_eq!(input.id, Some(4));
        assert_eq!(input.slug, "Hello World");
        assert_eq!(tags, ["rust", "async", "web"]);
    }
}
