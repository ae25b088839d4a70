//! Author handlers.

use actix_web::{HttpResponse, web};

use inkpress_core::domain::AuthorInput;
use inkpress_core::{PageRequest, PostQuery};
use inkpress_shared::ApiResponse;
use inkpress_shared::dto::{
    Affected, AuthorPageParams, AuthorRequest, AvatarRequest, AvatarResponse, PageParams,
};

use crate::middleware::error::AppResult;
use crate::state::AppState;

use super::posts::published_page;

fn author_input(id: Option<i32>, req: AuthorRequest) -> AuthorInput {
    let slug = req
        .slug
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| req.full_name.clone());
    AuthorInput {
        id,
        full_name: req.full_name,
        email: req.email,
        bio: req.bio,
        slug,
        image_url: req.image_url,
    }
}

/// GET /api/authors
pub async fn list(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let authors = state.content.get_authors().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(authors)))
}

/// GET /api/authors/pagination
pub async fn paged(
    state: web::Data<AppState>,
    params: web::Query<AuthorPageParams>,
) -> AppResult<HttpResponse> {
    let page = state
        .content
        .get_paged_authors(
            params.name.as_deref(),
            PageRequest::new(params.page, params.page_size),
        )
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(page)))
}

/// GET /api/authors/best/{limit}
pub async fn best(state: web::Data<AppState>, path: web::Path<i64>) -> AppResult<HttpResponse> {
    let authors = state
        .content
        .get_authors_with_most_posts(path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(authors)))
}

/// GET /api/authors/{slug}/posts
pub async fn posts(
    state: web::Data<AppState>,
    path: web::Path<String>,
    paging: web::Query<PageParams>,
) -> AppResult<HttpResponse> {
    let query = PostQuery::new().author_slug(path.into_inner());
    published_page(&state, query, &paging).await
}

/// GET /api/authors/{id}
pub async fn get(state: web::Data<AppState>, path: web::Path<i32>) -> AppResult<HttpResponse> {
    let author = state.content.get_author_by_id(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(author)))
}

/// POST /api/authors
pub async fn create(
    state: web::Data<AppState>,
    body: web::Json<AuthorRequest>,
) -> AppResult<HttpResponse> {
    let author = state
        .content
        .add_or_update_author(author_input(None, body.into_inner()))
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(author)))
}

/// PUT /api/authors/{id}
pub async fn update(
    state: web::Data<AppState>,
    path: web::Path<i32>,
    body: web::Json<AuthorRequest>,
) -> AppResult<HttpResponse> {
    let author = state
        .content
        .add_or_update_author(author_input(Some(path.into_inner()), body.into_inner()))
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(author)))
}

/// DELETE /api/authors/{id}
pub async fn delete(state: web::Data<AppState>, path: web::Path<i32>) -> AppResult<HttpResponse> {
    let affected = state.content.delete_author(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(Affected { affected })))
}

/// POST /api/authors/{id}/avatar
pub async fn set_avatar(
    state: web::Data<AppState>,
    path: web::Path<i32>,
    body: web::Json<AvatarRequest>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let change = state
        .content
        .set_author_image_url(id, body.into_inner().image_url)
        .await?;
    if let Some(previous) = &change.previous {
        tracing::info!(author_id = id, previous = %previous, "Author image replaced");
    }
    Ok(HttpResponse::Ok().json(ApiResponse::ok(AvatarResponse {
        image_url: change.author.image_url,
        previous_image_url: change.previous,
    })))
}
