//! Category handlers.

use actix_web::{HttpResponse, web};

use inkpress_core::PostQuery;
use inkpress_core::domain::CategoryInput;
use inkpress_shared::ApiResponse;
use inkpress_shared::dto::{Affected, CategoryRequest, PageParams};

use crate::middleware::error::AppResult;
use crate::state::AppState;

use super::posts::published_page;

fn category_input(id: Option<i32>, req: CategoryRequest) -> CategoryInput {
    let slug = req
        .slug
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| req.name.clone());
    CategoryInput {
        id,
        name: req.name,
        description: req.description,
        slug,
        show_on_menu: req.show_on_menu,
    }
}

/// GET /api/categories
pub async fn list(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let categories = state.content.get_categories().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(categories)))
}

/// GET /api/categories/{slug}/posts
pub async fn posts(
    state: web::Data<AppState>,
    path: web::Path<String>,
    paging: web::Query<PageParams>,
) -> AppResult<HttpResponse> {
    let query = PostQuery::new().category_slug(path.into_inner());
    published_page(&state, query, &paging).await
}

/// GET /api/categories/{id}
pub async fn get(state: web::Data<AppState>, path: web::Path<i32>) -> AppResult<HttpResponse> {
    let category = state.content.get_category_by_id(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(category)))
}

/// POST /api/categories
pub async fn create(
    state: web::Data<AppState>,
    body: web::Json<CategoryRequest>,
) -> AppResult<HttpResponse> {
    let category = state
        .content
        .add_or_update_category(category_input(None, body.into_inner()))
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(category)))
}

/// PUT /api/categories/{id}
pub async fn update(
    state: web::Data<AppState>,
    path: web::Path<i32>,
    body: web::Json<CategoryRequest>,
) -> AppResult<HttpResponse> {
    let category = state
        .content
        .add_or_update_category(category_input(Some(path.into_inner()), body.into_inner()))
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(category)))
}

/// DELETE /api/categories/{id}
pub async fn delete(state: web::Data<AppState>, path: web::Path<i32>) -> AppResult<HttpResponse> {
    let affected = state.content.delete_category(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(Affected { affected })))
}
