//! Slug availability check used by edit forms.

use actix_web::{HttpResponse, web};

use inkpress_core::domain::EntityKind;
use inkpress_shared::ApiResponse;
use inkpress_shared::dto::{SlugExistsParams, SlugExistsResponse};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /api/slugs/{entity}/exists?slug=&id=
pub async fn exists(
    state: web::Data<AppState>,
    path: web::Path<String>,
    params: web::Query<SlugExistsParams>,
) -> AppResult<HttpResponse> {
    let entity = path.into_inner();
    let kind = EntityKind::parse(&entity)
        .ok_or_else(|| AppError::BadRequest(format!("unknown entity type '{entity}'")))?;

    let exists = state
        .content
        .is_slug_existed(kind, params.id, &params.slug)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(SlugExistsResponse { exists })))
}
