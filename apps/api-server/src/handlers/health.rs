//! Health check endpoint.

use actix_web::{HttpResponse, web};
use serde::Serialize;

use crate::observability::RequestId;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub storage: &'static str,
    pub timestamp: String,
    pub request_id: String,
}

/// Health check endpoint - returns server and storage status.
///
/// GET /api/health
pub async fn health_check(state: web::Data<AppState>, request_id: RequestId) -> HttpResponse {
    let storage = storage_status(&state).await;
    let response = HealthResponse {
        status: if storage == "unavailable" { "degraded" } else { "ok" },
        version: env!("CARGO_PKG_VERSION"),
        storage,
        timestamp: chrono::Utc::now().to_rfc3339(),
        request_id: request_id.0,
    };

    HttpResponse::Ok().json(response)
}

#[cfg(feature = "postgres")]
async fn storage_status(state: &AppState) -> &'static str {
    if let Some(db) = &state.db {
        if let Err(e) = db.ping().await {
            tracing::warn!(error = %e, "Database ping failed");
            return "unavailable";
        }
    }
    state.storage_kind()
}

#[cfg(not(feature = "postgres"))]
async fn storage_status(state: &AppState) -> &'static str {
    state.storage_kind()
}
