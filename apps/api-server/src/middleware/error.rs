//! Error handling middleware - RFC 7807 compliant responses.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use thiserror::Error;

use inkpress_core::error::DomainError;
use inkpress_shared::ErrorResponse;

/// Application-level error type that converts to RFC 7807 responses.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Slug conflict: {0}")]
    SlugConflict(String),
    #[error("In use: {0}")]
    InUse(String),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::SlugConflict(_) | AppError::InUse(_) => StatusCode::CONFLICT,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error = match self {
            AppError::NotFound(detail) => ErrorResponse::not_found(detail),
            AppError::BadRequest(detail) => ErrorResponse::bad_request(detail),
            AppError::SlugConflict(detail) => ErrorResponse::slug_conflict(detail),
            AppError::InUse(detail) => ErrorResponse::in_use(detail),
            AppError::Validation(detail) => ErrorResponse::unprocessable(detail),
            AppError::Internal(detail) => {
                tracing::error!(error = %detail, "Request failed with an internal error");
                ErrorResponse::internal_error()
            }
        };

        HttpResponse::build(self.status_code()).json(error)
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { .. } | DomainError::SlugNotFound { .. } => {
                AppError::NotFound(err.to_string())
            }
            DomainError::SlugConflict { .. } => AppError::SlugConflict(err.to_string()),
            DomainError::InUse { .. } => AppError::InUse(err.to_string()),
            DomainError::Validation(msg) => AppError::Validation(msg),
            DomainError::Storage(source) => AppError::Internal(source.to_string()),
        }
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use inkpress_core::domain::EntityKind;
    use inkpress_core::error::RepoError;

    use super::*;

    #[test]
    fn test_domain_errors_map_to_statuses() {
        let cases = [
            (DomainError::not_found(EntityKind::Post, 1), StatusCode::NOT_FOUND),
            (
                DomainError::slug_not_found(EntityKind::Tag, "rust"),
                StatusCode::NOT_FOUND,
            ),
            (
                DomainError::SlugConflict {
                    entity: EntityKind::Author,
                    slug: "john-doe".to_string(),
                },
                StatusCode::CONFLICT,
            ),
            (
                DomainError::InUse {
                    entity: EntityKind::Category,
                    id: 3,
                },
                StatusCode::CONFLICT,
            ),
            (
                DomainError::Validation("bad slug".to_string()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                DomainError::Storage(RepoError::Connection("refused".to_string())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(AppError::from(err).status_code(), status);
        }
    }
}
