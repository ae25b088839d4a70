//! Extractor configuration: payload, query and path failures are reported as
//! problem details instead of actix's plain-text bodies.

use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use actix_web::{HttpRequest, web};

use super::error::AppError;

/// Upper bound for JSON request bodies. Post bodies carry full article text.
pub const JSON_BODY_LIMIT: usize = 1024 * 1024;

pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_BODY_LIMIT)
        .error_handler(|err, req| json_error(err, req).into())
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, req| query_error(err, req).into())
}

pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, req| path_error(err, req).into())
}

fn json_error(err: JsonPayloadError, req: &HttpRequest) -> AppError {
    tracing::debug!(path = %req.path(), error = %err, "Rejected JSON body");
    match err {
        // Well-formed JSON that does not fit the request shape.
        JsonPayloadError::Deserialize(inner) if inner.is_data() => {
            AppError::Validation(inner.to_string())
        }
        other => AppError::BadRequest(other.to_string()),
    }
}

fn query_error(err: QueryPayloadError, req: &HttpRequest) -> AppError {
    tracing::debug!(path = %req.path(), error = %err, "Rejected query string");
    AppError::BadRequest(err.to_string())
}

fn path_error(err: PathError, req: &HttpRequest) -> AppError {
    tracing::debug!(path = %req.path(), error = %err, "Rejected path parameters");
    AppError::BadRequest(err.to_string())
}

#[cfg(test)]
mod tests {
    use actix_web::ResponseError;
    use actix_web::http::StatusCode;
    use actix_web::test::TestRequest;

    use super::*;

    #[test]
    fn test_missing_field_is_unprocessable() {
        let req = TestRequest::default().to_http_request();
        let inner = serde_json::from_str::<inkpress_shared::dto::TagRequest>("{}").unwrap_err();
        let err = json_error(JsonPayloadError::Deserialize(inner), &req);
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_malformed_json_is_bad_request() {
        let req = TestRequest::default().to_http_request();
        let inner = serde_json::from_str::<inkpress_shared::dto::TagRequest>("{").unwrap_err();
        let err = json_error(JsonPayloadError::Deserialize(inner), &req);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
