//! Standardized API response types (RFC 7807 compliant for errors).

use serde::{Deserialize, Serialize};

/// Envelope for successful responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Problem type URIs for the failures clients are expected to branch on.
pub mod problem {
    pub const NOT_FOUND: &str = "/problems/not-found";
    pub const SLUG_CONFLICT: &str = "/problems/slug-conflict";
    pub const ENTITY_IN_USE: &str = "/problems/entity-in-use";
    pub const VALIDATION: &str = "/problems/validation";
}

/// RFC 7807 problem details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Problem type URI; `about:blank` when the status says it all.
    #[serde(rename = "type")]
    pub error_type: String,
    pub title: String,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorResponse {
    pub fn new(status: u16, title: impl Into<String>) -> Self {
        Self {
            error_type: "about:blank".to_string(),
            title: title.into(),
            status,
            detail: None,
        }
    }

    pub fn with_type(mut self, uri: impl Into<String>) -> Self {
        self.error_type = uri.into();
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(400, "Bad Request").with_detail(detail)
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(404, "Not Found")
            .with_type(problem::NOT_FOUND)
            .with_detail(detail)
    }

    /// Another entity of the same type already owns the slug.
    pub fn slug_conflict(detail: impl Into<String>) -> Self {
        Self::new(409, "Slug Conflict")
            .with_type(problem::SLUG_CONFLICT)
            .with_detail(detail)
    }

    /// Delete refused while posts still reference the entity.
    pub fn in_use(detail: impl Into<String>) -> Self {
        Self::new(409, "Entity In Use")
            .with_type(problem::ENTITY_IN_USE)
            .with_detail(detail)
    }

    pub fn unprocessable(detail: impl Into<String>) -> Self {
        Self::new(422, "Validation Failed")
            .with_type(problem::VALIDATION)
            .with_detail(detail)
    }

    pub fn internal_error() -> Self {
        Self::new(500, "Internal Server Error")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_problem_details_shape() {
        let body = serde_json::to_value(ErrorResponse::slug_conflict("slug taken")).unwrap();
        assert_eq!(body["type"], problem::SLUG_CONFLICT);
        assert_eq!(body["status"], 409);
        assert_eq!(body["detail"], "slug taken");
    }

    #[test]
    fn test_internal_error_hides_detail() {
        let body = serde_json::to_value(ErrorResponse::internal_error()).unwrap();
        assert_eq!(body["type"], "about:blank");
        assert!(body.get("detail").is_none());
    }

    #[test]
    fn test_ok_wraps_data() {
        let body = serde_json::to_value(ApiResponse::ok(3)).unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["data"], 3);
    }
}
