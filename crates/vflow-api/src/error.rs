//! API error type and HTTP mapping.

use std::sync::OnceLock;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use vflow_models::UploadValidationError;

pub type ApiResult<T> = Result<T, ApiError>;

static PRODUCTION: OnceLock<bool> = OnceLock::new();

/// Set once at startup from `ApiConfig::production`. In production mode
/// internal error detail is redacted from response bodies.
pub fn set_production(production: bool) {
    PRODUCTION.set(production).ok();
}

fn production_mode() -> bool {
    PRODUCTION.get().copied().unwrap_or(false)
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Body detail for the response. Internal messages can carry
    /// infrastructure specifics, so production redacts them; client errors
    /// are always shown verbatim.
    pub fn response_detail(&self, production: bool) -> String {
        match self {
            ApiError::Internal(_) if production => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<UploadValidationError> for ApiError {
    fn from(e: UploadValidationError) -> Self {
        if e.is_too_large() {
            ApiError::PayloadTooLarge(e.to_string())
        } else {
            ApiError::BadRequest(e.to_string())
        }
    }
}

impl From<vflow_db::DbError> for ApiError {
    fn from(e: vflow_db::DbError) -> Self {
        if e.is_not_found() {
            ApiError::NotFound("Video not found".to_string())
        } else {
            ApiError::Internal(e.to_string())
        }
    }
}

impl From<vflow_storage::StorageError> for ApiError {
    fn from(e: vflow_storage::StorageError) -> Self {
        if e.is_not_found() {
            ApiError::NotFound("Object not found".to_string())
        } else {
            ApiError::Internal(e.to_string())
        }
    }
}

impl From<vflow_queue::QueueError> for ApiError {
    fn from(e: vflow_queue::QueueError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("Internal error: {}", self);
        }

        let detail = self.response_detail(production_mode());
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_map_to_client_statuses() {
        let too_large = UploadValidationError::TooLarge { size: 600, limit: 500 };
        assert_eq!(
            ApiError::from(too_large).status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );

        let bad_ext = UploadValidationError::UnsupportedExtension("pdf".into());
        assert_eq!(ApiError::from(bad_ext).status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn missing_record_maps_to_404() {
        let e = ApiError::from(vflow_db::DbError::not_found("vid-1"));
        assert_eq!(e.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn internal_detail_redacted_only_in_production() {
        let e = ApiError::internal("connection refused at 10.0.0.5:5432");
        assert_eq!(e.response_detail(true), "Internal server error");
        assert!(e.response_detail(false).contains("10.0.0.5"));
    }

    #[test]
    fn client_detail_always_shown() {
        let e = ApiError::bad_request("File type not allowed: .pdf");
        assert_eq!(e.response_detail(true), "File type not allowed: .pdf");
        assert_eq!(e.response_detail(false), "File type not allowed: .pdf");
    }
}
