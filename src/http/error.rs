//! HTTP mapping for application errors.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::AppError;

/// Handler-level result alias: any `AppError` becomes a JSON error response.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Newtype carrying an `AppError` across the axum response boundary.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl ApiError {
    /// HTTP status for the wrapped error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self.0 {
            AppError::NotFound(_) | AppError::ArtifactMissing(_) => StatusCode::NOT_FOUND,
            AppError::External(_) => StatusCode::BAD_GATEWAY,
            AppError::Config(_)
            | AppError::Store(_)
            | AppError::Template(_)
            | AppError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self.0 {
            AppError::Config(_) => "config_error",
            AppError::Store(_) => "store_unavailable",
            AppError::Template(_) => "template_render_error",
            AppError::External(_) => "external_call_failure",
            AppError::NotFound(_) => "not_found",
            AppError::ArtifactMissing(_) => "artifact_missing",
            AppError::Io(_) => "io_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "success": false,
            "error": self.0.to_string(),
            "code": self.code(),
        });
        (self.status_code(), Json(body)).into_response()
    }
}
