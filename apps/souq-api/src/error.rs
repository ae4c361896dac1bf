//! # API Error Type
//!
//! Every handler returns `Result<_, ApiError>`. The error renders as a JSON
//! body with a machine-readable `code` and a human-readable `message`:
//!
//! ```json
//! { "code": "NOT_FOUND", "message": "Product not found: 5b1c..." }
//! ```
//!
//! ## Status Mapping
//! ```text
//! ServiceError::Validation    → 400 VALIDATION_ERROR
//! ServiceError::NotFound      → 404 NOT_FOUND
//! ServiceError::Unauthorized  → 401 UNAUTHORIZED
//! ServiceError::Upload        → 502 UPLOAD_FAILED
//! ServiceError::Persistence   → 500 DATABASE_ERROR
//! ServiceError::Internal      → 500 INTERNAL
//! role check failed           → 403 FORBIDDEN
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use souq_service::ServiceError;

/// Error body returned by every failing request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input validation failed (400)
    ValidationError,

    /// Missing or invalid token (401)
    Unauthorized,

    /// Authenticated but lacking the role (403)
    Forbidden,

    /// Resource not found (404)
    NotFound,

    /// Image host failed (502)
    UploadFailed,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::UploadFailed => StatusCode::BAD_GATEWAY,
            ErrorCode::DatabaseError | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Unauthorized, message)
    }

    pub fn forbidden() -> Self {
        ApiError::new(ErrorCode::Forbidden, "Insufficient role for this operation")
    }
}

/// Converts service errors to API errors.
impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(e) => ApiError::validation(e.to_string()),
            e @ ServiceError::NotFound { .. } => ApiError::new(ErrorCode::NotFound, e.to_string()),
            ServiceError::Unauthorized(msg) => ApiError::unauthorized(msg),
            ServiceError::Upload(e) => {
                tracing::error!(error = %e, "Asset store request failed");
                ApiError::new(ErrorCode::UploadFailed, e.to_string())
            }
            ServiceError::Persistence(e) => {
                // Log the actual error but return a generic message
                tracing::error!(error = %e, "Database operation failed");
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            ServiceError::Internal(e) => {
                tracing::error!(error = %e, "Internal error");
                ApiError::new(ErrorCode::Internal, "Internal server error")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use souq_core::ValidationError;
    use souq_media::MediaError;

    #[test]
    fn test_service_error_mapping() {
        let err: ApiError = ServiceError::not_found("Product", "abc").into();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Product not found: abc");

        let err: ApiError = ServiceError::from(ValidationError::required("name")).into();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.code.status(), StatusCode::BAD_REQUEST);

        let err: ApiError = ServiceError::from(MediaError::upload("a.png", "timeout")).into();
        assert_eq!(err.code.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_serializes_screaming_code() {
        let json = serde_json::to_value(ApiError::forbidden()).unwrap();
        assert_eq!(json["code"], "FORBIDDEN");
    }
}
