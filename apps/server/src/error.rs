//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Stockroom                              │
//! │                                                                         │
//! │  Handler: Result<T, ApiError>                                           │
//! │         │                                                               │
//! │         ├── ValidationError ─────────────────────────► 400              │
//! │         ├── CoreError::UnknownUser / WrongPassword ──► 401              │
//! │         ├── DbError::NotFound, ProductNotFound ──────► 404              │
//! │         ├── Duplicate, InsufficientStock, InUse ─────► 409              │
//! │         └── anything else ── logged ── generic msg ──► 500              │
//! │                                                                         │
//! │  Body: { "code": "NOT_FOUND", "message": "Product not found: P404" }   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Internal details (SQL errors, I/O errors) go to the log only; the client
//! gets a short message.

use axum::extract::multipart::MultipartError;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use stockroom_core::{CoreError, ValidationError};
use stockroom_db::DbError;
use tracing::{error, warn};

/// Error returned from HTTP handlers.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: ErrorCode,
    pub message: String,
}

/// Machine-readable error codes.
///
/// ```typescript
/// const res = await fetch('/transactions/out', { method: 'POST', body });
/// if (!res.ok) {
///   const { code, message } = await res.json();
///   if (code === 'INSUFFICIENT_STOCK') showStockWarning(message);
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input validation failed (400)
    ValidationError,

    /// Reference to a category/supplier that doesn't exist (400)
    InvalidReference,

    /// Bad credentials (401)
    Unauthorized,

    /// Resource not found (404)
    NotFound,

    /// Duplicate or still-referenced resource (409)
    Conflict,

    /// Outbound quantity exceeds stock (409)
    InsufficientStock,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: ErrorCode,
    message: &'a str,
}

impl ApiError {
    pub fn new(status: StatusCode, code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::new(StatusCode::BAD_REQUEST, ErrorCode::ValidationError, message)
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            StatusCode::NOT_FOUND,
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::new(StatusCode::CONFLICT, ErrorCode::Conflict, message)
    }

    /// Logs `detail` and returns a generic 500.
    pub fn internal(detail: impl std::fmt::Display) -> Self {
        error!(error = %detail, "Internal error");
        ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::Internal,
            "Terjadi kesalahan server",
        )
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_client_error() {
            warn!(status = self.status.as_u16(), code = ?self.code, message = %self.message, "Request rejected");
        }
        let body = ErrorBody {
            code: self.code,
            message: &self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::bad_request(err.to_string())
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(id) => ApiError::not_found("Product", &id),
            err @ CoreError::InsufficientStock { .. } => ApiError::new(
                StatusCode::CONFLICT,
                ErrorCode::InsufficientStock,
                err.to_string(),
            ),
            err @ CoreError::ProductInUse(_) => ApiError::conflict(err.to_string()),
            err @ (CoreError::UnknownUser | CoreError::WrongPassword) => {
                ApiError::new(StatusCode::UNAUTHORIZED, ErrorCode::Unauthorized, err.to_string())
            }
            err @ CoreError::IdSpaceExhausted { .. } => ApiError::internal(err),
            CoreError::Validation(e) => e.into(),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Core(e) => e.into(),
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => {
                ApiError::conflict(format!("{} '{}' sudah terdaftar", field, value))
            }
            DbError::ForeignKeyViolation { message } => {
                warn!(%message, "Foreign key violation");
                ApiError::new(
                    StatusCode::BAD_REQUEST,
                    ErrorCode::InvalidReference,
                    "Kategori atau supplier tidak dikenal",
                )
            }
            DbError::CheckViolation(message) => {
                warn!(%message, "Check constraint violation");
                ApiError::bad_request("Nilai tidak valid")
            }
            DbError::PoolExhausted => {
                error!("Database pool exhausted");
                ApiError::new(
                    StatusCode::SERVICE_UNAVAILABLE,
                    ErrorCode::DatabaseError,
                    "Server sedang sibuk, coba lagi",
                )
            }
            other => {
                error!(error = %other, "Database operation failed");
                ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::DatabaseError,
                    "Terjadi kesalahan server",
                )
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::new(err.status(), ErrorCode::ValidationError, err.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases: Vec<(ApiError, StatusCode, ErrorCode)> = vec![
            (
                ValidationError::required("name").into(),
                StatusCode::BAD_REQUEST,
                ErrorCode::ValidationError,
            ),
            (
                CoreError::WrongPassword.into(),
                StatusCode::UNAUTHORIZED,
                ErrorCode::Unauthorized,
            ),
            (
                CoreError::ProductNotFound("P404".into()).into(),
                StatusCode::NOT_FOUND,
                ErrorCode::NotFound,
            ),
            (
                DbError::duplicate("username", "budi").into(),
                StatusCode::CONFLICT,
                ErrorCode::Conflict,
            ),
            (
                DbError::Core(CoreError::InsufficientStock {
                    product_id: "P001".into(),
                    available: 1,
                    requested: 2,
                })
                .into(),
                StatusCode::CONFLICT,
                ErrorCode::InsufficientStock,
            ),
            (
                DbError::ForeignKeyViolation {
                    message: "FOREIGN KEY constraint failed".into(),
                }
                .into(),
                StatusCode::BAD_REQUEST,
                ErrorCode::InvalidReference,
            ),
            (
                DbError::QueryFailed("disk I/O error".into()).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::DatabaseError,
            ),
        ];

        for (err, status, code) in cases {
            assert_eq!(err.status, status, "{}", err);
            assert_eq!(err.code, code, "{}", err);
        }
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let err: ApiError = DbError::Internal("no such table: products".into()).into();
        assert!(!err.message.contains("products"));
    }

    #[test]
    fn test_error_code_serialization() {
        let json = serde_json::to_string(&ErrorCode::InsufficientStock).unwrap();
        assert_eq!(json, "\"INSUFFICIENT_STOCK\"");
    }
}
