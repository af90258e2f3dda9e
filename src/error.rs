//! Error types for Biblio server

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::validation::isbn::IsbnError;

/// Machine-readable error codes carried in every error response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Failure = 1,
    InvalidRequest = 2,
    ValidationFailed = 3,
    DuplicateEntry = 4,
    DuplicateBorrow = 5,
    NotFound = 6,
    IntegrityCompromised = 7,
    DbFailure = 8,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    #[error("Duplicate borrow: {0}")]
    DuplicateBorrow(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// A write failed inside a transaction; the transaction was rolled back.
    #[error("Database integrity compromised: {0}")]
    IntegrityCompromised(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::InvalidRequest(_) => ErrorCode::InvalidRequest,
            AppError::Validation(_) => ErrorCode::ValidationFailed,
            AppError::DuplicateEntry(_) => ErrorCode::DuplicateEntry,
            AppError::DuplicateBorrow(_) => ErrorCode::DuplicateBorrow,
            AppError::NotFound(_) => ErrorCode::NotFound,
            AppError::IntegrityCompromised(_) => ErrorCode::IntegrityCompromised,
            AppError::Database(_) => ErrorCode::DbFailure,
            AppError::Internal(_) => ErrorCode::Failure,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::DuplicateEntry(_) | AppError::DuplicateBorrow(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::IntegrityCompromised(_)
            | AppError::Database(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Storage failures surfaced from a write are reported as integrity
    /// failures; domain errors pass through unchanged.
    pub fn into_integrity(self) -> Self {
        match self {
            AppError::Database(e) => {
                tracing::error!("Transaction rolled back: {:?}", e);
                AppError::IntegrityCompromised("Rollback issued".to_string())
            }
            other => other,
        }
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let message = match self {
            AppError::InvalidRequest(msg)
            | AppError::Validation(msg)
            | AppError::DuplicateEntry(msg)
            | AppError::DuplicateBorrow(msg)
            | AppError::NotFound(msg) => msg,
            AppError::IntegrityCompromised(msg) => {
                tracing::error!("Integrity compromised: {}", msg);
                "Database integrity compromised. Rollback issued.".to_string()
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "Database error".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(msg) => format!("{}: {}", field, msg),
                    None => format!("{}: invalid value ({})", field, e.code),
                })
            })
            .collect();
        messages.sort();
        AppError::Validation(messages.join("; "))
    }
}

impl From<IsbnError> for AppError {
    fn from(e: IsbnError) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::InvalidRequest("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::Validation("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::DuplicateEntry("x".into()).status(), StatusCode::CONFLICT);
        assert_eq!(AppError::DuplicateBorrow("x".into()).status(), StatusCode::CONFLICT);
        assert_eq!(AppError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::IntegrityCompromised("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_database_error_becomes_integrity_failure() {
        let err = AppError::Database(sqlx::Error::RowNotFound).into_integrity();
        assert!(matches!(err, AppError::IntegrityCompromised(_)));

        let err = AppError::NotFound("Patron not found".into()).into_integrity();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_isbn_error_is_validation() {
        let err: AppError = IsbnError::InvalidIsbn10.into();
        assert!(matches!(err, AppError::Validation(ref m) if m == "Invalid ISBN-10"));
    }

    #[tokio::test]
    async fn test_response_hides_storage_details() {
        let response = AppError::Database(sqlx::Error::PoolTimedOut).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["message"], "Database error");
        assert_eq!(body["error"], "DbFailure");
        assert_eq!(body["code"], 8);
    }
}
