//! Domain error types for the KYB onboarding server.
//!
//! Uses thiserror for ergonomic error handling with automatic Display implementations.

use actix_web::{HttpResponse, ResponseError};
use std::fmt;

/// Application-level errors.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Inbound payload failed validation; carries every missing/empty field.
    #[error("Missing required fields: {}", .0.join(", "))]
    Validation(Vec<String>),

    /// Record store (Postgres) operation failed
    #[error("Database error: {0}")]
    Database(String),

    /// Outbound third-party call failed where the call is the subject of the request
    #[error("{service} request failed: {message}")]
    ExternalService {
        service: &'static str,
        message: String,
    },

    /// Upload token unknown or expired
    #[error("Upload token is invalid or expired")]
    InvalidToken,

    /// Uploaded file exceeds the configured size cap
    #[error("File size must be less than {max_bytes} bytes")]
    PayloadTooLarge { max_bytes: usize },

    /// Uploaded file is not an accepted document type
    #[error("Only PDF files are accepted")]
    UnsupportedFileType,

    /// Resource not found
    #[error("{0} not found")]
    NotFound(String),

    /// Storage (S3) operation failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// OCR extraction failed or timed out
    #[error("Extraction error: {0}")]
    Extraction(String),
}

/// Postgres SQLSTATE for insufficient_privilege.
///
/// An insert rejected with this code means the process is running with a
/// restricted credential instead of the backend-privileged one. That is a
/// deployment problem, not a transient failure, and the log line must say so.
const SQLSTATE_INSUFFICIENT_PRIVILEGE: &str = "42501";

impl AppError {
    /// True when the error indicates a credential/deployment misconfiguration
    /// rather than a transient failure.
    pub fn is_misconfiguration(&self) -> bool {
        match self {
            AppError::Database(msg) => msg.contains(SQLSTATE_INSUFFICIENT_PRIVILEGE),
            _ => false,
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let (status, error_code, response_message) = match self {
            AppError::Validation(fields) => {
                return HttpResponse::UnprocessableEntity().json(ValidationErrorResponse {
                    error: "VALIDATION_ERROR".to_string(),
                    message: self.to_string(),
                    missing_fields: fields.clone(),
                });
            }
            AppError::Database(err_str) => {
                if self.is_misconfiguration() {
                    tracing::error!(
                        "Database permission denied (SQLSTATE 42501): the configured \
                         DATABASE_URL does not carry the backend-privileged role. \
                         This needs a deployment fix, not a request retry: {}",
                        err_str
                    );
                } else {
                    tracing::error!("Database error: {}", err_str);
                }
                (
                    actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "PERSISTENCE_ERROR",
                    "An internal database error occurred".to_string(),
                )
            }
            AppError::ExternalService { service, .. } => {
                tracing::error!("External service failure: {}", self);
                (
                    actix_web::http::StatusCode::BAD_GATEWAY,
                    "EXTERNAL_SERVICE_ERROR",
                    format!("Upstream service '{}' failed", service),
                )
            }
            AppError::InvalidToken => (
                actix_web::http::StatusCode::NOT_FOUND,
                "INVALID_TOKEN",
                self.to_string(),
            ),
            AppError::PayloadTooLarge { .. } => (
                actix_web::http::StatusCode::PAYLOAD_TOO_LARGE,
                "PAYLOAD_TOO_LARGE",
                self.to_string(),
            ),
            AppError::UnsupportedFileType => (
                actix_web::http::StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "UNSUPPORTED_FILE_TYPE",
                self.to_string(),
            ),
            AppError::NotFound(_) => (
                actix_web::http::StatusCode::NOT_FOUND,
                "NOT_FOUND",
                self.to_string(),
            ),
            AppError::Storage(_) => (
                actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                "STORAGE_ERROR",
                self.to_string(),
            ),
            AppError::Extraction(_) => (
                actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                "EXTRACTION_ERROR",
                self.to_string(),
            ),
        };

        HttpResponse::build(status).json(ErrorResponse {
            error: error_code.to_string(),
            message: response_message,
        })
    }
}

/// Error response body matching OpenAPI schema.
#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Validation failure body; enumerates the offending fields so the
/// workflow orchestrator can surface them.
#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
pub struct ValidationErrorResponse {
    pub error: String,
    pub message: String,
    pub missing_fields: Vec<String>,
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

// Conversion implementations for common error types

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Validation(vec![format!("JSON parsing error: {}", err)])
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::NotFound(format!("Invalid id: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn test_validation_maps_to_422() {
        let err = AppError::Validation(vec!["customer_name".into(), "company_name".into()]);
        assert_eq!(
            err.error_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_invalid_token_maps_to_404() {
        assert_eq!(
            AppError::InvalidToken.error_response().status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_upload_rejections_map_to_client_errors() {
        assert_eq!(
            AppError::PayloadTooLarge { max_bytes: 1024 }
                .error_response()
                .status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            AppError::UnsupportedFileType.error_response().status(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
    }

    #[test]
    fn test_permission_denied_is_misconfiguration() {
        let err = AppError::Database(
            "error returned from database: permission denied for table companies (SQLSTATE 42501)"
                .to_string(),
        );
        assert!(err.is_misconfiguration());

        let transient = AppError::Database("connection reset by peer".to_string());
        assert!(!transient.is_misconfiguration());
    }
}
