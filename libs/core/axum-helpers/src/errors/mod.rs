pub mod codes;
pub mod handlers;
pub mod responses;

pub use codes::ErrorCode;

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use validator::ValidationErrors;

/// The single JSON error shape returned by every endpoint.
///
/// ```json
/// { "error": "Already Exists Error" }
/// ```
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Application error type that can be converted to HTTP responses.
///
/// Domain crates convert their own error enums into this type at the
/// handler boundary. Every variant is logged with its [`ErrorCode`] when it
/// is turned into a response.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("JSON extraction error: {0}")]
    JsonExtractorRejection(#[from] JsonRejection),

    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationErrors),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal Server Error: {0}")]
    InternalServerError(String),

    #[error("Service Unavailable: {0}")]
    ServiceUnavailable(String),

    /// An upstream rejection forwarded with its own status and message
    #[error("Upstream error ({status}): {message}")]
    Upstream { status: StatusCode, message: String },
}

impl AppError {
    /// Forward an upstream status code; invalid codes become 500
    pub fn upstream(status: u16, message: impl Into<String>) -> Self {
        AppError::Upstream {
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, code) = match self {
            AppError::JsonExtractorRejection(e) => {
                tracing::warn!(
                    error_code = ErrorCode::JsonExtraction.code(),
                    "JSON extraction error: {:?}",
                    e
                );
                (e.status(), e.body_text(), ErrorCode::JsonExtraction)
            }
            AppError::ValidationError(e) => {
                tracing::info!(
                    error_code = ErrorCode::ValidationError.code(),
                    "Validation error: {:?}",
                    e
                );
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    format_validation_errors(&e),
                    ErrorCode::ValidationError,
                )
            }
            AppError::BadRequest(msg) => {
                tracing::info!(error_code = ErrorCode::BadRequest.code(), "Bad request: {}", msg);
                (StatusCode::BAD_REQUEST, msg, ErrorCode::BadRequest)
            }
            AppError::NotFound(msg) => {
                tracing::info!(error_code = ErrorCode::NotFound.code(), "Not found: {}", msg);
                (StatusCode::NOT_FOUND, msg, ErrorCode::NotFound)
            }
            AppError::Conflict(msg) => {
                tracing::info!(error_code = ErrorCode::Conflict.code(), "Conflict: {}", msg);
                (StatusCode::CONFLICT, msg, ErrorCode::Conflict)
            }
            AppError::InternalServerError(msg) => {
                tracing::error!(
                    error_code = ErrorCode::InternalError.code(),
                    "Internal server error: {}",
                    msg
                );
                (StatusCode::INTERNAL_SERVER_ERROR, msg, ErrorCode::InternalError)
            }
            AppError::ServiceUnavailable(msg) => {
                tracing::warn!(
                    error_code = ErrorCode::ServiceUnavailable.code(),
                    "Service unavailable: {}",
                    msg
                );
                (StatusCode::SERVICE_UNAVAILABLE, msg, ErrorCode::ServiceUnavailable)
            }
            AppError::Upstream { status, message } => {
                tracing::info!(
                    error_code = ErrorCode::UpstreamError.code(),
                    status = status.as_u16(),
                    "Upstream error: {}",
                    message
                );
                (status, message, ErrorCode::UpstreamError)
            }
        };

        error_response(status, message, code)
    }
}

/// Render field errors as `field: message` lines, sorted by field name.
///
/// Errors without a custom message fall back to the validator code, e.g.
/// `email: email`.
pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut lines: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |err| {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string());
                format!("{field}: {message}")
            })
        })
        .collect();
    lines.sort();
    lines.join("\n")
}

/// Build an error response with the standard body
pub fn error_response(status: StatusCode, message: String, code: ErrorCode) -> Response {
    tracing::trace!(error_code = code.code(), status = status.as_u16(), "Error response");
    (status, Json(ErrorResponse::new(message))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use validator::Validate;

    #[derive(Debug, Deserialize, Validate)]
    struct SignupForm {
        #[validate(email)]
        email: String,
        #[validate(length(min = 8, message = "must be at least 8 characters"))]
        password: String,
    }

    async fn body_of(response: Response) -> ErrorResponse {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_format_validation_errors_sorted_by_field() {
        let form = SignupForm {
            email: "not-an-email".to_string(),
            password: "short".to_string(),
        };
        let errors = form.validate().unwrap_err();

        assert_eq!(
            format_validation_errors(&errors),
            "email: email\npassword: must be at least 8 characters"
        );
    }

    #[tokio::test]
    async fn test_validation_error_is_422() {
        let form = SignupForm {
            email: "a@b.co".to_string(),
            password: "short".to_string(),
        };
        let response = AppError::from(form.validate().unwrap_err()).into_response();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body_of(response).await.error,
            "password: must be at least 8 characters"
        );
    }

    #[tokio::test]
    async fn test_conflict_body_is_message_only() {
        let response = AppError::Conflict("Already Exists Error".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(body_of(response).await.error, "Already Exists Error");
    }

    #[tokio::test]
    async fn test_upstream_keeps_status() {
        let response = AppError::upstream(400, "Invalid login credentials").into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_of(response).await.error, "Invalid login credentials");
    }

    #[test]
    fn test_upstream_invalid_status_becomes_500() {
        let AppError::Upstream { status, .. } = AppError::upstream(42, "weird") else {
            panic!("expected upstream variant");
        };
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
