//! Error codes attached to every logged HTTP error.
//!
//! Clients only ever see `{ "error": message }`; the code exists for logs
//! and dashboards so that one failure class can be filtered regardless of
//! the message text.
//!
//! ```rust
//! use axum_helpers::errors::ErrorCode;
//!
//! let code = ErrorCode::ValidationError;
//! assert_eq!(code.as_str(), "VALIDATION_ERROR");
//! assert_eq!(code.code(), 1001);
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Client errors (1000s)
    /// Request body failed field validation
    ValidationError,

    /// Request body could not be read as JSON
    JsonExtraction,

    /// Requested resource was not found
    NotFound,

    /// Request conflicts with an existing resource
    Conflict,

    /// Request is well-formed but cannot be applied
    BadRequest,

    // Server errors (1000s, interleaved with client errors)
    /// An unexpected internal server error occurred
    InternalError,

    /// A backing service is unreachable
    ServiceUnavailable,

    // Upstream errors (6000s)
    /// An upstream service rejected the request with its own status
    UpstreamError,
}

impl ErrorCode {
    /// SCREAMING_SNAKE_CASE identifier used as a log field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::JsonExtraction => "JSON_EXTRACTION",
            Self::NotFound => "NOT_FOUND",
            Self::Conflict => "CONFLICT",
            Self::BadRequest => "BAD_REQUEST",
            Self::InternalError => "INTERNAL_ERROR",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            Self::UpstreamError => "UPSTREAM_ERROR",
        }
    }

    /// Integer code for logging and monitoring.
    ///
    /// - 1000-1999: request and server errors
    /// - 6000-6999: upstream service errors
    pub fn code(&self) -> i32 {
        match self {
            Self::ValidationError => 1001,
            Self::JsonExtraction => 1003,
            Self::NotFound => 1004,
            Self::InternalError => 1005,
            Self::Conflict => 1008,
            Self::ServiceUnavailable => 1011,
            Self::BadRequest => 1012,
            Self::UpstreamError => 6001,
        }
    }

    /// Message used when the error carries none of its own.
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::ValidationError => "Request validation failed",
            Self::JsonExtraction => "Failed to parse request body",
            Self::NotFound => "Not Found",
            Self::Conflict => "Resource already exists",
            Self::BadRequest => "Bad Request",
            Self::InternalError => "Internal Server Error",
            Self::ServiceUnavailable => "Service is temporarily unavailable",
            Self::UpstreamError => "Upstream service error",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_string_representation() {
        assert_eq!(ErrorCode::ValidationError.as_str(), "VALIDATION_ERROR");
        assert_eq!(ErrorCode::NotFound.as_str(), "NOT_FOUND");
        assert_eq!(ErrorCode::UpstreamError.as_str(), "UPSTREAM_ERROR");
    }

    #[test]
    fn test_error_code_integer_codes() {
        assert_eq!(ErrorCode::ValidationError.code(), 1001);
        assert_eq!(ErrorCode::ServiceUnavailable.code(), 1011);
        assert_eq!(ErrorCode::UpstreamError.code(), 6001);
    }

    #[test]
    fn test_server_codes_share_the_request_range() {
        for code in [ErrorCode::InternalError, ErrorCode::ServiceUnavailable] {
            assert!((1000..2000).contains(&code.code()), "{code} = {}", code.code());
        }
    }

    #[test]
    fn test_error_code_display_matches_serde() {
        let code = ErrorCode::ServiceUnavailable;
        let json = serde_json::to_string(&code).unwrap();
        assert_eq!(json, format!("\"{code}\""));
    }

    #[test]
    fn test_not_found_default_message() {
        assert_eq!(ErrorCode::NotFound.default_message(), "Not Found");
    }
}
