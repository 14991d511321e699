use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

/// Failures of the user-account core.
///
/// Each kind has a fixed client-facing message ([`UserError::message`]).
/// The string payload is context for logs and is never sent to clients.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserError {
    #[error("Already Exists Error: {0}")]
    AlreadyExists(String),

    #[error("Empty Update Error: {0}")]
    EmptyUpdate(String),

    #[error("MongoDB Unavailable Error: {0}")]
    StoreUnavailable(String),

    #[error("Not Found Error: {0}")]
    NotFound(String),

    #[error("Supabase Error: {0}")]
    ProviderError(String),

    /// Authentication rejected by the identity provider, forwarded as is
    #[error("Authentication error ({status}): {message}")]
    AuthApi { status: u16, message: String },

    #[error("Internal Server Error: {0}")]
    Internal(String),
}

pub type UserResult<T> = Result<T, UserError>;

impl UserError {
    /// Client-facing message
    pub fn message(&self) -> &str {
        match self {
            UserError::AlreadyExists(_) => "Already Exists Error",
            UserError::EmptyUpdate(_) => "Empty Update Error",
            UserError::StoreUnavailable(_) => "MongoDB Unavailable Error",
            UserError::NotFound(_) => "Not Found Error",
            UserError::ProviderError(_) => "Supabase Error",
            UserError::AuthApi { message, .. } => message,
            UserError::Internal(_) => "Internal Server Error",
        }
    }

    /// Context attached where the error was raised
    pub fn context(&self) -> Option<&str> {
        match self {
            UserError::AlreadyExists(ctx)
            | UserError::EmptyUpdate(ctx)
            | UserError::StoreUnavailable(ctx)
            | UserError::NotFound(ctx)
            | UserError::ProviderError(ctx)
            | UserError::Internal(ctx) => Some(ctx.as_str()).filter(|c| !c.is_empty()),
            UserError::AuthApi { .. } => None,
        }
    }
}

/// Convert UserError to AppError for standardized error responses
impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        if let Some(context) = err.context() {
            tracing::debug!(context, "{}", err.message());
        }

        let message = err.message().to_string();
        match err {
            UserError::AlreadyExists(_) => AppError::Conflict(message),
            UserError::EmptyUpdate(_) => AppError::BadRequest(message),
            UserError::StoreUnavailable(_) => AppError::ServiceUnavailable(message),
            UserError::NotFound(_) => AppError::NotFound(message),
            UserError::ProviderError(_) | UserError::Internal(_) => {
                AppError::InternalServerError(message)
            }
            UserError::AuthApi { status, .. } => AppError::upstream(status, message),
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for UserError {
    fn from(err: mongodb::error::Error) -> Self {
        UserError::StoreUnavailable(err.to_string())
    }
}
