//! Auth Error Types
//!
//! Auth-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.
//!
//! Every credential or token failure collapses into one of two fixed
//! messages (`InvalidCredentials`, `Unauthorized`), so a client can never
//! tell an unknown user from a wrong password, or an expired token from a
//! forged one.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Malformed input (email format, username, password policy, role code)
    #[error("{0}")]
    Validation(String),

    /// Logout without a refresh token in the body
    #[error("Refresh token is required")]
    MissingRefreshToken,

    #[error("Username already taken")]
    UsernameTaken,

    #[error("Email already registered")]
    EmailTaken,

    /// Unknown username or wrong password
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Missing, malformed, expired, revoked or forged token
    #[error("Invalid or expired token")]
    Unauthorized,

    #[error("Insufficient permissions")]
    Forbidden,

    /// Target of an admin/profile operation does not exist
    #[error("User not found")]
    UserNotFound,

    /// A store call exceeded the configured timeout
    #[error("Store call timed out")]
    StoreTimeout,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

const RETRY_LATER: &str = "Retry the request later";

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::Validation(_) | AuthError::MissingRefreshToken => ErrorKind::BadRequest,
            AuthError::UsernameTaken | AuthError::EmailTaken => ErrorKind::Conflict,
            AuthError::InvalidCredentials | AuthError::Unauthorized => ErrorKind::Unauthorized,
            AuthError::Forbidden => ErrorKind::Forbidden,
            AuthError::UserNotFound => ErrorKind::NotFound,
            AuthError::StoreTimeout | AuthError::Database(_) => ErrorKind::ServiceUnavailable,
            AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    ///
    /// Server-side failures get a generic message; the original error is kept
    /// as `source` for logging only.
    pub fn into_app_error(self) -> AppError {
        let kind = self.kind();
        match self {
            AuthError::Database(e) => AppError::new(kind, "Service temporarily unavailable")
                .with_action(RETRY_LATER)
                .with_source(e),
            AuthError::StoreTimeout => {
                AppError::new(kind, "Service temporarily unavailable").with_action(RETRY_LATER)
            }
            AuthError::Internal(msg) => {
                AppError::new(kind, "Internal server error").with_source(InternalDetail(msg))
            }
            other => AppError::new(kind, other.to_string()),
        }
    }

    /// Log client-side failures; server-side ones are logged by `AppError`
    fn log(&self) {
        match self {
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::Unauthorized => {
                tracing::debug!("Rejected token");
            }
            AuthError::Forbidden => {
                tracing::warn!("Role check failed");
            }
            e if e.kind().is_client_error() => {
                tracing::debug!(error = %e, "Auth request rejected");
            }
            _ => {}
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.into_app_error().into_response()
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

impl From<tokio::task::JoinError> for AuthError {
    fn from(err: tokio::task::JoinError) -> Self {
        AuthError::Internal(format!("Blocking task failed: {err}"))
    }
}

#[derive(Debug, Error)]
#[error("{0}")]
struct InternalDetail(String);
