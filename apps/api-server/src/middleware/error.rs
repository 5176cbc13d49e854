//! Error handling - every failure becomes a `{status, message}` body.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use std::fmt;

use tardygram_core::DomainError;
use tardygram_core::error::RepoError;
use tardygram_core::ports::AuthError;
use tardygram_shared::ErrorResponse;

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    /// Missing, invalid or expired session token.
    Unauthenticated(String),
    InvalidCredentials,
    Forbidden(String),
    Conflict(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Unauthenticated(msg) => write!(f, "Unauthenticated: {}", msg),
            AppError::InvalidCredentials => write!(f, "Invalid credentials"),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            // Clients of this API expect 500 here, not 401.
            AppError::Unauthenticated(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code().as_u16();
        let error = match self {
            AppError::NotFound(message)
            | AppError::BadRequest(message)
            | AppError::Unauthenticated(message)
            | AppError::Forbidden(message)
            | AppError::Conflict(message) => ErrorResponse::new(status, message.clone()),
            AppError::InvalidCredentials => {
                ErrorResponse::new(status, AuthError::InvalidCredentials.to_string())
            }
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                ErrorResponse::internal_error()
            }
        };

        HttpResponse::build(self.status_code()).json(error)
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingToken | AuthError::TokenExpired => {
                AppError::Unauthenticated(err.to_string())
            }
            AuthError::InvalidToken(ref reason) => {
                tracing::debug!(reason = %reason, "Rejected session token");
                AppError::Unauthenticated(err.to_string())
            }
            AuthError::InvalidCredentials => AppError::InvalidCredentials,
            AuthError::HashingError(msg) => AppError::Internal(msg),
        }
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { .. } => AppError::NotFound(err.to_string()),
            DomainError::Validation(msg) => AppError::BadRequest(msg),
            DomainError::DuplicateEmail => AppError::Conflict(err.to_string()),
            DomainError::Forbidden { .. } => AppError::Forbidden(err.to_string()),
            DomainError::Auth(auth) => auth.into(),
            DomainError::Repo(repo) => repo.into(),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => AppError::NotFound("Resource not found".to_string()),
            RepoError::Constraint(msg) => AppError::Conflict(msg),
            RepoError::Connection(msg) => {
                tracing::error!("Database connection error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
            RepoError::Query(msg) => {
                tracing::error!("Database query error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
        }
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;
