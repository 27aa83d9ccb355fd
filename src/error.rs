//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;

use crate::domain::validate::FieldError;
use crate::extract::ExtractError;

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Authorization required")]
    TokenMissing,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token")]
    TokenInvalid,

    #[error("Account is disabled")]
    AccountDisabled,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    // Extraction errors carry their own user-facing message
    #[error(transparent)]
    Extraction(#[from] ExtractError),

    // Server errors (5xx)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl From<Vec<FieldError>> for AppError {
    fn from(errors: Vec<FieldError>) -> Self {
        AppError::Validation(errors)
    }
}

impl From<crate::auth::AuthError> for AppError {
    fn from(err: crate::auth::AuthError) -> Self {
        use crate::auth::AuthError;
        match err {
            AuthError::Expired => AppError::TokenExpired,
            AuthError::Invalid => AppError::TokenInvalid,
            AuthError::Issue(msg) => AppError::Internal(msg),
        }
    }
}

impl From<crate::auth::PasswordError> for AppError {
    fn from(err: crate::auth::PasswordError) -> Self {
        AppError::Internal(err.to_string())
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, details) = match &self {
            // 400 Bad Request
            AppError::Validation(errors) => {
                (StatusCode::BAD_REQUEST, "validation_failed", Some(json!(errors)))
            }
            AppError::Extraction(e) => {
                (StatusCode::BAD_REQUEST, e.error_code(), None)
            }

            // 401 Unauthorized
            AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "invalid_credentials", None)
            }
            AppError::TokenMissing => {
                (StatusCode::UNAUTHORIZED, "missing_token", None)
            }
            AppError::TokenExpired => {
                (StatusCode::UNAUTHORIZED, "token_expired", None)
            }
            AppError::TokenInvalid => {
                (StatusCode::UNAUTHORIZED, "invalid_token", None)
            }

            // 403 Forbidden
            AppError::AccountDisabled => {
                (StatusCode::FORBIDDEN, "account_disabled", None)
            }

            // 404 Not Found
            AppError::NotFound(_) => {
                (StatusCode::NOT_FOUND, "not_found", None)
            }

            // 409 Conflict
            AppError::Conflict(_) => {
                (StatusCode::CONFLICT, "conflict", None)
            }

            // 429 Too Many Requests
            AppError::RateLimitExceeded => {
                (StatusCode::TOO_MANY_REQUESTS, "rate_limit_exceeded",
                 Some(json!("Too many requests. Please slow down.")))
            }

            // 500 Internal Server Error
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
            AppError::Config(e) => {
                tracing::error!("Config error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "config_error", None)
            }
        };

        let body = ErrorResponse {
            error: self.to_string(),
            error_code: error_code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}
