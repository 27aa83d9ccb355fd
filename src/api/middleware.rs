//! API Middleware
//!
//! Authentication, rate limiting, and request logging middleware.

use std::net::SocketAddr;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::domain::user::User;
use crate::error::AppError;
use crate::state::AppState;
use crate::store::UserStore;

/// The authenticated user, inserted into request extensions by
/// `auth_middleware` and read by the protected handlers.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
}

/// Pull the bearer token out of the Authorization header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

// =========================================================================
// Bearer Authentication Middleware
// =========================================================================

/// Verify the access token and load the user it belongs to.
///
/// A token whose user no longer exists is treated as invalid; account
/// deactivation is enforced at login, not here, matching the refresh
/// token's lifetime semantics.
pub async fn auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    let token = match bearer_token(&headers) {
        Some(token) => token,
        None => return Err(AppError::TokenMissing.into_response()),
    };

    let user_id = match state.tokens.verify_access(token) {
        Ok(user_id) => user_id,
        Err(e) => return Err(AppError::from(e).into_response()),
    };

    let user = match UserStore::new(state.pool.clone()).find_by_id(user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => return Err(AppError::TokenInvalid.into_response()),
        Err(e) => {
            tracing::error!("Database error during token validation: {}", e);
            return Err(e.into_response());
        }
    };

    request.extensions_mut().insert(CurrentUser { user });

    Ok(next.run(request).await)
}

// =========================================================================
// Rate Limiting Middleware
// =========================================================================

/// Fixed-window rate limiting keyed by client IP.
///
/// Windows live in the rate_limit_windows table so the limit holds across
/// multiple server processes; stale windows are pruned by the maintenance
/// job.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    let client_key = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let count: i32 = match sqlx::query_scalar(
        r#"
        INSERT INTO rate_limit_windows (client_key, window_start, request_count)
        VALUES ($1, date_trunc('minute', NOW()), 1)
        ON CONFLICT (client_key, window_start)
        DO UPDATE SET request_count = rate_limit_windows.request_count + 1
        RETURNING request_count
        "#,
    )
    .bind(&client_key)
    .fetch_one(&state.pool)
    .await
    {
        Ok(count) => count,
        Err(e) => {
            tracing::error!("Rate limit check error: {}", e);
            return Err(AppError::from(e).into_response());
        }
    };

    if count > state.rate_limit_per_minute {
        tracing::warn!(client = %client_key, count, "rate limit exceeded");
        return Err(AppError::RateLimitExceeded.into_response());
    }

    Ok(next.run(request).await)
}

// =========================================================================
// mask_headers_for_logging
// =========================================================================

/// Headers that should be masked in logs
const SENSITIVE_HEADERS: &[&str] = &[
    "authorization",
    "cookie",
    "set-cookie",
    "x-api-key",
];

/// Mask sensitive headers for logging
pub fn mask_headers_for_logging(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let name_lower = name.as_str().to_lowercase();
            let masked_value = if SENSITIVE_HEADERS.contains(&name_lower.as_str()) {
                "[REDACTED]".to_string()
            } else {
                value.to_str().unwrap_or("[invalid utf8]").to_string()
            };
            (name.to_string(), masked_value)
        })
        .collect()
}

// =========================================================================
// Request Logging Middleware
// =========================================================================

/// Request logging middleware
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let version = request.version();

    // Mask sensitive headers
    let headers = mask_headers_for_logging(request.headers());

    let start = std::time::Instant::now();

    tracing::info!(
        method = %method,
        uri = %uri,
        version = ?version,
        headers = ?headers,
        "Incoming request"
    );

    let response = next.run(request).await;

    let duration = start.elapsed();
    let status = response.status();

    tracing::info!(
        method = %method,
        uri = %uri,
        status = %status,
        duration_ms = %duration.as_millis(),
        "Request completed"
    );

    response
}
