//! Authentication routes
//!
//! Register, login, token refresh, and the current-user endpoint.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::{password, TokenPair};
use crate::domain::user::{NewUser, User};
use crate::domain::validate::{LoginPayload, RegisterPayload};
use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::store::UserStore;

use super::middleware::{bearer_token, CurrentUser};

// ============================================================================
// Response DTOs
// ============================================================================

/// Public view of a user; never carries the password hash.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            is_active: user.is_active,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: &'static str,
    pub user: UserResponse,
    #[serde(flatten)]
    pub tokens: TokenPair,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: UserResponse,
}

// ============================================================================
// Routers
// ============================================================================

/// Routes reachable without a token.
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

/// Routes that require a verified access token.
pub fn protected_router() -> Router<AppState> {
    Router::new().route("/auth/me", get(me))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/auth/register
///
/// Create an account and return a token pair so the client is signed in
/// immediately.
async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let registration = payload.validate()?;

    let store = UserStore::new(state.pool.clone());
    if store.email_exists(&registration.email).await? {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    let password_hash = password::hash(&registration.password)?;
    let user = store
        .insert(NewUser {
            email: registration.email,
            password_hash,
            name: registration.name,
        })
        .await?;

    let tokens = state.tokens.issue_pair(user.id)?;
    tracing::info!(user_id = %user.id, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "Registration successful",
            user: UserResponse::from(&user),
            tokens,
        }),
    ))
}

/// POST /api/auth/login
///
/// Credentials are checked before the active flag, so a disabled account
/// with a wrong password still reads as 401, not 403.
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> AppResult<Json<AuthResponse>> {
    let login = payload.validate()?;

    let store = UserStore::new(state.pool.clone());
    let user = match store.find_by_email(&login.email).await? {
        Some(user) if password::verify(&login.password, &user.password_hash) => user,
        _ => return Err(AppError::InvalidCredentials),
    };

    if !user.is_active {
        return Err(AppError::AccountDisabled);
    }

    let tokens = state.tokens.issue_pair(user.id)?;
    tracing::info!(user_id = %user.id, "user logged in");

    Ok(Json(AuthResponse {
        message: "Login successful",
        user: UserResponse::from(&user),
        tokens,
    }))
}

/// GET /api/auth/me
async fn me(Extension(current): Extension<CurrentUser>) -> Json<MeResponse> {
    Json(MeResponse {
        user: UserResponse::from(&current.user),
    })
}

/// POST /api/auth/refresh
///
/// Takes a refresh token in the Authorization header and mints a new
/// access token. The account must still exist.
async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<RefreshResponse>> {
    let token = bearer_token(&headers).ok_or(AppError::TokenMissing)?;
    let user_id = state.tokens.verify_refresh(token)?;

    let store = UserStore::new(state.pool.clone());
    if store.find_by_id(user_id).await?.is_none() {
        return Err(AppError::TokenInvalid);
    }

    let access_token = state.tokens.issue_access(user_id)?;

    Ok(Json(RefreshResponse {
        access_token,
        token_type: "Bearer",
    }))
}
