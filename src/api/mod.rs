//! API module
//!
//! HTTP routes and middleware. `create_router` wires the public auth
//! endpoints next to the token-guarded ones; rate limiting and request
//! logging are layered on top by the binary.

pub mod auth;
pub mod bills;
pub mod middleware;

use axum::Router;

use crate::state::AppState;

/// All `/api` routes. Everything behind `protected` passes through the
/// auth middleware and carries a `CurrentUser` extension.
pub fn create_router(state: AppState) -> Router<AppState> {
    let protected = auth::protected_router()
        .merge(bills::router())
        .layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth_middleware,
        ));

    auth::public_router().merge(protected)
}
