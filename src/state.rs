//! Shared application state
//!
//! One `AppState` is built at startup and cloned into every handler and
//! middleware. Everything inside is cheap to clone; the pool and the
//! extractor's provider are reference-counted.

use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::TokenIssuer;
use crate::config::Config;
use crate::extract::{BillExtractor, TextGenerator};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub tokens: TokenIssuer,
    pub extractor: BillExtractor,
    pub rate_limit_per_minute: i32,
}

impl AppState {
    pub fn new(pool: PgPool, config: &Config, provider: Arc<dyn TextGenerator>) -> Self {
        Self {
            pool,
            tokens: TokenIssuer::new(
                &config.jwt_secret,
                config.jwt_access_ttl_secs,
                config.jwt_refresh_ttl_secs,
            ),
            extractor: BillExtractor::new(provider),
            rate_limit_per_minute: config.rate_limit_per_minute,
        }
    }
}
