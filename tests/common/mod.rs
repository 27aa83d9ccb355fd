//! Common test utilities

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use billtrack::extract::{GenerateError, TextGenerator};
use billtrack::{AppState, Config};

/// Stub model provider that always returns the same response body.
pub struct CannedGenerator(pub String);

#[async_trait]
impl TextGenerator for CannedGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerateError> {
        Ok(self.0.clone())
    }
}

/// Connect to the test database and make sure the schema exists.
///
/// Tests never truncate; each test works with freshly generated users
/// so they can run in parallel against the same database.
pub async fn setup_test_db() -> PgPool {
    dotenvy::dotenv().ok();
    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to DB");

    billtrack::db::ensure_schema(&pool)
        .await
        .expect("Failed to ensure schema");

    pool
}

/// State with a stub provider that returns an empty JSON object.
#[allow(dead_code)]
pub fn test_state(pool: PgPool) -> AppState {
    test_state_with_provider(pool, Arc::new(CannedGenerator("{}".to_string())))
}

pub fn test_state_with_provider(pool: PgPool, provider: Arc<dyn TextGenerator>) -> AppState {
    let config = Config {
        database_url: String::new(),
        database_max_connections: 5,
        host: "127.0.0.1".to_string(),
        port: 0,
        environment: "test".to_string(),
        jwt_secret: "test-secret-key-for-integration-tests".to_string(),
        jwt_access_ttl_secs: 3600,
        jwt_refresh_ttl_secs: 86400,
        anthropic_api_key: "test-key".to_string(),
        anthropic_base_url: "https://api.anthropic.com".to_string(),
        anthropic_model: "claude-sonnet-4-20250514".to_string(),
        ai_timeout_secs: 30,
        rate_limit_per_minute: 100,
    };

    AppState::new(pool, &config, provider)
}
