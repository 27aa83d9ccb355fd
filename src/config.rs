//! Configuration module
//!
//! Loads configuration from environment variables.

use std::env;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection URL
    pub database_url: String,

    /// Maximum database connections in pool
    pub database_max_connections: u32,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Environment (development, production)
    pub environment: String,

    /// Secret used to sign JWTs (JWT_SECRET_KEY, falling back to SECRET_KEY)
    pub jwt_secret: String,

    /// Access token lifetime in seconds
    pub jwt_access_ttl_secs: i64,

    /// Refresh token lifetime in seconds
    pub jwt_refresh_ttl_secs: i64,

    /// API key for the Anthropic Messages API
    pub anthropic_api_key: String,

    /// Base URL for the Anthropic API (overridable for tests)
    pub anthropic_base_url: String,

    /// Model id sent with extraction requests
    pub anthropic_model: String,

    /// Timeout for extraction requests, in seconds
    pub ai_timeout_secs: u64,

    /// Rate limit: requests per minute per client
    pub rate_limit_per_minute: i32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingEnv("DATABASE_URL"))?;

        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("DATABASE_MAX_CONNECTIONS"))?;

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("PORT"))?;

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let secret_key = env::var("SECRET_KEY").map_err(|_| ConfigError::MissingEnv("SECRET_KEY"))?;

        let jwt_secret = env::var("JWT_SECRET_KEY").unwrap_or(secret_key);

        let jwt_access_ttl_secs = env::var("JWT_ACCESS_TTL_SECS")
            .unwrap_or_else(|_| "3600".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("JWT_ACCESS_TTL_SECS"))?;

        let jwt_refresh_ttl_secs = env::var("JWT_REFRESH_TTL_SECS")
            .unwrap_or_else(|_| "2592000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("JWT_REFRESH_TTL_SECS"))?;

        let anthropic_api_key = env::var("ANTHROPIC_API_KEY")
            .map_err(|_| ConfigError::MissingEnv("ANTHROPIC_API_KEY"))?;

        let anthropic_base_url = env::var("ANTHROPIC_BASE_URL")
            .unwrap_or_else(|_| "https://api.anthropic.com".to_string());

        let anthropic_model = env::var("ANTHROPIC_MODEL")
            .unwrap_or_else(|_| "claude-sonnet-4-20250514".to_string());

        let ai_timeout_secs = env::var("AI_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("AI_TIMEOUT_SECS"))?;

        let rate_limit_per_minute = env::var("RATE_LIMIT_PER_MINUTE")
            .unwrap_or_else(|_| "100".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("RATE_LIMIT_PER_MINUTE"))?;

        Ok(Self {
            database_url,
            database_max_connections,
            host,
            port,
            environment,
            jwt_secret,
            jwt_access_ttl_secs,
            jwt_refresh_ttl_secs,
            anthropic_api_key,
            anthropic_base_url,
            anthropic_model,
            ai_timeout_secs,
            rate_limit_per_minute,
        })
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnv(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}
