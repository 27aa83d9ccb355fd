//! JWT issuing and verification
//!
//! Access and refresh tokens are both HS256 JWTs signed with the configured
//! secret. A `token_use` claim separates the two, so a refresh token can
//! never authenticate an API request and an access token can never mint a
//! new one.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const USE_ACCESS: &str = "access";
const USE_REFRESH: &str = "refresh";

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
    pub token_use: String,
}

/// Access + refresh token pair returned on register/login
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Token has expired")]
    Expired,

    #[error("Invalid token")]
    Invalid,

    #[error("Failed to issue token: {0}")]
    Issue(String),
}

/// Signs and verifies tokens with a single shared secret.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, access_ttl_secs: i64, refresh_ttl_secs: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl: Duration::seconds(access_ttl_secs),
            refresh_ttl: Duration::seconds(refresh_ttl_secs),
        }
    }

    /// Issue a fresh access + refresh pair for a user.
    pub fn issue_pair(&self, user_id: Uuid) -> Result<TokenPair, AuthError> {
        Ok(TokenPair {
            access_token: self.issue(user_id, USE_ACCESS, self.access_ttl)?,
            refresh_token: self.issue(user_id, USE_REFRESH, self.refresh_ttl)?,
            token_type: "Bearer",
        })
    }

    /// Issue a new access token (refresh flow).
    pub fn issue_access(&self, user_id: Uuid) -> Result<String, AuthError> {
        self.issue(user_id, USE_ACCESS, self.access_ttl)
    }

    fn issue(&self, user_id: Uuid, token_use: &str, ttl: Duration) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
            token_use: token_use.to_string(),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AuthError::Issue(e.to_string()))
    }

    /// Verify an access token and return the user id it was issued to.
    pub fn verify_access(&self, token: &str) -> Result<Uuid, AuthError> {
        self.verify(token, USE_ACCESS)
    }

    /// Verify a refresh token and return the user id it was issued to.
    pub fn verify_refresh(&self, token: &str) -> Result<Uuid, AuthError> {
        self.verify(token, USE_REFRESH)
    }

    fn verify(&self, token: &str, expected_use: &str) -> Result<Uuid, AuthError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::Invalid,
            })?;

        if data.claims.token_use != expected_use {
            return Err(AuthError::Invalid);
        }

        data.claims.sub.parse().map_err(|_| AuthError::Invalid)
    }
}
