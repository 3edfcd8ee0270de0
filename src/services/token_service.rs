use base64::{engine::general_purpose, Engine as _};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::prelude::*;
use std::fmt;

use crate::errors::internal::CredentialError;
use crate::errors::InternalError;
use crate::services::crypto;
use crate::types::internal::auth::Claims;

/// Manages JWT access tokens and opaque session tokens
pub struct TokenService {
    jwt_secret: String,
    jwt_expiration_minutes: i64,
    session_expiration_days: i64,
    session_token_secret: String,
}

impl TokenService {
    /// Create a new TokenService with the given JWT secret and session token secret
    pub fn new(jwt_secret: String, session_token_secret: String) -> Self {
        Self {
            jwt_secret,
            jwt_expiration_minutes: 15,
            session_expiration_days: 7,
            session_token_secret,
        }
    }

    /// Number of seconds an access token stays valid
    pub fn jwt_expires_in(&self) -> i64 {
        self.jwt_expiration_minutes * 60
    }

    /// Generate a JWT for the given user id
    pub fn generate_jwt(&self, user_id: &str) -> Result<String, InternalError> {
        let now = Utc::now().timestamp();
        let expiration = now + self.jwt_expires_in();

        let claims = Claims {
            sub: user_id.to_string(),
            exp: expiration,
            iat: now,
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| InternalError::crypto("generate_jwt", e.to_string()))?;

        Ok(token)
    }

    /// Validate a JWT and return the claims
    pub fn validate_jwt(&self, token: &str) -> Result<Claims, InternalError> {
        let validation = Validation::new(Algorithm::HS256);

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| {
            if matches!(e.kind(), jsonwebtoken::errors::ErrorKind::ExpiredSignature) {
                InternalError::from(CredentialError::ExpiredToken)
            } else {
                InternalError::from(CredentialError::InvalidToken)
            }
        })?;

        Ok(token_data.claims)
    }

    /// Generate a cryptographically secure opaque session token
    /// (base64-encoded, 32 random bytes)
    pub fn generate_session_token(&self) -> String {
        let mut rng = rand::rng();
        let random_bytes: [u8; 32] = rng.random();
        general_purpose::STANDARD.encode(random_bytes)
    }

    /// Hash a session token using HMAC-SHA256. Only the hash is persisted.
    pub fn hash_session_token(&self, token: &str) -> String {
        crypto::hmac_sha256_token(&self.session_token_secret, token)
    }

    /// Expiration timestamp for a session token issued now
    pub fn session_expiration(&self) -> i64 {
        Utc::now().timestamp() + (self.session_expiration_days * 24 * 60 * 60)
    }
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("jwt_secret", &"<redacted>")
            .field("jwt_expiration_minutes", &self.jwt_expiration_minutes)
            .field("session_expiration_days", &self.session_expiration_days)
            .field("session_token_secret", &"<redacted>")
            .finish()
    }
}
