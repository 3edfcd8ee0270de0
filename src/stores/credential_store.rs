use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use tracing::info;

use crate::errors::internal::CredentialError;
use crate::errors::InternalError;
use crate::services::crypto;
use crate::types::db::{session_token, user};

/// CredentialStore manages password verification and opaque session tokens.
pub struct CredentialStore {
    db: DatabaseConnection,
    password_pepper: String,
}

impl CredentialStore {
    pub fn new(db: DatabaseConnection, password_pepper: String) -> Self {
        Self { db, password_pepper }
    }

    /// Verify a username/password pair. An unknown username and a wrong
    /// password are indistinguishable to the caller. A correct password
    /// against a deactivated account fails with the deactivation error so
    /// the sign-in page can show the notice instead of a generic failure.
    pub async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<user::Model, InternalError> {
        let found = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("verify_credentials", e))?;

        let found = found.ok_or(CredentialError::InvalidCredentials)?;

        if !crypto::verify_password(password, &found.password_hash, &self.password_pepper)? {
            return Err(CredentialError::InvalidCredentials.into());
        }

        if !found.is_active {
            return Err(CredentialError::AccountDeactivated.into());
        }

        Ok(found)
    }

    /// Persist a session token hash. Plaintext tokens never reach this store.
    pub async fn store_session_token(
        &self,
        token_hash: String,
        user_id: String,
        expires_at: i64,
    ) -> Result<(), InternalError> {
        let new_token = session_token::ActiveModel {
            token_hash: Set(token_hash),
            user_id: Set(user_id),
            expires_at: Set(expires_at),
            created_at: Set(Utc::now().timestamp()),
        };

        new_token
            .insert(&self.db)
            .await
            .map_err(|e| InternalError::database("store_session_token", e))?;

        Ok(())
    }

    /// Validate a session token hash and return the owning user id.
    pub async fn validate_session_token(&self, token_hash: &str) -> Result<String, InternalError> {
        let token = session_token::Entity::find_by_id(token_hash)
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("validate_session_token", e))?
            .ok_or(CredentialError::InvalidSessionToken)?;

        if token.expires_at < Utc::now().timestamp() {
            return Err(CredentialError::ExpiredSessionToken.into());
        }

        Ok(token.user_id)
    }

    /// Revoke one session token. Returns the owning user id; an unknown hash
    /// is an invalid-token error.
    pub async fn revoke_session_token(&self, token_hash: &str) -> Result<String, InternalError> {
        let token = session_token::Entity::find_by_id(token_hash)
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("revoke_session_token", e))?
            .ok_or(CredentialError::InvalidSessionToken)?;

        let user_id = token.user_id.clone();

        session_token::Entity::delete_by_id(token_hash)
            .exec(&self.db)
            .await
            .map_err(|e| InternalError::database("revoke_session_token", e))?;

        Ok(user_id)
    }

    /// Drop every session a user holds. Called when an account is
    /// deactivated so existing sessions stop working immediately, not at
    /// their natural expiry.
    pub async fn invalidate_all_sessions(&self, user_id: &str) -> Result<u64, InternalError> {
        let result = session_token::Entity::delete_many()
            .filter(session_token::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(|e| InternalError::database("invalidate_all_sessions", e))?;

        if result.rows_affected > 0 {
            info!(
                user_id = user_id,
                sessions = result.rows_affected,
                "Invalidated all sessions for user"
            );
        }

        Ok(result.rows_affected)
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("db", &"<connection>")
            .field("password_pepper", &"<redacted>")
            .finish()
    }
}
