use std::sync::Arc;

use poem_openapi::{auth::Bearer, payload::Json, OpenApi, SecurityScheme, Tags};

use crate::app_data::AppData;
use crate::errors::api::AuthError;
use crate::errors::internal::CredentialError;
use crate::errors::InternalError;
use crate::types::dto::auth::{
    LoginRequest, LogoutRequest, LogoutResponse, RefreshRequest, RefreshResponse, TokenResponse,
    WhoAmIResponse,
};

/// JWT Bearer token authentication
#[derive(SecurityScheme)]
#[oai(
    ty = "bearer",
    key_name = "Authorization",
    key_in = "header",
    bearer_format = "JWT"
)]
pub struct BearerAuth(pub Bearer);

/// API tags for authentication endpoints
#[derive(Tags)]
enum AuthTags {
    /// Authentication endpoints
    Authentication,
}

/// Authentication API endpoints
pub struct AuthApi {
    app_data: Arc<AppData>,
}

impl AuthApi {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self { app_data }
    }
}

#[OpenApi(prefix_path = "/auth")]
impl AuthApi {
    /// Login with username and password to receive authentication tokens
    #[oai(path = "/login", method = "post", tag = "AuthTags::Authentication")]
    async fn login(&self, body: Json<LoginRequest>) -> Result<Json<TokenResponse>, AuthError> {
        let user = self
            .app_data
            .credential_store
            .verify_credentials(&body.username, &body.password)
            .await
            .map_err(AuthError::from_internal_error)?;

        let token_service = &self.app_data.token_service;
        let access_token = token_service
            .generate_jwt(&user.id)
            .map_err(AuthError::from_internal_error)?;

        let session_token = token_service.generate_session_token();
        let token_hash = token_service.hash_session_token(&session_token);
        self.app_data
            .credential_store
            .store_session_token(token_hash, user.id, token_service.session_expiration())
            .await
            .map_err(AuthError::from_internal_error)?;

        Ok(Json(TokenResponse {
            access_token,
            session_token,
            token_type: "Bearer".to_string(),
            expires_in: token_service.jwt_expires_in(),
        }))
    }

    /// Verify the access token and return the acting user with their role
    #[oai(path = "/whoami", method = "get", tag = "AuthTags::Authentication")]
    async fn whoami(&self, auth: BearerAuth) -> Result<Json<WhoAmIResponse>, AuthError> {
        let actor = super::helpers::resolve_actor(&self.app_data, &auth.0.token)
            .await
            .map_err(AuthError::from_internal_error)?;

        Ok(Json(WhoAmIResponse {
            user_id: actor.id,
            role: actor.role.as_str().to_string(),
        }))
    }

    /// Exchange a session token for a fresh access token
    #[oai(path = "/refresh", method = "post", tag = "AuthTags::Authentication")]
    async fn refresh(&self, body: Json<RefreshRequest>) -> Result<Json<RefreshResponse>, AuthError> {
        let token_service = &self.app_data.token_service;
        let token_hash = token_service.hash_session_token(&body.session_token);

        let user_id = self
            .app_data
            .credential_store
            .validate_session_token(&token_hash)
            .await
            .map_err(AuthError::from_internal_error)?;

        // A deactivated account cannot ride out its session tokens; the
        // gate closes here too, dropping every session it still holds.
        let user = self
            .app_data
            .user_store
            .find_with_role(&user_id)
            .await
            .map_err(AuthError::from_internal_error)?
            .ok_or_else(AuthError::invalid_session_token)?;
        if !user.is_active {
            self.app_data
                .credential_store
                .invalidate_all_sessions(&user_id)
                .await
                .map_err(AuthError::from_internal_error)?;
            return Err(AuthError::account_deactivated());
        }

        let access_token = token_service
            .generate_jwt(&user_id)
            .map_err(AuthError::from_internal_error)?;

        Ok(Json(RefreshResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: token_service.jwt_expires_in(),
        }))
    }

    /// Logout and revoke the session token
    #[oai(path = "/logout", method = "post", tag = "AuthTags::Authentication")]
    async fn logout(
        &self,
        auth: BearerAuth,
        body: Json<LogoutRequest>,
    ) -> Result<Json<LogoutResponse>, AuthError> {
        self.app_data
            .token_service
            .validate_jwt(&auth.0.token)
            .map_err(AuthError::from_internal_error)?;

        let token_hash = self.app_data.token_service.hash_session_token(&body.session_token);

        // Logout is idempotent: revoking a token that is already gone still
        // counts as logged out.
        match self
            .app_data
            .credential_store
            .revoke_session_token(&token_hash)
            .await
        {
            Ok(_) => {}
            Err(InternalError::Credential(CredentialError::InvalidSessionToken)) => {}
            Err(e) => return Err(AuthError::from_internal_error(e)),
        }

        Ok(Json(LogoutResponse {
            message: "Logged out successfully".to_string(),
        }))
    }
}
