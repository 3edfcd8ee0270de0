use poem_openapi::{payload::Json, ApiResponse, Object};
use std::fmt;

use crate::errors::internal::{CredentialError, InternalError};

/// Notice shown when the account-active gate fires.
pub const DEACTIVATION_NOTICE: &str =
    "Your account has been deactivated by an administrator. Please contact support for assistance.";

/// Standardized error response for authentication endpoints
#[derive(Object, Debug)]
pub struct AuthErrorResponse {
    /// Error code identifier
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// HTTP status code
    pub status_code: u16,
}

/// Authentication error types
#[derive(ApiResponse, Debug)]
pub enum AuthError {
    /// Invalid username or password
    #[oai(status = 401)]
    InvalidCredentials(Json<AuthErrorResponse>),

    /// Invalid or malformed JWT
    #[oai(status = 401)]
    InvalidToken(Json<AuthErrorResponse>),

    /// JWT has expired
    #[oai(status = 401)]
    ExpiredToken(Json<AuthErrorResponse>),

    /// Invalid session token
    #[oai(status = 401)]
    InvalidSessionToken(Json<AuthErrorResponse>),

    /// Session token has expired
    #[oai(status = 401)]
    ExpiredSessionToken(Json<AuthErrorResponse>),

    /// Account has been deactivated by an administrator
    #[oai(status = 401)]
    AccountDeactivated(Json<AuthErrorResponse>),

    /// Internal server error
    #[oai(status = 500)]
    InternalError(Json<AuthErrorResponse>),
}

impl AuthError {
    /// Create an InvalidCredentials error
    pub fn invalid_credentials() -> Self {
        AuthError::InvalidCredentials(Json(AuthErrorResponse {
            error: "invalid_credentials".to_string(),
            message: "Invalid username or password".to_string(),
            status_code: 401,
        }))
    }

    /// Create an InvalidToken error
    pub fn invalid_token() -> Self {
        AuthError::InvalidToken(Json(AuthErrorResponse {
            error: "invalid_token".to_string(),
            message: "Invalid or malformed JWT".to_string(),
            status_code: 401,
        }))
    }

    /// Create an ExpiredToken error
    pub fn expired_token() -> Self {
        AuthError::ExpiredToken(Json(AuthErrorResponse {
            error: "expired_token".to_string(),
            message: "JWT has expired".to_string(),
            status_code: 401,
        }))
    }

    /// Create an InvalidSessionToken error
    pub fn invalid_session_token() -> Self {
        AuthError::InvalidSessionToken(Json(AuthErrorResponse {
            error: "invalid_session_token".to_string(),
            message: "Invalid session token".to_string(),
            status_code: 401,
        }))
    }

    /// Create an ExpiredSessionToken error
    pub fn expired_session_token() -> Self {
        AuthError::ExpiredSessionToken(Json(AuthErrorResponse {
            error: "expired_session_token".to_string(),
            message: "Session token has expired".to_string(),
            status_code: 401,
        }))
    }

    /// Create an AccountDeactivated error carrying the deactivation notice
    pub fn account_deactivated() -> Self {
        AuthError::AccountDeactivated(Json(AuthErrorResponse {
            error: "account_deactivated".to_string(),
            message: DEACTIVATION_NOTICE.to_string(),
            status_code: 401,
        }))
    }

    /// Convert InternalError to AuthError
    ///
    /// This is the explicit conversion point from internal errors to API
    /// errors. Internal error details are logged but not exposed to clients.
    pub fn from_internal_error(err: InternalError) -> Self {
        match &err {
            InternalError::Credential(CredentialError::InvalidCredentials) => {
                Self::invalid_credentials()
            }
            InternalError::Credential(CredentialError::InvalidToken) => Self::invalid_token(),
            InternalError::Credential(CredentialError::ExpiredToken) => Self::expired_token(),
            InternalError::Credential(CredentialError::InvalidSessionToken) => {
                Self::invalid_session_token()
            }
            InternalError::Credential(CredentialError::ExpiredSessionToken) => {
                Self::expired_session_token()
            }
            InternalError::Credential(CredentialError::AccountDeactivated) => {
                Self::account_deactivated()
            }
            _ => {
                tracing::error!("Unexpected error in auth operation: {}", err);
                Self::internal_server_error()
            }
        }
    }

    /// Create a generic internal server error
    ///
    /// Always returns a generic message without exposing internal details.
    fn internal_server_error() -> Self {
        AuthError::InternalError(Json(AuthErrorResponse {
            error: "internal_error".to_string(),
            message: "An internal error occurred".to_string(),
            status_code: 500,
        }))
    }

    /// Get the error message from the error variant
    pub fn message(&self) -> String {
        match self {
            AuthError::InvalidCredentials(json) => json.0.message.clone(),
            AuthError::InvalidToken(json) => json.0.message.clone(),
            AuthError::ExpiredToken(json) => json.0.message.clone(),
            AuthError::InvalidSessionToken(json) => json.0.message.clone(),
            AuthError::ExpiredSessionToken(json) => json.0.message.clone(),
            AuthError::AccountDeactivated(json) => json.0.message.clone(),
            AuthError::InternalError(json) => json.0.message.clone(),
        }
    }

    /// Get the HTTP status code from the error variant
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::InvalidCredentials(json) => json.0.status_code,
            AuthError::InvalidToken(json) => json.0.status_code,
            AuthError::ExpiredToken(json) => json.0.status_code,
            AuthError::InvalidSessionToken(json) => json.0.status_code,
            AuthError::ExpiredSessionToken(json) => json.0.status_code,
            AuthError::AccountDeactivated(json) => json.0.status_code,
            AuthError::InternalError(json) => json.0.status_code,
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}
