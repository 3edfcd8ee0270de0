use poem_openapi::{payload::Json, ApiResponse, Object};
use std::fmt;

use crate::errors::api::auth::DEACTIVATION_NOTICE;
use crate::errors::internal::{CredentialError, InternalError, UserError, ValidationFailure};

/// Standardized error response for user management endpoints
#[derive(Object, Debug)]
pub struct ManageUsersErrorResponse {
    /// Error code identifier
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// HTTP status code
    pub status_code: u16,
}

/// One invalid field with its message
#[derive(Object, Debug)]
pub struct FieldErrorDto {
    pub field: String,

    pub message: String,
}

/// Validation error response with per-field messages
#[derive(Object, Debug)]
pub struct ValidationErrorResponse {
    /// Error code identifier
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// HTTP status code
    pub status_code: u16,

    /// One entry per invalid field
    pub errors: Vec<FieldErrorDto>,
}

/// User management operation error types
#[derive(ApiResponse, Debug)]
pub enum ManageUsersError {
    /// One or more draft fields failed validation; nothing was persisted
    #[oai(status = 400)]
    ValidationFailed(Json<ValidationErrorResponse>),

    /// Missing, invalid or expired credentials
    #[oai(status = 401)]
    Unauthorized(Json<ManageUsersErrorResponse>),

    /// Account has been deactivated by an administrator
    #[oai(status = 401)]
    AccountDeactivated(Json<ManageUsersErrorResponse>),

    /// The authorization policy denied the operation
    #[oai(status = 403)]
    Forbidden(Json<ManageUsersErrorResponse>),

    /// Target user no longer exists
    #[oai(status = 404)]
    NotFound(Json<ManageUsersErrorResponse>),

    /// Internal server error
    #[oai(status = 500)]
    InternalError(Json<ManageUsersErrorResponse>),
}

impl ManageUsersError {
    /// Create a ValidationFailed error from accumulated field errors
    pub fn validation_failed(failure: &ValidationFailure) -> Self {
        ManageUsersError::ValidationFailed(Json(ValidationErrorResponse {
            error: "validation_failed".to_string(),
            message: "The given data was invalid.".to_string(),
            status_code: 400,
            errors: failure
                .errors
                .iter()
                .map(|e| FieldErrorDto {
                    field: e.field.clone(),
                    message: e.message.clone(),
                })
                .collect(),
        }))
    }

    /// Create an Unauthorized error
    pub fn unauthorized() -> Self {
        ManageUsersError::Unauthorized(Json(ManageUsersErrorResponse {
            error: "unauthorized".to_string(),
            message: "Authentication required".to_string(),
            status_code: 401,
        }))
    }

    /// Create an AccountDeactivated error carrying the deactivation notice
    pub fn account_deactivated() -> Self {
        ManageUsersError::AccountDeactivated(Json(ManageUsersErrorResponse {
            error: "account_deactivated".to_string(),
            message: DEACTIVATION_NOTICE.to_string(),
            status_code: 401,
        }))
    }

    /// Create a Forbidden error
    pub fn forbidden() -> Self {
        ManageUsersError::Forbidden(Json(ManageUsersErrorResponse {
            error: "forbidden".to_string(),
            message: "This action is unauthorized.".to_string(),
            status_code: 403,
        }))
    }

    /// Create a NotFound error
    pub fn not_found(user_id: &str) -> Self {
        ManageUsersError::NotFound(Json(ManageUsersErrorResponse {
            error: "user_not_found".to_string(),
            message: format!("User not found: {}", user_id),
            status_code: 404,
        }))
    }

    /// Convert InternalError to ManageUsersError
    ///
    /// This is the explicit conversion point from internal errors to API
    /// errors. Internal error details are logged but not exposed to clients.
    pub fn from_internal_error(err: InternalError) -> Self {
        match &err {
            InternalError::Validation(failure) => Self::validation_failed(failure),

            InternalError::Authorization(denied) => {
                tracing::warn!("Authorization denied: {}", denied);
                Self::forbidden()
            }

            InternalError::User(UserError::NotFound(user_id)) => Self::not_found(user_id),

            // Unique-constraint races caught below the validation layer are
            // reported as the same per-field errors validation would produce.
            InternalError::User(UserError::DuplicateUsername(_)) => {
                let mut failure = ValidationFailure::new();
                failure.add("username", "The username has already been taken.");
                Self::validation_failed(&failure)
            }
            InternalError::User(UserError::DuplicateEmail(_)) => {
                let mut failure = ValidationFailure::new();
                failure.add("email", "The email has already been taken.");
                Self::validation_failed(&failure)
            }

            InternalError::Credential(CredentialError::AccountDeactivated) => {
                Self::account_deactivated()
            }
            InternalError::Credential(_) => Self::unauthorized(),

            InternalError::Role(role_err) => {
                tracing::error!("Role catalog error in user management: {}", role_err);
                Self::internal_server_error()
            }

            _ => {
                tracing::error!("Unexpected error in user management operation: {}", err);
                Self::internal_server_error()
            }
        }
    }

    /// Create a generic internal server error
    ///
    /// Always returns a generic message without exposing internal details.
    fn internal_server_error() -> Self {
        ManageUsersError::InternalError(Json(ManageUsersErrorResponse {
            error: "internal_error".to_string(),
            message: "An internal error occurred".to_string(),
            status_code: 500,
        }))
    }

    /// Get the error message from the error variant
    pub fn message(&self) -> String {
        match self {
            ManageUsersError::ValidationFailed(json) => json.0.message.clone(),
            ManageUsersError::Unauthorized(json) => json.0.message.clone(),
            ManageUsersError::AccountDeactivated(json) => json.0.message.clone(),
            ManageUsersError::Forbidden(json) => json.0.message.clone(),
            ManageUsersError::NotFound(json) => json.0.message.clone(),
            ManageUsersError::InternalError(json) => json.0.message.clone(),
        }
    }

    /// Get the HTTP status code from the error variant
    pub fn status_code(&self) -> u16 {
        match self {
            ManageUsersError::ValidationFailed(json) => json.0.status_code,
            ManageUsersError::Unauthorized(json) => json.0.status_code,
            ManageUsersError::AccountDeactivated(json) => json.0.status_code,
            ManageUsersError::Forbidden(json) => json.0.status_code,
            ManageUsersError::NotFound(json) => json.0.status_code,
            ManageUsersError::InternalError(json) => json.0.status_code,
        }
    }
}

impl fmt::Display for ManageUsersError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}
