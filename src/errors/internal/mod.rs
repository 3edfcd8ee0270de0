use thiserror::Error;

pub mod authorization;
pub mod credential;
pub mod database;
pub mod role;
pub mod user;
pub mod validation;

pub use authorization::AuthorizationDenied;
pub use credential::CredentialError;
pub use database::DatabaseError;
pub use role::RoleError;
pub use user::UserError;
pub use validation::{FieldError, ValidationFailure};

/// Internal error type for store, service and coordinator operations
///
/// Hybrid design separates infrastructure errors (shared) from domain errors
/// (component-specific). Not exposed via API - endpoints must convert to
/// AuthError or ManageUsersError.
#[derive(Error, Debug)]
pub enum InternalError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("Crypto error: {operation} failed: {message}")]
    Crypto {
        operation: String,
        message: String,
    },

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error(transparent)]
    Authorization(#[from] AuthorizationDenied),

    #[error(transparent)]
    Validation(#[from] ValidationFailure),

    #[error(transparent)]
    User(#[from] UserError),

    #[error(transparent)]
    Role(#[from] RoleError),
}

impl InternalError {
    pub fn database(operation: &str, source: sea_orm::DbErr) -> InternalError {
        InternalError::Database(DatabaseError::Operation {
            operation: operation.to_string(),
            source,
        })
    }

    pub fn crypto(operation: &str, message: impl Into<String>) -> InternalError {
        InternalError::Crypto {
            operation: operation.to_string(),
            message: message.into(),
        }
    }
}
