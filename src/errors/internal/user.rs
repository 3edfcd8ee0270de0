use thiserror::Error;

#[derive(Error, Debug)]
pub enum UserError {
    /// Target user no longer exists - e.g. deleted by another actor between
    /// list-render and action. Recoverable; callers prompt a refresh.
    #[error("User not found: {0}")]
    NotFound(String),

    #[error("Username already taken: {0}")]
    DuplicateUsername(String),

    #[error("Email already taken: {0}")]
    DuplicateEmail(String),
}
