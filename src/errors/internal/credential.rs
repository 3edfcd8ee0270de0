use thiserror::Error;

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid or malformed access token")]
    InvalidToken,

    #[error("Access token has expired")]
    ExpiredToken,

    #[error("Invalid session token")]
    InvalidSessionToken,

    #[error("Session token has expired")]
    ExpiredSessionToken,

    /// Account-active gate: the actor was deactivated by an administrator.
    /// All of the actor's sessions are revoked before this is raised.
    #[error("Account has been deactivated")]
    AccountDeactivated,
}
