use thiserror::Error;

#[derive(Error, Debug)]
pub enum RoleError {
    /// The role catalog was never seeded or has been corrupted. This is a
    /// fatal configuration error, not recoverable at request scope.
    #[error("Role catalog is missing or incomplete")]
    CatalogMissing,

    #[error("Unknown role name in catalog: {0}")]
    UnknownRoleName(String),

    #[error("Role is not assignable: {0}")]
    NotAssignable(String),
}
