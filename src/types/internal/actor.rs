use crate::types::internal::role_name::RoleName;

/// The authenticated user attempting an operation, with its resolved role.
/// Built per request by `api::helpers::resolve_actor`; the account-active
/// gate has already passed by the time an `Actor` exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: String,
    pub role: RoleName,
}

impl Actor {
    pub fn new(id: impl Into<String>, role: RoleName) -> Self {
        Self { id: id.into(), role }
    }
}
