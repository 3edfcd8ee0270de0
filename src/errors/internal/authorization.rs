use thiserror::Error;

/// An operation was denied by the authorization policy. No mutation occurred
/// and no validation was attempted; the boundary translates this to 403.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Actor {actor_id} is not authorized to {action} user {target_id}")]
pub struct AuthorizationDenied {
    pub action: &'static str,
    pub actor_id: String,
    pub target_id: String,
}

impl AuthorizationDenied {
    pub fn new(action: &'static str, actor_id: impl Into<String>, target_id: impl Into<String>) -> Self {
        Self {
            action,
            actor_id: actor_id.into(),
            target_id: target_id.into(),
        }
    }
}
