use crate::app_data::AppData;
use crate::errors::internal::CredentialError;
use crate::errors::InternalError;
use crate::types::internal::actor::Actor;

/// Resolve a bearer token into the acting user.
///
/// The role and active flag are re-read from the database on every request,
/// so a role change or deactivation takes effect immediately rather than at
/// the next token refresh. When the account turns out to be deactivated, all
/// of its session tokens are dropped before the request is rejected, which
/// is the account-active gate: existing sessions die the moment an
/// administrator flips the flag.
pub async fn resolve_actor(app_data: &AppData, token: &str) -> Result<Actor, InternalError> {
    let claims = app_data.token_service.validate_jwt(token)?;

    let user = app_data
        .user_store
        .find_with_role(&claims.sub)
        .await?
        .ok_or(CredentialError::InvalidToken)?;

    if !user.is_active {
        app_data
            .credential_store
            .invalidate_all_sessions(&user.id)
            .await?;
        return Err(CredentialError::AccountDeactivated.into());
    }

    let role = user.role()?;
    Ok(Actor::new(user.id, role))
}
