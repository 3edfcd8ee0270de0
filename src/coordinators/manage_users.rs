//! The user management workflow: directory listing, create, edit, update,
//! delete. Every operation re-checks the route-level guard and, where a
//! specific user is targeted, the per-target policy, so a stale UI can never
//! push an unauthorized mutation through.
//!
//! Ordering contract for mutations: guard, then per-target authorization,
//! then validation, then the write. A caller who is not allowed to touch the
//! target learns nothing about whether their payload was valid.

use std::sync::Arc;

use tracing::info;

use crate::errors::internal::{AuthorizationDenied, RoleError, UserError};
use crate::errors::InternalError;
use crate::services::crypto;
use crate::services::draft_registry::DraftRegistry;
use crate::services::policy;
use crate::services::user_form;
use crate::stores::role_store::RoleStore;
use crate::stores::user_store::{CreateUserRecord, UpdateUserRecord, UserPage, UserStore, UserWithRole};
use crate::types::db::role;
use crate::types::internal::actor::Actor;
use crate::types::internal::draft::UserDraft;

pub const CREATED_MESSAGE: &str = "User created successfully.";
pub const UPDATED_MESSAGE: &str = "User updated successfully.";
pub const DELETED_MESSAGE: &str = "User deleted successfully.";

/// Result of an update attempt.
#[derive(Debug)]
pub enum UpdateOutcome {
    /// The target was updated; carries the fresh row.
    Committed(UserWithRole),
    /// There was no target to update. Nothing was validated or written.
    NoTarget,
}

pub struct ManageUsersCoordinator {
    user_store: Arc<UserStore>,
    role_store: Arc<RoleStore>,
    drafts: Arc<DraftRegistry>,
    password_pepper: String,
}

impl ManageUsersCoordinator {
    pub fn new(
        user_store: Arc<UserStore>,
        role_store: Arc<RoleStore>,
        drafts: Arc<DraftRegistry>,
        password_pepper: String,
    ) -> Self {
        Self {
            user_store,
            role_store,
            drafts,
            password_pepper,
        }
    }

    fn guard(actor: &Actor) -> Result<(), InternalError> {
        if policy::can_manage_users(actor) {
            Ok(())
        } else {
            Err(AuthorizationDenied::new("manage", &actor.id, "directory").into())
        }
    }

    /// One page of the directory, optionally narrowed by a search term.
    pub async fn list_users(
        &self,
        actor: &Actor,
        search: &str,
        page: u64,
    ) -> Result<UserPage, InternalError> {
        Self::guard(actor)?;
        self.user_store.search_page(search, page).await
    }

    /// Roles offered by the create/edit form.
    pub async fn assignable_roles(&self, actor: &Actor) -> Result<Vec<role::Model>, InternalError> {
        Self::guard(actor)?;
        self.role_store.list_assignable().await
    }

    /// Create a user from a draft. All field failures, uniqueness conflicts
    /// and a bad role choice are accumulated into one validation failure so
    /// the form can mark every problem at once.
    pub async fn create(&self, actor: &Actor, draft: UserDraft) -> Result<UserWithRole, InternalError> {
        Self::guard(actor)?;

        let mut failure = user_form::validate_create(&draft);

        if failure.message_for("username").is_none()
            && self.user_store.username_taken(&draft.username, None).await?
        {
            failure.add("username", "The username has already been taken.");
        }
        if failure.message_for("email").is_none()
            && self.user_store.email_taken(&draft.email, None).await?
        {
            failure.add("email", "The email has already been taken.");
        }

        let assignable = match draft.role_id {
            Some(role_id) => {
                let found = self.role_store.find_assignable(role_id).await?;
                if found.is_none() {
                    failure.add("role_id", "The selected role is invalid.");
                }
                found
            }
            None => None,
        };

        failure.into_result()?;
        let role = assignable
            .ok_or_else(|| RoleError::NotAssignable(format!("{:?}", draft.role_id)))?;

        let password_hash = crypto::hash_password(&draft.password, &self.password_pepper)?;
        let user_id = self
            .user_store
            .create_user(CreateUserRecord {
                name: draft.name,
                username: draft.username,
                email: draft.email,
                password_hash,
                role_id: role.id,
                is_active: draft.is_active,
            })
            .await?;

        info!(user_id = user_id.as_str(), actor_id = actor.id.as_str(), "User created");

        self.user_store
            .find_with_role(&user_id)
            .await?
            .ok_or_else(|| UserError::NotFound(user_id).into())
    }

    /// Begin editing a user: authorize, prefill a draft from the stored row
    /// (password blank) and park it in the registry until commit or cancel.
    pub async fn begin_edit(&self, actor: &Actor, target_id: &str) -> Result<UserDraft, InternalError> {
        Self::guard(actor)?;

        let target = self
            .user_store
            .find_with_role(target_id)
            .await?
            .ok_or_else(|| UserError::NotFound(target_id.to_string()))?;

        if !policy::can_update(actor, &target.policy_target()?) {
            return Err(AuthorizationDenied::new("update", &actor.id, target_id).into());
        }

        let draft = UserDraft {
            name: target.name,
            username: target.username,
            email: target.email,
            password: String::new(),
            role_id: Some(target.role_id),
            is_active: target.is_active,
        };
        self.drafts.insert(target_id, draft.clone());
        Ok(draft)
    }

    /// Commit an edit against a target that may already be gone. With no
    /// target, the attempt is a quiet no-op: nothing validated, nothing
    /// written, no draft consumed.
    pub async fn update(
        &self,
        actor: &Actor,
        target: Option<&UserWithRole>,
        draft: UserDraft,
    ) -> Result<UpdateOutcome, InternalError> {
        Self::guard(actor)?;

        let Some(target) = target else {
            return Ok(UpdateOutcome::NoTarget);
        };

        if !policy::can_update(actor, &target.policy_target()?) {
            return Err(AuthorizationDenied::new("update", &actor.id, &target.id).into());
        }

        let mut failure = user_form::validate_update(&draft);

        if failure.message_for("username").is_none()
            && self
                .user_store
                .username_taken(&draft.username, Some(&target.id))
                .await?
        {
            failure.add("username", "The username has already been taken.");
        }
        if failure.message_for("email").is_none()
            && self
                .user_store
                .email_taken(&draft.email, Some(&target.id))
                .await?
        {
            failure.add("email", "The email has already been taken.");
        }

        let assignable = match draft.role_id {
            Some(role_id) => {
                let found = self.role_store.find_assignable(role_id).await?;
                if found.is_none() {
                    failure.add("role_id", "The selected role is invalid.");
                }
                found
            }
            None => None,
        };

        failure.into_result()?;
        let role = assignable
            .ok_or_else(|| RoleError::NotAssignable(format!("{:?}", draft.role_id)))?;

        let password_hash = if draft.password.is_empty() {
            None
        } else {
            Some(crypto::hash_password(&draft.password, &self.password_pepper)?)
        };

        self.user_store
            .update_user(
                &target.id,
                UpdateUserRecord {
                    name: draft.name,
                    username: draft.username,
                    email: draft.email,
                    password_hash,
                    role_id: role.id,
                    is_active: draft.is_active,
                },
            )
            .await?;

        self.drafts.remove(&target.id);
        info!(user_id = target.id.as_str(), actor_id = actor.id.as_str(), "User updated");

        let updated = self
            .user_store
            .find_with_role(&target.id)
            .await?
            .ok_or_else(|| UserError::NotFound(target.id.clone()))?;
        Ok(UpdateOutcome::Committed(updated))
    }

    /// Update addressed by id, as the HTTP surface does it.
    pub async fn update_by_id(
        &self,
        actor: &Actor,
        target_id: &str,
        draft: UserDraft,
    ) -> Result<UpdateOutcome, InternalError> {
        Self::guard(actor)?;
        let target = self.user_store.find_with_role(target_id).await?;
        self.update(actor, target.as_ref(), draft).await
    }

    /// Delete a user. Their role row, sessions and any in-flight draft go
    /// with them.
    pub async fn delete(&self, actor: &Actor, target_id: &str) -> Result<(), InternalError> {
        Self::guard(actor)?;

        let target = self
            .user_store
            .find_with_role(target_id)
            .await?
            .ok_or_else(|| UserError::NotFound(target_id.to_string()))?;

        if !policy::can_delete(actor, &target.policy_target()?) {
            return Err(AuthorizationDenied::new("delete", &actor.id, target_id).into());
        }

        self.user_store.delete_user(target_id).await?;
        self.drafts.remove(target_id);
        info!(user_id = target_id, actor_id = actor.id.as_str(), "User deleted");
        Ok(())
    }

    /// Abandon an in-flight edit. Returns whether a draft existed; canceling
    /// with no draft is a harmless no-op.
    pub fn cancel_edit(&self, actor: &Actor, target_id: &str) -> Result<bool, InternalError> {
        Self::guard(actor)?;
        Ok(self.drafts.remove(target_id).is_some())
    }
}

impl std::fmt::Debug for ManageUsersCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManageUsersCoordinator")
            .field("password_pepper", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;

    use crate::errors::internal::ValidationFailure;
    use crate::types::internal::role_name::RoleName;

    const PEPPER: &str = "test-pepper-for-coordinator-tests";

    struct Harness {
        coordinator: ManageUsersCoordinator,
        user_store: Arc<UserStore>,
        role_store: Arc<RoleStore>,
        drafts: Arc<DraftRegistry>,
    }

    async fn setup() -> Harness {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to create test database");
        Migrator::up(&db, None).await.expect("Failed to run migrations");

        let user_store = Arc::new(UserStore::new(db.clone()));
        let role_store = Arc::new(RoleStore::new(db.clone()));
        role_store.seed_roles().await.expect("Failed to seed roles");
        let drafts = Arc::new(DraftRegistry::new());

        let coordinator = ManageUsersCoordinator::new(
            Arc::clone(&user_store),
            Arc::clone(&role_store),
            Arc::clone(&drafts),
            PEPPER.to_string(),
        );
        Harness {
            coordinator,
            user_store,
            role_store,
            drafts,
        }
    }

    impl Harness {
        async fn role_id(&self, name: RoleName) -> i32 {
            self.role_store
                .find_by_name(name)
                .await
                .expect("role query failed")
                .expect("role missing")
                .id
        }

        /// Insert a user directly through the store and return them both as
        /// an actor and as a row.
        async fn seed_user(&self, username: &str, role: RoleName) -> (Actor, UserWithRole) {
            let role_id = self.role_id(role).await;
            let id = self
                .user_store
                .create_user(CreateUserRecord {
                    name: username.to_string(),
                    username: username.to_string(),
                    email: format!("{username}@example.com"),
                    password_hash: "$argon2id$fake".to_string(),
                    role_id,
                    is_active: true,
                })
                .await
                .expect("seed user failed");
            let row = self
                .user_store
                .find_with_role(&id)
                .await
                .expect("find failed")
                .expect("user missing");
            (Actor::new(id, role), row)
        }
    }

    fn draft(username: &str, role_id: i32) -> UserDraft {
        UserDraft {
            name: username.to_string(),
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password: "password123".to_string(),
            role_id: Some(role_id),
            is_active: true,
        }
    }

    fn assert_denied(err: InternalError, action: &str) {
        match err {
            InternalError::Authorization(denied) => assert_eq!(denied.action, action),
            other => panic!("expected authorization denial, got {other:?}"),
        }
    }

    fn assert_validation(err: InternalError) -> ValidationFailure {
        match err {
            InternalError::Validation(failure) => failure,
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_plain_user_is_locked_out_of_the_workflow() {
        let h = setup().await;
        let (user, target) = h.seed_user("plain", RoleName::User).await;

        let err = h
            .coordinator
            .list_users(&user, "", 1)
            .await
            .expect_err("expected denial");
        assert_denied(err, "manage");

        let err = h
            .coordinator
            .delete(&user, &target.id)
            .await
            .expect_err("expected denial");
        assert_denied(err, "manage");
    }

    #[tokio::test]
    async fn test_create_happy_path() {
        let h = setup().await;
        let (admin, _) = h.seed_user("admin1", RoleName::Admin).await;
        let role_id = h.role_id(RoleName::User).await;

        let created = h
            .coordinator
            .create(&admin, draft("newbie", role_id))
            .await
            .expect("create failed");
        assert_eq!(created.username, "newbie");
        assert_eq!(created.role().expect("role parse failed"), RoleName::User);
    }

    #[tokio::test]
    async fn test_create_accumulates_all_field_failures() {
        let h = setup().await;
        let (admin, _) = h.seed_user("admin1", RoleName::Admin).await;

        let mut bad = draft("taken", 9999);
        bad.name = String::new();
        bad.password = "short".to_string();
        h.seed_user("taken", RoleName::User).await;

        let failure = assert_validation(
            h.coordinator
                .create(&admin, bad)
                .await
                .expect_err("expected validation failure"),
        );
        assert_eq!(failure.message_for("name"), Some("The name field is required."));
        assert_eq!(
            failure.message_for("username"),
            Some("The username has already been taken.")
        );
        assert_eq!(
            failure.message_for("email"),
            Some("The email has already been taken.")
        );
        assert_eq!(
            failure.message_for("password"),
            Some("The password must be at least 8 characters.")
        );
        assert_eq!(failure.message_for("role_id"), Some("The selected role is invalid."));
    }

    #[tokio::test]
    async fn test_create_refuses_the_super_admin_role() {
        let h = setup().await;
        let (admin, _) = h.seed_user("admin1", RoleName::Admin).await;
        let super_role = h.role_id(RoleName::SuperAdmin).await;

        let failure = assert_validation(
            h.coordinator
                .create(&admin, draft("wannabe", super_role))
                .await
                .expect_err("expected validation failure"),
        );
        assert_eq!(failure.message_for("role_id"), Some("The selected role is invalid."));
    }

    #[tokio::test]
    async fn test_admin_cannot_touch_another_admin() {
        let h = setup().await;
        let (admin, _) = h.seed_user("admin1", RoleName::Admin).await;
        let (_, other_admin) = h.seed_user("admin2", RoleName::Admin).await;
        let role_id = h.role_id(RoleName::Admin).await;

        let err = h
            .coordinator
            .update(&admin, Some(&other_admin), draft("admin2", role_id))
            .await
            .expect_err("expected denial");
        assert_denied(err, "update");

        let err = h
            .coordinator
            .delete(&admin, &other_admin.id)
            .await
            .expect_err("expected denial");
        assert_denied(err, "delete");
    }

    #[tokio::test]
    async fn test_nobody_deletes_themselves() {
        let h = setup().await;
        let (super_admin, _) = h.seed_user("root", RoleName::SuperAdmin).await;
        let (admin, _) = h.seed_user("admin1", RoleName::Admin).await;

        for actor in [&super_admin, &admin] {
            let err = h
                .coordinator
                .delete(actor, &actor.id)
                .await
                .expect_err("expected denial");
            assert_denied(err, "delete");
        }
    }

    #[tokio::test]
    async fn test_super_admin_may_update_self_but_not_another_super_admin() {
        let h = setup().await;
        let (root, root_row) = h.seed_user("root", RoleName::SuperAdmin).await;
        let (_, other_root_row) = h.seed_user("root2", RoleName::SuperAdmin).await;
        let admin_role = h.role_id(RoleName::Admin).await;

        let err = h
            .coordinator
            .update(&root, Some(&other_root_row), draft("root2", admin_role))
            .await
            .expect_err("expected denial");
        assert_denied(err, "update");

        // Self-update passes the policy. The form can only hand out
        // assignable roles, so the self-edit here demotes to admin.
        let mut self_draft = draft("root", admin_role);
        self_draft.password = String::new();
        let outcome = h
            .coordinator
            .update(&root, Some(&root_row), self_draft)
            .await
            .expect("self-update failed");
        assert!(matches!(outcome, UpdateOutcome::Committed(_)));
    }

    #[tokio::test]
    async fn test_authorization_is_checked_before_validation() {
        let h = setup().await;
        let (admin, _) = h.seed_user("admin1", RoleName::Admin).await;
        let (_, other_admin) = h.seed_user("admin2", RoleName::Admin).await;

        // Draft is completely invalid, but the denial must win.
        let err = h
            .coordinator
            .update(&admin, Some(&other_admin), UserDraft::default())
            .await
            .expect_err("expected denial");
        assert_denied(err, "update");
    }

    #[tokio::test]
    async fn test_update_with_no_target_is_a_quiet_noop() {
        let h = setup().await;
        let (admin, _) = h.seed_user("admin1", RoleName::Admin).await;

        // Even an invalid draft produces no validation failure: with no
        // target there is nothing to validate against.
        let outcome = h
            .coordinator
            .update(&admin, None, UserDraft::default())
            .await
            .expect("expected no-op");
        assert!(matches!(outcome, UpdateOutcome::NoTarget));
    }

    #[tokio::test]
    async fn test_edit_round_trip() {
        let h = setup().await;
        let (admin, _) = h.seed_user("admin1", RoleName::Admin).await;
        let (_, target) = h.seed_user("victim", RoleName::User).await;
        let user_role = h.role_id(RoleName::User).await;

        let prefilled = h
            .coordinator
            .begin_edit(&admin, &target.id)
            .await
            .expect("begin edit failed");
        assert_eq!(prefilled.username, "victim");
        assert_eq!(prefilled.password, "");
        assert_eq!(prefilled.role_id, Some(user_role));
        assert!(h.drafts.is_editing(&target.id));

        let mut edited = prefilled;
        edited.name = "Renamed Victim".to_string();

        let outcome = h
            .coordinator
            .update_by_id(&admin, &target.id, edited)
            .await
            .expect("update failed");
        let updated = match outcome {
            UpdateOutcome::Committed(row) => row,
            UpdateOutcome::NoTarget => panic!("expected a committed update"),
        };
        assert_eq!(updated.name, "Renamed Victim");
        assert!(!h.drafts.is_editing(&target.id));
    }

    #[tokio::test]
    async fn test_cancel_edit_discards_the_draft() {
        let h = setup().await;
        let (admin, _) = h.seed_user("admin1", RoleName::Admin).await;
        let (_, target) = h.seed_user("victim", RoleName::User).await;

        h.coordinator
            .begin_edit(&admin, &target.id)
            .await
            .expect("begin edit failed");
        assert!(h.coordinator.cancel_edit(&admin, &target.id).expect("cancel failed"));
        assert!(!h.drafts.is_editing(&target.id));
        assert!(!h.coordinator.cancel_edit(&admin, &target.id).expect("cancel failed"));
    }

    #[tokio::test]
    async fn test_delete_removes_user_and_draft() {
        let h = setup().await;
        let (admin, _) = h.seed_user("admin1", RoleName::Admin).await;
        let (_, target) = h.seed_user("victim", RoleName::User).await;

        h.coordinator
            .begin_edit(&admin, &target.id)
            .await
            .expect("begin edit failed");
        h.coordinator
            .delete(&admin, &target.id)
            .await
            .expect("delete failed");

        assert!(h
            .user_store
            .find_with_role(&target.id)
            .await
            .expect("find failed")
            .is_none());
        assert!(!h.drafts.is_editing(&target.id));

        let err = h
            .coordinator
            .delete(&admin, &target.id)
            .await
            .expect_err("expected not found");
        assert!(matches!(err, InternalError::User(UserError::NotFound(_))));
    }
}
