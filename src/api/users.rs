use std::sync::Arc;

use poem_openapi::param::{Path, Query};
use poem_openapi::{payload::Json, OpenApi, Tags};

use crate::app_data::AppData;
use crate::coordinators::manage_users::{
    UpdateOutcome, CREATED_MESSAGE, DELETED_MESSAGE, UPDATED_MESSAGE,
};
use crate::errors::api::ManageUsersError;
use crate::types::dto::users::{
    CancelEditResponse, CreateUserRequest, CreatedUserResponse, DeletedUserResponse,
    EditDraftResponse, RoleDto, UpdateUserRequest, UpdatedUserResponse, UserPageResponse, UserRow,
};
use crate::types::internal::actor::Actor;

use super::auth::BearerAuth;
use super::helpers::resolve_actor;

/// API tags for user management endpoints
#[derive(Tags)]
enum ManageUsersTags {
    /// User management endpoints
    UserManagement,
}

/// User management API endpoints. Everything here requires an authenticated
/// super-admin or admin; a plain user is rejected at the policy layer.
pub struct ManageUsersApi {
    app_data: Arc<AppData>,
}

impl ManageUsersApi {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self { app_data }
    }

    async fn actor(&self, auth: &BearerAuth) -> Result<Actor, ManageUsersError> {
        resolve_actor(&self.app_data, &auth.0.token)
            .await
            .map_err(ManageUsersError::from_internal_error)
    }
}

#[OpenApi(prefix_path = "/admin")]
impl ManageUsersApi {
    /// List the user directory
    ///
    /// One page of users with their roles, newest first. Super-admin
    /// accounts never appear. The optional search term matches name,
    /// username and email, case-insensitively.
    #[oai(path = "/users", method = "get", tag = "ManageUsersTags::UserManagement")]
    async fn list_users(
        &self,
        auth: BearerAuth,
        search: Query<Option<String>>,
        page: Query<Option<u64>>,
    ) -> Result<Json<UserPageResponse>, ManageUsersError> {
        let actor = self.actor(&auth).await?;

        let page = self
            .app_data
            .manage_users
            .list_users(&actor, search.0.as_deref().unwrap_or(""), page.0.unwrap_or(1))
            .await
            .map_err(ManageUsersError::from_internal_error)?;

        Ok(Json(UserPageResponse::from(page)))
    }

    /// List the assignable roles
    ///
    /// The roles offered by the create/edit form. Super-admin is never
    /// among them.
    #[oai(path = "/roles", method = "get", tag = "ManageUsersTags::UserManagement")]
    async fn list_roles(&self, auth: BearerAuth) -> Result<Json<Vec<RoleDto>>, ManageUsersError> {
        let actor = self.actor(&auth).await?;

        let roles = self
            .app_data
            .manage_users
            .assignable_roles(&actor)
            .await
            .map_err(ManageUsersError::from_internal_error)?;

        Ok(Json(roles.into_iter().map(RoleDto::from).collect()))
    }

    /// Create a user
    #[oai(path = "/users", method = "post", tag = "ManageUsersTags::UserManagement")]
    async fn create_user(
        &self,
        auth: BearerAuth,
        body: Json<CreateUserRequest>,
    ) -> Result<Json<CreatedUserResponse>, ManageUsersError> {
        let actor = self.actor(&auth).await?;

        let created = self
            .app_data
            .manage_users
            .create(&actor, body.0.into())
            .await
            .map_err(ManageUsersError::from_internal_error)?;

        Ok(Json(CreatedUserResponse {
            message: CREATED_MESSAGE.to_string(),
            user: UserRow::from(created),
        }))
    }

    /// Begin editing a user
    ///
    /// Returns a draft prefilled from the stored row; the password comes
    /// back blank and stays unchanged unless the update supplies a new one.
    #[oai(path = "/users/:user_id/edit", method = "get", tag = "ManageUsersTags::UserManagement")]
    async fn begin_edit(
        &self,
        auth: BearerAuth,
        user_id: Path<String>,
    ) -> Result<Json<EditDraftResponse>, ManageUsersError> {
        let actor = self.actor(&auth).await?;

        let draft = self
            .app_data
            .manage_users
            .begin_edit(&actor, &user_id.0)
            .await
            .map_err(ManageUsersError::from_internal_error)?;

        Ok(Json(EditDraftResponse {
            user_id: user_id.0,
            name: draft.name,
            username: draft.username,
            email: draft.email,
            password: draft.password,
            role_id: draft.role_id,
            is_active: draft.is_active,
        }))
    }

    /// Cancel an in-flight edit
    #[oai(path = "/users/:user_id/edit", method = "delete", tag = "ManageUsersTags::UserManagement")]
    async fn cancel_edit(
        &self,
        auth: BearerAuth,
        user_id: Path<String>,
    ) -> Result<Json<CancelEditResponse>, ManageUsersError> {
        let actor = self.actor(&auth).await?;

        self.app_data
            .manage_users
            .cancel_edit(&actor, &user_id.0)
            .map_err(ManageUsersError::from_internal_error)?;

        Ok(Json(CancelEditResponse {
            message: "Edit cancelled.".to_string(),
        }))
    }

    /// Update a user
    #[oai(path = "/users/:user_id", method = "put", tag = "ManageUsersTags::UserManagement")]
    async fn update_user(
        &self,
        auth: BearerAuth,
        user_id: Path<String>,
        body: Json<UpdateUserRequest>,
    ) -> Result<Json<UpdatedUserResponse>, ManageUsersError> {
        let actor = self.actor(&auth).await?;

        let outcome = self
            .app_data
            .manage_users
            .update_by_id(&actor, &user_id.0, body.0.into())
            .await
            .map_err(ManageUsersError::from_internal_error)?;

        match outcome {
            UpdateOutcome::Committed(user) => Ok(Json(UpdatedUserResponse {
                message: UPDATED_MESSAGE.to_string(),
                user: UserRow::from(user),
            })),
            // Addressed by id, a vanished target is a 404 rather than the
            // quiet no-op the embedded form gets.
            UpdateOutcome::NoTarget => Err(ManageUsersError::not_found(&user_id.0)),
        }
    }

    /// Delete a user
    #[oai(path = "/users/:user_id", method = "delete", tag = "ManageUsersTags::UserManagement")]
    async fn delete_user(
        &self,
        auth: BearerAuth,
        user_id: Path<String>,
    ) -> Result<Json<DeletedUserResponse>, ManageUsersError> {
        let actor = self.actor(&auth).await?;

        self.app_data
            .manage_users
            .delete(&actor, &user_id.0)
            .await
            .map_err(ManageUsersError::from_internal_error)?;

        Ok(Json(DeletedUserResponse {
            message: DELETED_MESSAGE.to_string(),
        }))
    }
}
