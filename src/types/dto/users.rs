use poem_openapi::Object;
use serde::{Deserialize, Serialize};

use crate::stores::user_store::{UserPage, UserWithRole};
use crate::types::db::role;
use crate::types::internal::draft::UserDraft;

/// An assignable role
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct RoleDto {
    pub id: i32,

    /// Role name ("admin" or "user"; super-admin is never listed)
    pub name: String,
}

impl From<role::Model> for RoleDto {
    fn from(model: role::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
        }
    }
}

/// One row of the user directory
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct UserRow {
    /// User ID (UUID)
    pub id: String,

    pub name: String,

    pub username: String,

    pub email: String,

    pub is_active: bool,

    /// Creation time (Unix timestamp)
    pub created_at: i64,

    /// The user's single assigned role
    pub role: RoleDto,
}

impl From<UserWithRole> for UserRow {
    fn from(user: UserWithRole) -> Self {
        Self {
            id: user.id,
            name: user.name,
            username: user.username,
            email: user.email,
            is_active: user.is_active,
            created_at: user.created_at,
            role: RoleDto {
                id: user.role_id,
                name: user.role_name,
            },
        }
    }
}

/// A page of the user directory
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct UserPageResponse {
    pub items: Vec<UserRow>,

    /// 1-based page number
    pub page: u64,

    /// Fixed page size (10)
    pub page_size: u64,

    pub total_items: u64,

    pub total_pages: u64,

    pub has_more: bool,
}

impl From<UserPage> for UserPageResponse {
    fn from(page: UserPage) -> Self {
        Self {
            items: page.items.into_iter().map(UserRow::from).collect(),
            page: page.page,
            page_size: page.page_size,
            total_items: page.total_items,
            total_pages: page.total_pages,
            has_more: page.has_more,
        }
    }
}

/// Request model for user creation
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,

    pub username: String,

    pub email: String,

    pub password: String,

    /// Must reference an assignable role
    pub role_id: Option<i32>,

    /// Defaults to true when omitted
    pub is_active: Option<bool>,
}

impl From<CreateUserRequest> for UserDraft {
    fn from(req: CreateUserRequest) -> Self {
        Self {
            name: req.name,
            username: req.username,
            email: req.email,
            password: req.password,
            role_id: req.role_id,
            is_active: req.is_active.unwrap_or(true),
        }
    }
}

/// Request model for user update
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    pub name: String,

    pub username: String,

    pub email: String,

    /// Omitted or blank leaves the password unchanged
    pub password: Option<String>,

    pub role_id: Option<i32>,

    pub is_active: bool,
}

impl From<UpdateUserRequest> for UserDraft {
    fn from(req: UpdateUserRequest) -> Self {
        Self {
            name: req.name,
            username: req.username,
            email: req.email,
            password: req.password.unwrap_or_default(),
            role_id: req.role_id,
            is_active: req.is_active,
        }
    }
}

/// Prefilled draft returned when an edit begins
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct EditDraftResponse {
    /// The user under edit
    pub user_id: String,

    pub name: String,

    pub username: String,

    pub email: String,

    /// Always blank for security
    pub password: String,

    pub role_id: Option<i32>,

    pub is_active: bool,
}

/// Response model for user creation
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct CreatedUserResponse {
    /// Success message
    pub message: String,

    pub user: UserRow,
}

/// Response model for user update
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct UpdatedUserResponse {
    /// Success message
    pub message: String,

    pub user: UserRow,
}

/// Response model for user deletion
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct DeletedUserResponse {
    /// Success message
    pub message: String,
}

/// Response model for cancelling an edit
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct CancelEditResponse {
    /// Success message
    pub message: String,
}
