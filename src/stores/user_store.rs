use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    FromQueryResult, JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait, Select, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::errors::internal::{DatabaseError, UserError};
use crate::errors::InternalError;
use crate::services::policy::PolicyTarget;
use crate::types::db::{role, session_token, user, user_role};
use crate::types::internal::role_name::RoleName;

/// Directory page size, fixed rather than client-controlled.
pub const PAGE_SIZE: u64 = 10;

/// A user row joined with its single role, as listed in the directory and
/// loaded for policy decisions. The password hash is deliberately absent.
#[derive(Debug, Clone, FromQueryResult)]
pub struct UserWithRole {
    pub id: String,
    pub name: String,
    pub username: String,
    pub email: String,
    pub is_active: bool,
    pub created_at: i64,
    pub role_id: i32,
    pub role_name: String,
}

impl UserWithRole {
    /// The stored role name parsed against the catalog. A name outside the
    /// catalog means the role table was tampered with, and is an error.
    pub fn role(&self) -> Result<RoleName, InternalError> {
        RoleName::parse(&self.role_name)
            .ok_or_else(|| crate::errors::internal::RoleError::UnknownRoleName(self.role_name.clone()).into())
    }

    pub fn policy_target(&self) -> Result<PolicyTarget, InternalError> {
        Ok(PolicyTarget::new(self.id.clone(), self.role()?))
    }
}

/// One page of the user directory.
#[derive(Debug, Clone)]
pub struct UserPage {
    pub items: Vec<UserWithRole>,
    pub page: u64,
    pub page_size: u64,
    pub total_items: u64,
    pub total_pages: u64,
    pub has_more: bool,
}

/// Fields persisted when creating a user. The password arrives here already
/// hashed; the store never sees plaintext.
#[derive(Debug, Clone)]
pub struct CreateUserRecord {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role_id: i32,
    pub is_active: bool,
}

/// Fields persisted when updating a user. `password_hash` is `None` when the
/// password stays unchanged.
#[derive(Debug, Clone)]
pub struct UpdateUserRecord {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub role_id: i32,
    pub is_active: bool,
}

/// UserStore owns all reads and writes against the users, user_roles and
/// session_tokens tables that the management workflow needs.
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn with_role_query() -> Select<user::Entity> {
        user::Entity::find()
            .join(JoinType::InnerJoin, user::Relation::UserRole.def())
            .join(JoinType::InnerJoin, user_role::Relation::Role.def())
            .select_only()
            .column(user::Column::Id)
            .column(user::Column::Name)
            .column(user::Column::Username)
            .column(user::Column::Email)
            .column(user::Column::IsActive)
            .column(user::Column::CreatedAt)
            .column_as(role::Column::Id, "role_id")
            .column_as(role::Column::Name, "role_name")
    }

    /// Load one user with their role, super-admins included. Used both for
    /// edit/delete targets and for resolving the acting user.
    pub async fn find_with_role(&self, user_id: &str) -> Result<Option<UserWithRole>, InternalError> {
        Self::with_role_query()
            .filter(user::Column::Id.eq(user_id))
            .into_model::<UserWithRole>()
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("find_with_role", e))
    }

    /// One page of the user directory: super-admins excluded, newest first,
    /// optionally narrowed by a search term matched against name, username
    /// and email. SQLite's LIKE is case-insensitive for ASCII, which is the
    /// case-insensitivity the directory promises.
    ///
    /// `page` is 1-based; anything below 1 reads as the first page. A page
    /// past the end comes back with an empty item list, not an error.
    pub async fn search_page(&self, search: &str, page: u64) -> Result<UserPage, InternalError> {
        let mut query =
            Self::with_role_query().filter(role::Column::Name.ne(RoleName::SuperAdmin.as_str()));

        let term = search.trim();
        if !term.is_empty() {
            query = query.filter(
                Condition::any()
                    .add(user::Column::Name.contains(term))
                    .add(user::Column::Username.contains(term))
                    .add(user::Column::Email.contains(term)),
            );
        }

        let paginator = query
            .order_by_desc(user::Column::CreatedAt)
            .order_by_desc(user::Column::Id)
            .into_model::<UserWithRole>()
            .paginate(&self.db, PAGE_SIZE);

        let counts = paginator
            .num_items_and_pages()
            .await
            .map_err(|e| InternalError::database("search_page_count", e))?;

        let page = page.max(1);
        let items = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| InternalError::database("search_page_fetch", e))?;

        Ok(UserPage {
            items,
            page,
            page_size: PAGE_SIZE,
            total_items: counts.number_of_items,
            total_pages: counts.number_of_pages,
            has_more: page < counts.number_of_pages,
        })
    }

    pub async fn username_taken(
        &self,
        username: &str,
        exclude_user_id: Option<&str>,
    ) -> Result<bool, InternalError> {
        let mut query = user::Entity::find().filter(user::Column::Username.eq(username));
        if let Some(id) = exclude_user_id {
            query = query.filter(user::Column::Id.ne(id));
        }

        let count = query
            .count(&self.db)
            .await
            .map_err(|e| InternalError::database("username_taken", e))?;
        Ok(count > 0)
    }

    pub async fn email_taken(
        &self,
        email: &str,
        exclude_user_id: Option<&str>,
    ) -> Result<bool, InternalError> {
        let mut query = user::Entity::find().filter(user::Column::Email.eq(email));
        if let Some(id) = exclude_user_id {
            query = query.filter(user::Column::Id.ne(id));
        }

        let count = query
            .count(&self.db)
            .await
            .map_err(|e| InternalError::database("email_taken", e))?;
        Ok(count > 0)
    }

    /// Insert a user and their role row in one transaction. Returns the new
    /// user's id.
    pub async fn create_user(&self, record: CreateUserRecord) -> Result<String, InternalError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| DatabaseError::TransactionBegin { source: e })?;

        let user_id = Uuid::new_v4().to_string();
        let now = Utc::now().timestamp();

        let new_user = user::ActiveModel {
            id: Set(user_id.clone()),
            name: Set(record.name),
            username: Set(record.username.clone()),
            email: Set(record.email.clone()),
            password_hash: Set(record.password_hash),
            is_active: Set(record.is_active),
            created_at: Set(now),
            updated_at: Set(now),
        };

        new_user.insert(&txn).await.map_err(|e| {
            classify_unique_violation(&e, &record.username, &record.email)
                .unwrap_or_else(|| InternalError::database("create_user", e))
        })?;

        let assignment = user_role::ActiveModel {
            user_id: Set(user_id.clone()),
            role_id: Set(record.role_id),
        };
        assignment
            .insert(&txn)
            .await
            .map_err(|e| InternalError::database("create_user_role", e))?;

        txn.commit()
            .await
            .map_err(|e| DatabaseError::TransactionCommit { source: e })?;

        Ok(user_id)
    }

    /// Update a user's fields and re-point their single role row, in one
    /// transaction. The role sync deletes the old assignment and inserts the
    /// new one, so a user can never hold two roles even mid-write.
    pub async fn update_user(
        &self,
        user_id: &str,
        record: UpdateUserRecord,
    ) -> Result<(), InternalError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| DatabaseError::TransactionBegin { source: e })?;

        let mut changes = user::ActiveModel {
            id: Set(user_id.to_string()),
            name: Set(record.name),
            username: Set(record.username.clone()),
            email: Set(record.email.clone()),
            is_active: Set(record.is_active),
            updated_at: Set(Utc::now().timestamp()),
            ..Default::default()
        };
        if let Some(hash) = record.password_hash {
            changes.password_hash = Set(hash);
        }

        changes.update(&txn).await.map_err(|e| {
            if matches!(e, DbErr::RecordNotUpdated) {
                InternalError::from(UserError::NotFound(user_id.to_string()))
            } else {
                classify_unique_violation(&e, &record.username, &record.email)
                    .unwrap_or_else(|| InternalError::database("update_user", e))
            }
        })?;

        user_role::Entity::delete_many()
            .filter(user_role::Column::UserId.eq(user_id))
            .exec(&txn)
            .await
            .map_err(|e| InternalError::database("update_user_role_clear", e))?;

        let assignment = user_role::ActiveModel {
            user_id: Set(user_id.to_string()),
            role_id: Set(record.role_id),
        };
        assignment
            .insert(&txn)
            .await
            .map_err(|e| InternalError::database("update_user_role_assign", e))?;

        txn.commit()
            .await
            .map_err(|e| DatabaseError::TransactionCommit { source: e })?;

        Ok(())
    }

    /// Delete a user along with their role assignment and every session, in
    /// one transaction. The child rows are removed explicitly rather than
    /// leaning on SQLite's foreign-key pragma being enabled.
    pub async fn delete_user(&self, user_id: &str) -> Result<(), InternalError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| DatabaseError::TransactionBegin { source: e })?;

        session_token::Entity::delete_many()
            .filter(session_token::Column::UserId.eq(user_id))
            .exec(&txn)
            .await
            .map_err(|e| InternalError::database("delete_user_sessions", e))?;

        user_role::Entity::delete_many()
            .filter(user_role::Column::UserId.eq(user_id))
            .exec(&txn)
            .await
            .map_err(|e| InternalError::database("delete_user_role", e))?;

        let result = user::Entity::delete_by_id(user_id)
            .exec(&txn)
            .await
            .map_err(|e| InternalError::database("delete_user", e))?;

        if result.rows_affected == 0 {
            return Err(UserError::NotFound(user_id.to_string()).into());
        }

        txn.commit()
            .await
            .map_err(|e| DatabaseError::TransactionCommit { source: e })?;

        Ok(())
    }
}

impl std::fmt::Debug for UserStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserStore").field("db", &"<connection>").finish()
    }
}

/// Backstop for the race where two writers pass the pre-insert uniqueness
/// check simultaneously; SQLite reports the offending column in the message.
fn classify_unique_violation(e: &DbErr, username: &str, email: &str) -> Option<InternalError> {
    let text = e.to_string();
    if !text.contains("UNIQUE") {
        return None;
    }
    if text.contains("users.username") {
        Some(UserError::DuplicateUsername(username.to_string()).into())
    } else if text.contains("users.email") {
        Some(UserError::DuplicateEmail(email.to_string()).into())
    } else {
        None
    }
}
