use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::info;

use crate::errors::internal::RoleError;
use crate::errors::InternalError;
use crate::types::db::role;
use crate::types::internal::role_name::{RoleName, ROLE_CATALOG};

/// Outcome of a seeding run: which catalog roles were inserted and which
/// already existed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleSeedReport {
    pub created: Vec<String>,
    pub existing: Vec<String>,
}

/// RoleStore manages the fixed role catalog.
pub struct RoleStore {
    db: DatabaseConnection,
}

impl RoleStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Ensure every catalog role exists. Idempotent: roles already present
    /// are left untouched, so re-running never duplicates or resets them.
    pub async fn seed_roles(&self) -> Result<RoleSeedReport, InternalError> {
        let mut report = RoleSeedReport::default();

        for role_name in ROLE_CATALOG {
            let existing = role::Entity::find()
                .filter(role::Column::Name.eq(role_name.as_str()))
                .one(&self.db)
                .await
                .map_err(|e| InternalError::database("seed_roles_lookup", e))?;

            if existing.is_some() {
                report.existing.push(role_name.as_str().to_string());
                continue;
            }

            let new_role = role::ActiveModel {
                name: Set(role_name.as_str().to_string()),
                created_at: Set(Utc::now().timestamp()),
                ..Default::default()
            };
            new_role
                .insert(&self.db)
                .await
                .map_err(|e| InternalError::database("seed_roles_insert", e))?;

            info!(role = role_name.as_str(), "Seeded role");
            report.created.push(role_name.as_str().to_string());
        }

        Ok(report)
    }

    /// Roles offered in the create/edit form: everything except super-admin,
    /// in catalog insertion order. An empty result means the catalog was
    /// never seeded, which is a deployment fault rather than an empty list.
    pub async fn list_assignable(&self) -> Result<Vec<role::Model>, InternalError> {
        let roles = role::Entity::find()
            .filter(role::Column::Name.ne(RoleName::SuperAdmin.as_str()))
            .order_by_asc(role::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| InternalError::database("list_assignable", e))?;

        if roles.is_empty() {
            return Err(RoleError::CatalogMissing.into());
        }
        Ok(roles)
    }

    /// Resolve a role id submitted by the form, refusing ids that do not
    /// exist or that name a role the workflow may not assign.
    pub async fn find_assignable(&self, role_id: i32) -> Result<Option<role::Model>, InternalError> {
        let found = role::Entity::find_by_id(role_id)
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("find_assignable", e))?;

        match found {
            Some(model) if model.name != RoleName::SuperAdmin.as_str() => Ok(Some(model)),
            _ => Ok(None),
        }
    }

    pub async fn find_by_name(&self, name: RoleName) -> Result<Option<role::Model>, InternalError> {
        role::Entity::find()
            .filter(role::Column::Name.eq(name.as_str()))
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("find_by_name", e))
    }
}

impl std::fmt::Debug for RoleStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoleStore").field("db", &"<connection>").finish()
    }
}
