use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::settings::AppSettings;
use crate::coordinators::ManageUsersCoordinator;
use crate::services::{DraftRegistry, TokenService};
use crate::stores::{CredentialStore, RoleStore, UserStore};

/// Centralized application data following the main-owned stores pattern.
///
/// All stores and services are created once in main.rs and shared across the
/// API surfaces, so there is exactly one of each per process.
pub struct AppData {
    pub db: DatabaseConnection,
    pub user_store: Arc<UserStore>,
    pub role_store: Arc<RoleStore>,
    pub credential_store: Arc<CredentialStore>,
    pub token_service: Arc<TokenService>,
    pub draft_registry: Arc<DraftRegistry>,
    pub manage_users: Arc<ManageUsersCoordinator>,
}

impl AppData {
    /// Wire up all stores and services. The database must be connected and
    /// migrated before this is called.
    pub fn init(db: DatabaseConnection, settings: &AppSettings) -> Self {
        tracing::debug!("Creating stores...");
        let user_store = Arc::new(UserStore::new(db.clone()));
        let role_store = Arc::new(RoleStore::new(db.clone()));
        let credential_store = Arc::new(CredentialStore::new(
            db.clone(),
            settings.password_pepper.clone(),
        ));
        let token_service = Arc::new(TokenService::new(
            settings.jwt_secret.clone(),
            settings.session_token_secret.clone(),
        ));
        let draft_registry = Arc::new(DraftRegistry::new());

        let manage_users = Arc::new(ManageUsersCoordinator::new(
            Arc::clone(&user_store),
            Arc::clone(&role_store),
            Arc::clone(&draft_registry),
            settings.password_pepper.clone(),
        ));
        tracing::debug!("Stores created");

        Self {
            db,
            user_store,
            role_store,
            credential_store,
            token_service,
            draft_registry,
            manage_users,
        }
    }
}
