//! Shared helpers for unit tests: an in-memory database with migrations and
//! the role catalog applied, plus factories for users and tokens.

use std::sync::Arc;

use migration::{Migrator, MigratorTrait};
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};

use crate::app_data::AppData;
use crate::config::settings::AppSettings;
use crate::services::crypto;
use crate::stores::user_store::CreateUserRecord;
use crate::types::db::user;
use crate::types::internal::role_name::RoleName;

pub const TEST_PEPPER: &str = "test-pepper-minimum-length-secret";
pub const TEST_PASSWORD: &str = "password123";

pub struct TestApp {
    pub db: DatabaseConnection,
    pub data: Arc<AppData>,
}

impl TestApp {
    pub async fn new() -> Self {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to create test database");
        Migrator::up(&db, None).await.expect("Failed to run migrations");

        let settings = AppSettings {
            database_url: "sqlite::memory:".to_string(),
            bind_addr: "127.0.0.1:0".to_string(),
            jwt_secret: "test-secret-key-minimum-32-characters-long".to_string(),
            session_token_secret: "test-session-secret-minimum-32-chars".to_string(),
            password_pepper: TEST_PEPPER.to_string(),
        };
        let data = Arc::new(AppData::init(db.clone(), &settings));
        data.role_store.seed_roles().await.expect("Failed to seed roles");

        Self { db, data }
    }

    pub async fn role_id(&self, name: RoleName) -> i32 {
        self.data
            .role_store
            .find_by_name(name)
            .await
            .expect("role query failed")
            .expect("role missing")
            .id
    }

    /// Create a user with the shared test password.
    pub async fn seed_user(&self, username: &str, role: RoleName, is_active: bool) -> String {
        self.seed_user_with_password(username, TEST_PASSWORD, role, is_active)
            .await
    }

    pub async fn seed_user_with_password(
        &self,
        username: &str,
        password: &str,
        role: RoleName,
        is_active: bool,
    ) -> String {
        let role_id = self.role_id(role).await;
        let password_hash = crypto::hash_password(password, TEST_PEPPER).expect("hashing failed");

        self.data
            .user_store
            .create_user(CreateUserRecord {
                name: username.to_string(),
                username: username.to_string(),
                email: format!("{username}@example.com"),
                password_hash,
                role_id,
                is_active,
            })
            .await
            .expect("seed user failed")
    }

    pub fn jwt(&self, user_id: &str) -> String {
        self.data
            .token_service
            .generate_jwt(user_id)
            .expect("jwt generation failed")
    }

    /// Flip a user's active flag off directly, bypassing the workflow.
    pub async fn deactivate(&self, user_id: &str) {
        let changes = user::ActiveModel {
            id: Set(user_id.to_string()),
            is_active: Set(false),
            ..Default::default()
        };
        changes.update(&self.db).await.expect("deactivation failed");
    }
}
