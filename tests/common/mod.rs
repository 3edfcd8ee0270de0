//! Shared setup for integration tests: an in-memory database with migrations
//! and the role catalog applied, wired into the full application stack.

use std::sync::Arc;

use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};

use rewire_backend::app_data::AppData;
use rewire_backend::config::settings::AppSettings;
use rewire_backend::services::crypto;
use rewire_backend::stores::user_store::CreateUserRecord;
use rewire_backend::types::internal::role_name::RoleName;

pub const TEST_PEPPER: &str = "integration-test-pepper-secret";
pub const TEST_PASSWORD: &str = "password123";

pub struct TestContext {
    pub db: DatabaseConnection,
    pub data: Arc<AppData>,
}

pub async fn setup() -> TestContext {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");
    Migrator::up(&db, None).await.expect("Failed to run migrations");

    let settings = AppSettings {
        database_url: "sqlite::memory:".to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
        jwt_secret: "integration-secret-key-32-chars-xx".to_string(),
        session_token_secret: "integration-session-secret-32-xx".to_string(),
        password_pepper: TEST_PEPPER.to_string(),
    };
    let data = Arc::new(AppData::init(db.clone(), &settings));
    data.role_store.seed_roles().await.expect("Failed to seed roles");

    TestContext { db, data }
}

impl TestContext {
    pub async fn role_id(&self, name: RoleName) -> i32 {
        self.data
            .role_store
            .find_by_name(name)
            .await
            .expect("role query failed")
            .expect("role missing")
            .id
    }

    pub async fn seed_user(&self, username: &str, role: RoleName, is_active: bool) -> String {
        let role_id = self.role_id(role).await;
        let password_hash =
            crypto::hash_password(TEST_PASSWORD, TEST_PEPPER).expect("hashing failed");

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
}
