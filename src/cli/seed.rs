use crate::app_data::AppData;
use crate::errors::internal::RoleError;
use crate::errors::InternalError;
use crate::services::crypto;
use crate::stores::user_store::CreateUserRecord;
use crate::types::internal::role_name::RoleName;

/// Ensure the role catalog exists. Safe to run on every startup.
pub async fn seed_roles(app_data: &AppData) -> Result<(), InternalError> {
    let report = app_data.role_store.seed_roles().await?;

    if report.created.is_empty() {
        tracing::info!("Role catalog already seeded");
    } else {
        tracing::info!(created = ?report.created, "Role catalog seeded");
    }
    Ok(())
}

/// Create one demo account per role with generated passwords, printed once
/// to stdout. Accounts that already exist are left alone, so re-running the
/// seed never resets a password.
pub async fn seed_demo_users(app_data: &AppData, password_pepper: &str) -> Result<(), InternalError> {
    let demo = [
        ("superadmin", RoleName::SuperAdmin),
        ("admin", RoleName::Admin),
        ("user", RoleName::User),
    ];

    for (username, role_name) in demo {
        if app_data.user_store.username_taken(username, None).await? {
            println!("Demo account '{username}' already exists, skipping");
            continue;
        }

        let role = app_data
            .role_store
            .find_by_name(role_name)
            .await?
            .ok_or(RoleError::CatalogMissing)?;

        let password = crypto::generate_secure_password();
        let password_hash = crypto::hash_password(&password, password_pepper)?;

        app_data
            .user_store
            .create_user(CreateUserRecord {
                name: format!("Demo {}", role_name.as_str()),
                username: username.to_string(),
                email: format!("{username}@example.com"),
                password_hash,
                role_id: role.id,
                is_active: true,
            })
            .await?;

        println!("Created demo account '{username}' ({}) password: {password}", role_name.as_str());
    }

    Ok(())
}
