//! End-to-end tests for the user management workflow, driven through the
//! coordinator the way the HTTP surface drives it.

mod common;

use rewire_backend::api::helpers::resolve_actor;
use rewire_backend::coordinators::manage_users::UpdateOutcome;
use rewire_backend::errors::internal::{CredentialError, UserError, ValidationFailure};
use rewire_backend::errors::InternalError;
use rewire_backend::types::internal::actor::Actor;
use rewire_backend::types::internal::draft::UserDraft;
use rewire_backend::types::internal::role_name::RoleName;

use common::{setup, TestContext, TEST_PASSWORD};

async fn actor_for(ctx: &TestContext, user_id: &str) -> Actor {
    resolve_actor(&ctx.data, &ctx.jwt(user_id))
        .await
        .expect("actor resolution failed")
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

fn unwrap_validation(err: InternalError) -> ValidationFailure {
    match err {
        InternalError::Validation(failure) => failure,
        other => panic!("expected validation failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_full_lifecycle_create_update_delete() {
    let ctx = setup().await;
    let root_id = ctx.seed_user("root", RoleName::SuperAdmin, true).await;
    let root = actor_for(&ctx, &root_id).await;
    let user_role = ctx.role_id(RoleName::User).await;
    let admin_role = ctx.role_id(RoleName::Admin).await;

    // Super-admin creates an admin, the admin creates a user.
    let admin_row = ctx
        .data
        .manage_users
        .create(&root, draft("staff", admin_role))
        .await
        .expect("create admin failed");
    let admin = actor_for(&ctx, &admin_row.id).await;
    assert_eq!(admin.role, RoleName::Admin);

    let member = ctx
        .data
        .manage_users
        .create(&admin, draft("member", user_role))
        .await
        .expect("create user failed");

    // Edit and commit.
    let mut edit = ctx
        .data
        .manage_users
        .begin_edit(&admin, &member.id)
        .await
        .expect("begin edit failed");
    edit.name = "Renamed Member".to_string();
    let outcome = ctx
        .data
        .manage_users
        .update_by_id(&admin, &member.id, edit)
        .await
        .expect("update failed");
    match outcome {
        UpdateOutcome::Committed(row) => assert_eq!(row.name, "Renamed Member"),
        UpdateOutcome::NoTarget => panic!("expected a committed update"),
    }

    // Delete, then confirm the directory no longer lists them.
    ctx.data
        .manage_users
        .delete(&admin, &member.id)
        .await
        .expect("delete failed");
    let page = ctx
        .data
        .manage_users
        .list_users(&admin, "member", 1)
        .await
        .expect("list failed");
    assert_eq!(page.total_items, 0);
}

#[tokio::test]
async fn test_admin_cannot_touch_admins_but_super_admin_can() {
    let ctx = setup().await;
    let admin_id = ctx.seed_user("admin1", RoleName::Admin, true).await;
    let other_admin_id = ctx.seed_user("admin2", RoleName::Admin, true).await;
    let root_id = ctx.seed_user("root", RoleName::SuperAdmin, true).await;

    let admin = actor_for(&ctx, &admin_id).await;
    let root = actor_for(&ctx, &root_id).await;

    let err = ctx
        .data
        .manage_users
        .delete(&admin, &other_admin_id)
        .await
        .expect_err("expected denial");
    assert!(matches!(err, InternalError::Authorization(_)));

    ctx.data
        .manage_users
        .delete(&root, &other_admin_id)
        .await
        .expect("super-admin delete failed");
}

#[tokio::test]
async fn test_super_admins_are_untouchable_and_unlisted() {
    let ctx = setup().await;
    let root_id = ctx.seed_user("root", RoleName::SuperAdmin, true).await;
    let other_root_id = ctx.seed_user("root2", RoleName::SuperAdmin, true).await;
    let admin_role = ctx.role_id(RoleName::Admin).await;

    let root = actor_for(&ctx, &root_id).await;

    // Even a super-admin cannot update or delete another super-admin.
    let err = ctx
        .data
        .manage_users
        .update_by_id(&root, &other_root_id, draft("root2", admin_role))
        .await
        .expect_err("expected denial");
    assert!(matches!(err, InternalError::Authorization(_)));

    let err = ctx
        .data
        .manage_users
        .delete(&root, &other_root_id)
        .await
        .expect_err("expected denial");
    assert!(matches!(err, InternalError::Authorization(_)));

    // And neither of them appears in the directory.
    let page = ctx
        .data
        .manage_users
        .list_users(&root, "", 1)
        .await
        .expect("list failed");
    assert_eq!(page.total_items, 0);
}

#[tokio::test]
async fn test_update_after_target_vanishes_is_a_noop() {
    let ctx = setup().await;
    let admin_id = ctx.seed_user("admin1", RoleName::Admin, true).await;
    let victim_id = ctx.seed_user("victim", RoleName::User, true).await;
    let user_role = ctx.role_id(RoleName::User).await;

    let admin = actor_for(&ctx, &admin_id).await;

    ctx.data
        .manage_users
        .begin_edit(&admin, &victim_id)
        .await
        .expect("begin edit failed");
    ctx.data
        .manage_users
        .delete(&admin, &victim_id)
        .await
        .expect("delete failed");

    let outcome = ctx
        .data
        .manage_users
        .update_by_id(&admin, &victim_id, draft("victim", user_role))
        .await
        .expect("expected a no-op");
    assert!(matches!(outcome, UpdateOutcome::NoTarget));
}

#[tokio::test]
async fn test_deactivation_gate_cuts_sessions_immediately() {
    let ctx = setup().await;
    let admin_id = ctx.seed_user("admin1", RoleName::Admin, true).await;
    let member_id = ctx.seed_user("member", RoleName::User, true).await;
    let user_role = ctx.role_id(RoleName::User).await;

    // The member signs in and holds a live session token.
    let member = ctx
        .data
        .credential_store
        .verify_credentials("member", TEST_PASSWORD)
        .await
        .expect("login failed");
    let session_token = ctx.data.token_service.generate_session_token();
    let hash = ctx.data.token_service.hash_session_token(&session_token);
    ctx.data
        .credential_store
        .store_session_token(
            hash.clone(),
            member.id.clone(),
            ctx.data.token_service.session_expiration(),
        )
        .await
        .expect("session store failed");
    let member_jwt = ctx.jwt(&member.id);

    // An admin deactivates the account through the workflow.
    let admin = actor_for(&ctx, &admin_id).await;
    let mut edit = ctx
        .data
        .manage_users
        .begin_edit(&admin, &member_id)
        .await
        .expect("begin edit failed");
    edit.is_active = false;
    edit.role_id = Some(user_role);
    let outcome = ctx
        .data
        .manage_users
        .update_by_id(&admin, &member_id, edit)
        .await
        .expect("update failed");
    assert!(matches!(outcome, UpdateOutcome::Committed(_)));

    // The member's next request is rejected with the deactivation error and
    // their sessions are revoked on the spot.
    let err = resolve_actor(&ctx.data, &member_jwt)
        .await
        .expect_err("expected rejection");
    assert!(matches!(
        err,
        InternalError::Credential(CredentialError::AccountDeactivated)
    ));

    let err = ctx
        .data
        .credential_store
        .validate_session_token(&hash)
        .await
        .expect_err("expected rejection");
    assert!(matches!(
        err,
        InternalError::Credential(CredentialError::InvalidSessionToken)
    ));

    // Signing in again fails too.
    let err = ctx
        .data
        .credential_store
        .verify_credentials("member", TEST_PASSWORD)
        .await
        .expect_err("expected rejection");
    assert!(matches!(
        err,
        InternalError::Credential(CredentialError::AccountDeactivated)
    ));
}

#[tokio::test]
async fn test_duplicate_email_on_update_changes_nothing() {
    let ctx = setup().await;
    let admin_id = ctx.seed_user("admin1", RoleName::Admin, true).await;
    let alice_id = ctx.seed_user("alice", RoleName::User, true).await;
    ctx.seed_user("bob", RoleName::User, true).await;
    let user_role = ctx.role_id(RoleName::User).await;

    let admin = actor_for(&ctx, &admin_id).await;

    let mut edit = ctx
        .data
        .manage_users
        .begin_edit(&admin, &alice_id)
        .await
        .expect("begin edit failed");
    edit.email = "bob@example.com".to_string();
    edit.role_id = Some(user_role);

    let failure = unwrap_validation(
        ctx.data
            .manage_users
            .update_by_id(&admin, &alice_id, edit)
            .await
            .expect_err("expected validation failure"),
    );
    assert_eq!(
        failure.message_for("email"),
        Some("The email has already been taken.")
    );

    // Alice's row is untouched.
    let alice = ctx
        .data
        .user_store
        .find_with_role(&alice_id)
        .await
        .expect("find failed")
        .expect("user missing");
    assert_eq!(alice.email, "alice@example.com");
}

#[tokio::test]
async fn test_keeping_your_own_email_on_update_is_fine() {
    let ctx = setup().await;
    let admin_id = ctx.seed_user("admin1", RoleName::Admin, true).await;
    let alice_id = ctx.seed_user("alice", RoleName::User, true).await;
    let user_role = ctx.role_id(RoleName::User).await;

    let admin = actor_for(&ctx, &admin_id).await;
    let mut edit = draft("alice", user_role);
    edit.password = String::new();

    let outcome = ctx
        .data
        .manage_users
        .update_by_id(&admin, &alice_id, edit)
        .await
        .expect("update failed");
    assert!(matches!(outcome, UpdateOutcome::Committed(_)));
}

#[tokio::test]
async fn test_directory_search_and_pagination() {
    let ctx = setup().await;
    let admin_id = ctx.seed_user("admin0", RoleName::Admin, true).await;
    for i in 1..=12 {
        ctx.seed_user(&format!("staffer{i:02}"), RoleName::User, true)
            .await;
    }
    ctx.seed_user("root", RoleName::SuperAdmin, true).await;

    let admin = actor_for(&ctx, &admin_id).await;

    // 13 visible users (12 staffers + the admin), never the super-admin.
    let first = ctx
        .data
        .manage_users
        .list_users(&admin, "", 1)
        .await
        .expect("list failed");
    assert_eq!(first.total_items, 13);
    assert_eq!(first.items.len(), 10);
    assert_eq!(first.page_size, 10);
    assert!(first.has_more);

    let second = ctx
        .data
        .manage_users
        .list_users(&admin, "", 2)
        .await
        .expect("list failed");
    assert_eq!(second.items.len(), 3);
    assert!(!second.has_more);

    // Case-insensitive match against username.
    let found = ctx
        .data
        .manage_users
        .list_users(&admin, "STAFFER03", 1)
        .await
        .expect("list failed");
    assert_eq!(found.total_items, 1);
    assert_eq!(found.items[0].username, "staffer03");
}

#[tokio::test]
async fn test_deleting_a_missing_user_is_not_found() {
    let ctx = setup().await;
    let admin_id = ctx.seed_user("admin1", RoleName::Admin, true).await;
    let admin = actor_for(&ctx, &admin_id).await;

    let err = ctx
        .data
        .manage_users
        .delete(&admin, "ghost")
        .await
        .expect_err("expected not found");
    assert!(matches!(err, InternalError::User(UserError::NotFound(_))));
}
