//! Pure per-field validation for the create/edit user form.
//!
//! Field rules only; uniqueness and role-existence checks need the database
//! and are layered on by the manage-users coordinator, which merges them
//! into the same per-field failure before deciding the draft's fate.

use crate::errors::internal::ValidationFailure;
use crate::types::internal::draft::UserDraft;

pub const MAX_NAME_LENGTH: usize = 255;
pub const MAX_USERNAME_LENGTH: usize = 255;
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Validate a draft for user creation. Password is required.
pub fn validate_create(draft: &UserDraft) -> ValidationFailure {
    let mut failure = validate_common(draft);

    if draft.password.is_empty() {
        failure.add("password", "The password field is required.");
    } else if draft.password.chars().count() < MIN_PASSWORD_LENGTH {
        failure.add("password", "The password must be at least 8 characters.");
    }

    failure
}

/// Validate a draft for user update. A blank password means "leave
/// unchanged"; a non-blank one must still meet the minimum length.
pub fn validate_update(draft: &UserDraft) -> ValidationFailure {
    let mut failure = validate_common(draft);

    if !draft.password.is_empty() && draft.password.chars().count() < MIN_PASSWORD_LENGTH {
        failure.add("password", "The password must be at least 8 characters.");
    }

    failure
}

fn validate_common(draft: &UserDraft) -> ValidationFailure {
    let mut failure = ValidationFailure::new();

    if draft.name.trim().is_empty() {
        failure.add("name", "The name field is required.");
    } else if draft.name.chars().count() > MAX_NAME_LENGTH {
        failure.add("name", "The name may not be greater than 255 characters.");
    }

    if draft.username.trim().is_empty() {
        failure.add("username", "The username field is required.");
    } else if draft.username.chars().count() > MAX_USERNAME_LENGTH {
        failure.add("username", "The username may not be greater than 255 characters.");
    }

    if draft.email.trim().is_empty() {
        failure.add("email", "The email field is required.");
    } else if !is_valid_email(&draft.email) {
        failure.add("email", "The email must be a valid email address.");
    }

    if draft.role_id.is_none() {
        failure.add("role_id", "The role field is required.");
    }

    failure
}

/// Minimal structural email check: exactly one '@', non-empty local part,
/// and a domain with an interior dot.
pub fn is_valid_email(email: &str) -> bool {
    let mut parts = email.split('@');
    let (local, domain) = match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => (local, domain),
        _ => return false,
    };

    if local.is_empty() || domain.is_empty() || email.contains(char::is_whitespace) {
        return false;
    }

    match domain.rfind('.') {
        Some(dot) => dot > 0 && dot < domain.len() - 1,
        None => false,
    }
}
