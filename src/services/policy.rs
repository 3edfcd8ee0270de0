//! Authorization policy for user management.
//!
//! Pure functions of (actor, target) with no side effects and no I/O.
//! Evaluation runs in three stages:
//!
//! 1. Hard denials - action-specific rules that block regardless of any
//!    grant, including the super-admin allowance. Held as data so they are
//!    independent of actor role and always evaluated first.
//! 2. Super-admin allowance - if no hard denial fired, a super-admin actor
//!    is granted the action.
//! 3. Role-specific rules - admins may act on plain users; everyone else is
//!    denied.
//!
//! Denial is a plain `false`, never an error. Callers that need a hard
//! failure (the HTTP boundary) translate `false` into a 403.

use crate::types::internal::actor::Actor;
use crate::types::internal::role_name::RoleName;

/// Policy-relevant actions against a target user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    View,
    Update,
    Delete,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::View => "view",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }
}

/// The user record an operation is performed against, reduced to the fields
/// the policy needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyTarget {
    pub id: String,
    pub role: RoleName,
}

impl PolicyTarget {
    pub fn new(id: impl Into<String>, role: RoleName) -> Self {
        Self { id: id.into(), role }
    }
}

type DenialCheck = fn(&Actor, &PolicyTarget) -> bool;

fn deny_self_delete(actor: &Actor, target: &PolicyTarget) -> bool {
    actor.id == target.id
}

fn deny_delete_super_admin(_actor: &Actor, target: &PolicyTarget) -> bool {
    target.role == RoleName::SuperAdmin
}

fn deny_update_other_super_admin(actor: &Actor, target: &PolicyTarget) -> bool {
    target.role == RoleName::SuperAdmin && actor.id != target.id
}

/// Hard denials, evaluated before any grant. Order is irrelevant; any match
/// denies.
const HARD_DENIALS: &[(Action, DenialCheck)] = &[
    (Action::Delete, deny_self_delete),
    (Action::Delete, deny_delete_super_admin),
    (Action::Update, deny_update_other_super_admin),
];

fn hard_denied(action: Action, actor: &Actor, target: &PolicyTarget) -> bool {
    HARD_DENIALS
        .iter()
        .any(|(denied_action, check)| *denied_action == action && check(actor, target))
}

/// Evaluate whether `actor` may perform `action` against `target`.
pub fn authorize(action: Action, actor: &Actor, target: &PolicyTarget) -> bool {
    if hard_denied(action, actor, target) {
        return false;
    }

    if actor.role == RoleName::SuperAdmin {
        return true;
    }

    match action {
        Action::Update | Action::Delete => {
            actor.role == RoleName::Admin && target.role == RoleName::User
        }
        // Row-level view grants nothing beyond the directory itself, which
        // is gated by `can_manage_users` at the route boundary.
        Action::View => false,
    }
}

pub fn can_update(actor: &Actor, target: &PolicyTarget) -> bool {
    authorize(Action::Update, actor, target)
}

pub fn can_delete(actor: &Actor, target: &PolicyTarget) -> bool {
    authorize(Action::Delete, actor, target)
}

pub fn can_view(actor: &Actor, target: &PolicyTarget) -> bool {
    authorize(Action::View, actor, target)
}

/// Blanket view-any is never granted; listing access is the route guard's
/// decision, not a per-target policy one.
pub fn can_view_any(_actor: &Actor) -> bool {
    false
}

/// Route guard for the user management surface: super-admin or admin only.
pub fn can_manage_users(actor: &Actor) -> bool {
    matches!(actor.role, RoleName::SuperAdmin | RoleName::Admin)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(id: &str, role: RoleName) -> Actor {
        Actor::new(id, role)
    }

    fn target(id: &str, role: RoleName) -> PolicyTarget {
        PolicyTarget::new(id, role)
    }

    #[test]
    fn test_admin_can_update_and_delete_plain_users() {
        let admin = actor("admin-1", RoleName::Admin);
        let user = target("user-1", RoleName::User);

        assert!(can_update(&admin, &user));
        assert!(can_delete(&admin, &user));
    }

    #[test]
    fn test_admin_cannot_touch_admins_or_super_admins() {
        let admin = actor("admin-1", RoleName::Admin);
        let other_admin = target("admin-2", RoleName::Admin);
        let super_admin = target("root-1", RoleName::SuperAdmin);

        assert!(!can_update(&admin, &other_admin));
        assert!(!can_update(&admin, &super_admin));
        assert!(!can_delete(&admin, &other_admin));
        assert!(!can_delete(&admin, &super_admin));
    }

    #[test]
    fn test_no_self_delete_for_any_role() {
        for role in [RoleName::SuperAdmin, RoleName::Admin, RoleName::User] {
            let me = actor("me", role);
            let me_as_target = target("me", role);
            assert!(!can_delete(&me, &me_as_target), "self-delete allowed for {}", role);
        }
    }

    #[test]
    fn test_super_admin_may_edit_itself_but_not_peers() {
        let root = actor("root-1", RoleName::SuperAdmin);
        let self_target = target("root-1", RoleName::SuperAdmin);
        let peer = target("root-2", RoleName::SuperAdmin);

        assert!(can_update(&root, &self_target));
        assert!(!can_update(&root, &peer));
        assert!(!can_delete(&root, &peer));
    }

    #[test]
    fn test_super_admin_allowance_covers_admins_and_users() {
        let root = actor("root-1", RoleName::SuperAdmin);

        assert!(can_update(&root, &target("admin-1", RoleName::Admin)));
        assert!(can_update(&root, &target("user-1", RoleName::User)));
        assert!(can_delete(&root, &target("admin-1", RoleName::Admin)));
        assert!(can_delete(&root, &target("user-1", RoleName::User)));
        assert!(can_view(&root, &target("user-1", RoleName::User)));
    }

    #[test]
    fn test_plain_users_can_do_nothing() {
        let user = actor("user-1", RoleName::User);
        let other = target("user-2", RoleName::User);

        assert!(!can_update(&user, &other));
        assert!(!can_delete(&user, &other));
        assert!(!can_view(&user, &other));
    }

    #[test]
    fn test_view_any_is_never_granted() {
        for role in [RoleName::SuperAdmin, RoleName::Admin, RoleName::User] {
            assert!(!can_view_any(&actor("a", role)));
        }
    }

    #[test]
    fn test_route_guard_admits_admins_only() {
        assert!(can_manage_users(&actor("a", RoleName::SuperAdmin)));
        assert!(can_manage_users(&actor("a", RoleName::Admin)));
        assert!(!can_manage_users(&actor("a", RoleName::User)));
    }
}
