use std::fmt;

/// The fixed role hierarchy. Variant order is ascending precedence so the
/// derived `Ord` gives super-admin > admin > user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RoleName {
    User,
    Admin,
    SuperAdmin,
}

/// Seeding order: highest precedence first, matching catalog creation order.
pub const ROLE_CATALOG: [RoleName; 3] = [RoleName::SuperAdmin, RoleName::Admin, RoleName::User];

impl RoleName {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleName::SuperAdmin => "super-admin",
            RoleName::Admin => "admin",
            RoleName::User => "user",
        }
    }

    /// Parse a stored role name. Returns `None` for anything outside the
    /// catalog, which callers treat as a corrupt role catalog.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "super-admin" => Some(RoleName::SuperAdmin),
            "admin" => Some(RoleName::Admin),
            "user" => Some(RoleName::User),
            _ => None,
        }
    }

    /// Roles offered by the create/edit workflow. Super-admin exists
    /// structurally but is never assignable through user management.
    pub fn is_assignable(&self) -> bool {
        !matches!(self, RoleName::SuperAdmin)
    }
}

impl fmt::Display for RoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_precedence_order() {
        assert!(RoleName::SuperAdmin > RoleName::Admin);
        assert!(RoleName::Admin > RoleName::User);
    }

    #[test]
    fn test_parse_round_trip() {
        for role in ROLE_CATALOG {
            assert_eq!(RoleName::parse(role.as_str()), Some(role));
        }
        assert_eq!(RoleName::parse("owner"), None);
    }

    #[test]
    fn test_super_admin_is_not_assignable() {
        assert!(!RoleName::SuperAdmin.is_assignable());
        assert!(RoleName::Admin.is_assignable());
        assert!(RoleName::User.is_assignable());
    }
}
