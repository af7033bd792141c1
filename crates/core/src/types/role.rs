//! Account roles.

use serde::{Deserialize, Serialize};

/// Role attached to an authenticated account.
///
/// Roles are checked at the HTTP boundary and travel in the session; they
/// are never stored in the storefront schema. Pricing never looks at them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Places orders and sees their own history.
    #[default]
    Customer,
    /// Kitchen and counter staff.
    Staff,
    /// Runs a single branch, including its promotions.
    BranchManager,
    /// Full access.
    Admin,
}

impl Role {
    /// Whether this role may create, list and toggle promo codes.
    #[must_use]
    pub const fn can_manage_promotions(self) -> bool {
        matches!(self, Self::BranchManager | Self::Admin)
    }

    /// Whether this role belongs to restaurant personnel.
    #[must_use]
    pub const fn is_staff(self) -> bool {
        !matches!(self, Self::Customer)
    }

    /// Wire name, as stored in the session.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Staff => "staff",
            Self::BranchManager => "branch_manager",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not a known role name.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid role: {0}")]
pub struct RoleParseError(pub String);

impl std::str::FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Self::Customer),
            "staff" => Ok(Self::Staff),
            "branch_manager" => Ok(Self::BranchManager),
            "admin" => Ok(Self::Admin),
            _ => Err(RoleParseError(s.to_owned())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_parse_agree() {
        for role in [Role::Customer, Role::Staff, Role::BranchManager, Role::Admin] {
            assert_eq!(role.to_string().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn test_parse_unknown() {
        let err = "owner".parse::<Role>().unwrap_err();
        assert_eq!(err.to_string(), "invalid role: owner");
    }

    #[test]
    fn test_promotion_permissions() {
        assert!(!Role::Customer.can_manage_promotions());
        assert!(!Role::Staff.can_manage_promotions());
        assert!(Role::BranchManager.can_manage_promotions());
        assert!(Role::Admin.can_manage_promotions());
    }

    #[test]
    fn test_staff_roles() {
        assert!(!Role::Customer.is_staff());
        assert!(Role::Staff.is_staff());
        assert!(Role::Admin.is_staff());
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&Role::BranchManager).unwrap();
        assert_eq!(json, "\"branch_manager\"");
    }
}
