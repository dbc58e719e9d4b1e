use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::permissions::Role;

/// Administrative mutation recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AdminAction {
    UpdatePermissions,
    UpdateRole,
    DeactivateUser,
    ActivateUser,
}

impl AdminAction {
    pub const fn as_str(self) -> &'static str {
        match self {
            AdminAction::UpdatePermissions => "update_permissions",
            AdminAction::UpdateRole => "update_role",
            AdminAction::DeactivateUser => "deactivate_user",
            AdminAction::ActivateUser => "activate_user",
        }
    }

    /// Whether an actor may never take this action on their own profile,
    /// given the profile's current role.
    pub const fn forbidden_on_self(self, target_role: Role) -> bool {
        match self {
            AdminAction::UpdatePermissions => matches!(target_role, Role::Admin),
            AdminAction::UpdateRole | AdminAction::DeactivateUser => true,
            AdminAction::ActivateUser => false,
        }
    }
}

impl fmt::Display for AdminAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AdminAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "update_permissions" => Ok(AdminAction::UpdatePermissions),
            "update_role" => Ok(AdminAction::UpdateRole),
            "deactivate_user" => Ok(AdminAction::DeactivateUser),
            "activate_user" => Ok(AdminAction::ActivateUser),
            other => Err(format!("unknown admin action '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names_match_as_str() {
        for action in [
            AdminAction::UpdatePermissions,
            AdminAction::UpdateRole,
            AdminAction::DeactivateUser,
            AdminAction::ActivateUser,
        ] {
            let json = serde_json::to_string(&action).unwrap();
            assert_eq!(json, format!("\"{}\"", action.as_str()));
            assert_eq!(action.as_str().parse::<AdminAction>().unwrap(), action);
        }
    }

    #[test]
    fn test_forbidden_on_self_depends_on_role_only_for_permissions() {
        assert!(AdminAction::UpdatePermissions.forbidden_on_self(Role::Admin));
        assert!(!AdminAction::UpdatePermissions.forbidden_on_self(Role::Employee));
        for role in [Role::Admin, Role::Employee] {
            assert!(AdminAction::UpdateRole.forbidden_on_self(role));
            assert!(AdminAction::DeactivateUser.forbidden_on_self(role));
            assert!(!AdminAction::ActivateUser.forbidden_on_self(role));
        }
    }
}
