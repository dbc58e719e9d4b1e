//! User profiles and the administrative mutations applied to them.

use serde::{Deserialize, Serialize};
use shiftdesk_core::{
    AdminAction, DomainError, Permission, PermissionCatalog, PermissionInfo, PermissionSet, Role,
    Subject,
};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::audit::AuditChanges;
use crate::ids::{BusinessId, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserProfile {
    pub id: UserId,
    pub business_id: BusinessId,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub role: Role,
    #[schema(value_type = Vec<Permission>)]
    pub custom_permissions: PermissionSet,
    pub is_active: bool,
}

impl UserProfile {
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or("Unknown")
    }
}

impl Subject for UserProfile {
    fn role(&self) -> Role {
        self.role
    }

    fn is_active(&self) -> bool {
        self.is_active
    }

    fn custom_permissions(&self) -> &PermissionSet {
        &self.custom_permissions
    }
}

/// A single administrative change to a profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileMutation {
    CustomPermissions(PermissionSet),
    Role(Role),
    Active(bool),
}

impl ProfileMutation {
    pub fn action(&self) -> AdminAction {
        match self {
            ProfileMutation::CustomPermissions(_) => AdminAction::UpdatePermissions,
            ProfileMutation::Role(_) => AdminAction::UpdateRole,
            ProfileMutation::Active(true) => AdminAction::ActivateUser,
            ProfileMutation::Active(false) => AdminAction::DeactivateUser,
        }
    }

    /// The profile as it looks after the mutation.
    pub fn apply(&self, prior: &UserProfile) -> UserProfile {
        let mut next = prior.clone();
        match self {
            ProfileMutation::CustomPermissions(set) => next.custom_permissions = set.clone(),
            ProfileMutation::Role(role) => next.role = *role,
            ProfileMutation::Active(active) => next.is_active = *active,
        }
        next
    }

    /// Rejects actions an actor may not take on their own profile. `target`
    /// must be the current row, read under the same lock as the write.
    pub fn check_actor(&self, actor_id: UserId, target: &UserProfile) -> Result<(), DomainError> {
        let action = self.action();
        if actor_id == target.id && action.forbidden_on_self(target.role) {
            return Err(DomainError::SelfModificationForbidden { action });
        }
        Ok(())
    }

    /// Old/new values for the audit entry. Recorded even when nothing changes.
    pub fn audit_changes(&self, prior: &UserProfile) -> AuditChanges {
        match self {
            ProfileMutation::CustomPermissions(set) => AuditChanges::Permissions {
                old_custom_permissions: prior.custom_permissions.clone(),
                new_custom_permissions: set.clone(),
            },
            ProfileMutation::Role(role) => AuditChanges::Role {
                old_role: prior.role,
                new_role: *role,
            },
            ProfileMutation::Active(active) => AuditChanges::Activation {
                old_is_active: prior.is_active,
                new_is_active: *active,
            },
        }
    }
}

// Responses

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserPermissionsResponse {
    pub user_id: UserId,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub role: Role,
    pub custom_permissions: Vec<Permission>,
    pub all_permissions: Vec<Permission>,
    pub is_active: bool,
}

impl UserPermissionsResponse {
    pub fn from_profile(profile: &UserProfile, catalog: &PermissionCatalog) -> Self {
        Self {
            user_id: profile.id,
            full_name: profile.full_name.clone(),
            email: profile.email.clone(),
            role: profile.role,
            custom_permissions: profile.custom_permissions.iter().copied().collect(),
            all_permissions: catalog.resolve(profile).into_iter().collect(),
            is_active: profile.is_active,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PermissionCatalogResponse {
    pub permissions: Vec<PermissionInfo>,
    pub employee_defaults: Vec<Permission>,
}

impl PermissionCatalogResponse {
    pub fn from_catalog(catalog: &PermissionCatalog) -> Self {
        Self {
            permissions: catalog.describe(),
            employee_defaults: catalog
                .role_defaults(Role::Employee)
                .iter()
                .copied()
                .collect(),
        }
    }
}

// DTOs

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AuditQuery {
    /// Only entries targeting this user.
    #[param(value_type = Option<String>)]
    pub user_id: Option<UserId>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUserPermissionsDto {
    /// Replaces the user's custom grants. Duplicates collapse.
    #[validate(length(max = 64, message = "Too many permissions"))]
    pub custom_permissions: Vec<Permission>,
}

impl UpdateUserPermissionsDto {
    pub fn into_set(self) -> PermissionSet {
        self.custom_permissions.into_iter().collect()
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRoleDto {
    pub role: Role,
}
