//! Audit trail for administrative profile mutations.
//!
//! Entries are append-only: once written they are never updated or deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shiftdesk_core::{AdminAction, Permission, PermissionSet, Role};
use utoipa::ToSchema;

use crate::ids::{AuditEntryId, BusinessId, UserId};

/// Old and new value of whatever field an action changed.
///
/// Serialized without a tag; the field names identify the shape
/// (`old_custom_permissions`, `old_role` or `old_is_active`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum AuditChanges {
    Permissions {
        #[schema(value_type = Vec<Permission>)]
        old_custom_permissions: PermissionSet,
        #[schema(value_type = Vec<Permission>)]
        new_custom_permissions: PermissionSet,
    },
    Role {
        old_role: Role,
        new_role: Role,
    },
    Activation {
        old_is_active: bool,
        new_is_active: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AuditEntry {
    pub id: AuditEntryId,
    pub business_id: BusinessId,
    pub admin_id: UserId,
    pub target_user_id: UserId,
    pub action: AdminAction,
    pub changes: AuditChanges,
    pub created_at: DateTime<Utc>,
}

/// An entry not yet persisted; the store assigns id and timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAuditEntry {
    pub business_id: BusinessId,
    pub admin_id: UserId,
    pub target_user_id: UserId,
    pub action: AdminAction,
    pub changes: AuditChanges,
}

impl NewAuditEntry {
    pub fn into_entry(self, id: AuditEntryId, created_at: DateTime<Utc>) -> AuditEntry {
        AuditEntry {
            id,
            business_id: self.business_id,
            admin_id: self.admin_id,
            target_user_id: self.target_user_id,
            action: self.action,
            changes: self.changes,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_changes_serialize_flat() {
        let changes = AuditChanges::Role {
            old_role: Role::Employee,
            new_role: Role::Admin,
        };
        assert_eq!(
            serde_json::to_value(&changes).unwrap(),
            json!({"old_role": "employee", "new_role": "admin"})
        );

        let changes = AuditChanges::Permissions {
            old_custom_permissions: PermissionSet::new(),
            new_custom_permissions: [Permission::EditSchedule].into_iter().collect(),
        };
        assert_eq!(
            serde_json::to_value(&changes).unwrap(),
            json!({"old_custom_permissions": [], "new_custom_permissions": ["edit_schedule"]})
        );
    }

    #[test]
    fn test_changes_deserialize_by_shape() {
        let changes: AuditChanges =
            serde_json::from_value(json!({"old_is_active": true, "new_is_active": false}))
                .unwrap();
        assert_eq!(
            changes,
            AuditChanges::Activation {
                old_is_active: true,
                new_is_active: false
            }
        );
    }
}
