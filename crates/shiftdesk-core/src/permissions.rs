//! Permission catalog and resolution for Shiftdesk.
//!
//! Permissions and roles are closed enumerations. The set of permissions a
//! deployment knows about, together with the defaults granted to each role,
//! lives in a [`PermissionCatalog`] that is built once at startup and shared
//! read-only afterwards.
//!
//! # Example
//!
//! ```ignore
//! use shiftdesk_core::permissions::{Permission, PermissionCatalog};
//!
//! let catalog = PermissionCatalog::standard();
//! let effective = catalog.resolve(&profile);
//!
//! if effective.contains(&Permission::EditSchedule) {
//!     // Edit the schedule
//! }
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Ordered set of permissions. Ordering keeps API output and audit payloads stable.
pub type PermissionSet = BTreeSet<Permission>;

// =============================================================================
// Permission
// =============================================================================

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    ViewDashboard,
    EditDashboard,
    ViewInventory,
    EditInventory,
    GenerateOrders,
    ViewEmployees,
    EditEmployees,
    ManagePermissions,
    ViewSchedule,
    EditSchedule,
    GenerateSchedule,
    SetAvailability,
    ViewFinancials,
    EditFinancials,
    ViewReminders,
    EditReminders,
    SetReminders,
    EditBusiness,
}

impl Permission {
    /// Every permission, in declaration order.
    pub const ALL: [Permission; 18] = [
        Permission::ViewDashboard,
        Permission::EditDashboard,
        Permission::ViewInventory,
        Permission::EditInventory,
        Permission::GenerateOrders,
        Permission::ViewEmployees,
        Permission::EditEmployees,
        Permission::ManagePermissions,
        Permission::ViewSchedule,
        Permission::EditSchedule,
        Permission::GenerateSchedule,
        Permission::SetAvailability,
        Permission::ViewFinancials,
        Permission::EditFinancials,
        Permission::ViewReminders,
        Permission::EditReminders,
        Permission::SetReminders,
        Permission::EditBusiness,
    ];

    /// Wire identifier, e.g. `"manage_permissions"`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Permission::ViewDashboard => "view_dashboard",
            Permission::EditDashboard => "edit_dashboard",
            Permission::ViewInventory => "view_inventory",
            Permission::EditInventory => "edit_inventory",
            Permission::GenerateOrders => "generate_orders",
            Permission::ViewEmployees => "view_employees",
            Permission::EditEmployees => "edit_employees",
            Permission::ManagePermissions => "manage_permissions",
            Permission::ViewSchedule => "view_schedule",
            Permission::EditSchedule => "edit_schedule",
            Permission::GenerateSchedule => "generate_schedule",
            Permission::SetAvailability => "set_availability",
            Permission::ViewFinancials => "view_financials",
            Permission::EditFinancials => "edit_financials",
            Permission::ViewReminders => "view_reminders",
            Permission::EditReminders => "edit_reminders",
            Permission::SetReminders => "set_reminders",
            Permission::EditBusiness => "edit_business",
        }
    }

    pub const fn category(self) -> PermissionCategory {
        match self {
            Permission::ViewDashboard | Permission::EditDashboard => PermissionCategory::Dashboard,
            Permission::ViewInventory | Permission::EditInventory | Permission::GenerateOrders => {
                PermissionCategory::Inventory
            }
            Permission::ViewEmployees
            | Permission::EditEmployees
            | Permission::ManagePermissions => PermissionCategory::Employees,
            Permission::ViewSchedule
            | Permission::EditSchedule
            | Permission::GenerateSchedule
            | Permission::SetAvailability => PermissionCategory::Schedule,
            Permission::ViewFinancials | Permission::EditFinancials => {
                PermissionCategory::Financials
            }
            Permission::ViewReminders | Permission::EditReminders | Permission::SetReminders => {
                PermissionCategory::Reminders
            }
            Permission::EditBusiness => PermissionCategory::Business,
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Permission::ViewDashboard => "View dashboard and statistics",
            Permission::EditDashboard => "Edit dashboard settings",
            Permission::ViewInventory => "View inventory items",
            Permission::EditInventory => "Add, edit, and delete inventory items",
            Permission::GenerateOrders => "Generate AI-powered inventory orders",
            Permission::ViewEmployees => "View employee list",
            Permission::EditEmployees => "Add, edit, and delete employees",
            Permission::ManagePermissions => "Manage user roles and permissions",
            Permission::ViewSchedule => "View work schedules",
            Permission::EditSchedule => "Create and edit schedules",
            Permission::GenerateSchedule => "Generate AI-powered schedules",
            Permission::SetAvailability => "Set own availability",
            Permission::ViewFinancials => "View financial data",
            Permission::EditFinancials => "Edit financial transactions",
            Permission::ViewReminders => "View reminders",
            Permission::EditReminders => "Create and edit reminders",
            Permission::SetReminders => "Set personal reminders",
            Permission::EditBusiness => "Edit business settings and branding",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| CatalogError::UnknownPermission(s.to_string()))
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum PermissionCategory {
    Dashboard,
    Inventory,
    Employees,
    Schedule,
    Financials,
    Reminders,
    Business,
}

/// Catalog entry as exposed to API clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PermissionInfo {
    pub id: Permission,
    pub category: PermissionCategory,
    pub description: String,
}

// =============================================================================
// Role
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Employee,
}

impl Role {
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Employee => "employee",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "employee" => Ok(Role::Employee),
            other => Err(CatalogError::UnknownRole(other.to_string())),
        }
    }
}

// =============================================================================
// Subject
// =============================================================================

/// Anything permissions can be resolved for.
pub trait Subject {
    fn role(&self) -> Role;
    fn is_active(&self) -> bool;
    fn custom_permissions(&self) -> &PermissionSet;
}

// =============================================================================
// Catalog
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("unknown permission id '{0}'")]
    UnknownPermission(String),
    #[error("unknown role '{0}'")]
    UnknownRole(String),
    #[error("role default '{0}' is not part of the catalog")]
    DefaultOutsideCatalog(Permission),
}

const EMPLOYEE_DEFAULTS: [Permission; 6] = [
    Permission::ViewDashboard,
    Permission::ViewInventory,
    Permission::ViewSchedule,
    Permission::SetAvailability,
    Permission::ViewReminders,
    Permission::SetReminders,
];

/// The fixed set of permissions and the defaults granted per role.
///
/// Build it once at startup and share it (it is cheap to wrap in an `Arc`).
/// The admin role's defaults are always the entire catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionCatalog {
    permissions: PermissionSet,
    employee_defaults: PermissionSet,
}

impl PermissionCatalog {
    /// The catalog every deployment ships with.
    pub fn standard() -> Self {
        Self {
            permissions: Permission::ALL.into_iter().collect(),
            employee_defaults: EMPLOYEE_DEFAULTS.into_iter().collect(),
        }
    }

    /// Build a catalog from string ids, rejecting anything unknown.
    pub fn from_ids(all: &[&str], employee_defaults: &[&str]) -> Result<Self, CatalogError> {
        let permissions = all
            .iter()
            .map(|id| id.parse())
            .collect::<Result<PermissionSet, _>>()?;
        let employee_defaults = employee_defaults
            .iter()
            .map(|id| id.parse())
            .collect::<Result<PermissionSet, _>>()?;

        if let Some(outside) = employee_defaults.difference(&permissions).next() {
            return Err(CatalogError::DefaultOutsideCatalog(*outside));
        }

        Ok(Self {
            permissions,
            employee_defaults,
        })
    }

    pub fn all(&self) -> &PermissionSet {
        &self.permissions
    }

    pub fn contains(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }

    pub fn role_defaults(&self, role: Role) -> &PermissionSet {
        match role {
            Role::Admin => &self.permissions,
            Role::Employee => &self.employee_defaults,
        }
    }

    /// Effective permissions of a subject.
    ///
    /// Admins always get the whole catalog and their custom list is never
    /// consulted. Everyone else gets role defaults plus custom grants; custom
    /// grants can only add.
    pub fn resolve<S: Subject + ?Sized>(&self, subject: &S) -> PermissionSet {
        match subject.role() {
            Role::Admin => self.permissions.clone(),
            role => self
                .role_defaults(role)
                .union(subject.custom_permissions())
                .copied()
                .collect(),
        }
    }

    /// Catalog listing ordered by category, then id.
    pub fn describe(&self) -> Vec<PermissionInfo> {
        let mut entries: Vec<PermissionInfo> = self
            .permissions
            .iter()
            .map(|p| PermissionInfo {
                id: *p,
                category: p.category(),
                description: p.description().to_string(),
            })
            .collect();
        entries.sort_by_key(|e| (e.category, e.id.as_str()));
        entries
    }
}

impl Default for PermissionCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
