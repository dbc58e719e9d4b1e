//! Authorization decisions.
//!
//! Handlers call the guard explicitly at the top of their body and bail out
//! with `?` on denial:
//!
//! ```ignore
//! use shiftdesk_core::guard::AuthorizationGuard;
//! use shiftdesk_core::permissions::Permission;
//!
//! let guard = AuthorizationGuard::new(&catalog);
//! guard.require_permission(&profile, Permission::ManagePermissions)?;
//! ```
//!
//! Every check is a pure function of the subject, the catalog and the
//! requirement. An inactive subject is denied by every check.

use std::fmt;

use serde::Serialize;
use tracing::debug;
use utoipa::ToSchema;

use crate::errors::DomainError;
use crate::permissions::{Permission, PermissionCatalog, Role, Subject};

/// What a caller must hold for an operation to proceed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "permissions", rename_all = "snake_case")]
pub enum Requirement {
    Permission(Permission),
    AnyOf(Vec<Permission>),
    AllOf(Vec<Permission>),
    Admin,
}

impl Requirement {
    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Requirement::Permission(_) => "permission",
            Requirement::AnyOf(_) => "any_of",
            Requirement::AllOf(_) => "all_of",
            Requirement::Admin => "admin",
        }
    }
}

fn join(permissions: &[Permission]) -> String {
    permissions
        .iter()
        .map(|p| p.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requirement::Permission(p) => write!(f, "{}", p),
            Requirement::AnyOf(ps) => write!(f, "one of: {}", join(ps)),
            Requirement::AllOf(ps) => write!(f, "all of: {}", join(ps)),
            Requirement::Admin => f.write_str("admin role"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    Inactive,
    MissingPermission,
    NotAdmin,
}

#[derive(Debug, Clone, Copy)]
pub struct AuthorizationGuard<'a> {
    catalog: &'a PermissionCatalog,
}

impl<'a> AuthorizationGuard<'a> {
    pub fn new(catalog: &'a PermissionCatalog) -> Self {
        Self { catalog }
    }

    pub fn check<S: Subject + ?Sized>(
        &self,
        subject: &S,
        requirement: &Requirement,
    ) -> Result<(), DomainError> {
        let outcome = self.evaluate(subject, requirement);
        if let Err(reason) = outcome {
            debug!(required = %requirement, ?reason, "authorization denied");
            return Err(DomainError::PermissionDenied {
                required: requirement.clone(),
                reason,
            });
        }
        Ok(())
    }

    pub fn require_permission<S: Subject + ?Sized>(
        &self,
        subject: &S,
        permission: Permission,
    ) -> Result<(), DomainError> {
        self.check(subject, &Requirement::Permission(permission))
    }

    pub fn require_any_permission<S: Subject + ?Sized>(
        &self,
        subject: &S,
        permissions: &[Permission],
    ) -> Result<(), DomainError> {
        self.check(subject, &Requirement::AnyOf(permissions.to_vec()))
    }

    pub fn require_all_permissions<S: Subject + ?Sized>(
        &self,
        subject: &S,
        permissions: &[Permission],
    ) -> Result<(), DomainError> {
        self.check(subject, &Requirement::AllOf(permissions.to_vec()))
    }

    pub fn require_admin<S: Subject + ?Sized>(&self, subject: &S) -> Result<(), DomainError> {
        self.check(subject, &Requirement::Admin)
    }

    fn evaluate<S: Subject + ?Sized>(
        &self,
        subject: &S,
        requirement: &Requirement,
    ) -> Result<(), DenialReason> {
        if !subject.is_active() {
            return Err(DenialReason::Inactive);
        }

        let granted = match requirement {
            Requirement::Admin => {
                return if subject.role() == Role::Admin {
                    Ok(())
                } else {
                    Err(DenialReason::NotAdmin)
                };
            }
            Requirement::Permission(p) => self.catalog.resolve(subject).contains(p),
            Requirement::AnyOf(ps) => {
                let resolved = self.catalog.resolve(subject);
                ps.iter().any(|p| resolved.contains(p))
            }
            // An empty all-of list is a misconfigured route, not a free pass.
            Requirement::AllOf(ps) if ps.is_empty() => false,
            Requirement::AllOf(ps) => {
                let resolved = self.catalog.resolve(subject);
                ps.iter().all(|p| resolved.contains(p))
            }
        };

        if granted {
            Ok(())
        } else {
            Err(DenialReason::MissingPermission)
        }
    }
}
