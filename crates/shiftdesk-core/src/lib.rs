//! # Shiftdesk Core
//!
//! Authorization primitives and error types shared by every Shiftdesk crate.
//!
//! - [`permissions`]: the permission catalog, roles and effective-permission resolution
//! - [`guard`]: permission and admin checks returning [`DomainError`] on denial
//! - [`admin`]: administrative actions recorded in the audit log
//! - [`errors`]: domain errors and the HTTP-facing [`AppError`]
//!
//! # Example
//!
//! ```ignore
//! use shiftdesk_core::{AuthorizationGuard, Permission, PermissionCatalog};
//!
//! let catalog = PermissionCatalog::standard();
//! AuthorizationGuard::new(&catalog).require_permission(&profile, Permission::ViewSchedule)?;
//! ```

pub mod admin;
pub mod errors;
pub mod guard;
pub mod permissions;

pub use admin::AdminAction;
pub use errors::{AppError, DomainError};
pub use guard::{AuthorizationGuard, DenialReason, Requirement};
pub use permissions::{
    CatalogError, Permission, PermissionCatalog, PermissionCategory, PermissionInfo,
    PermissionSet, Role, Subject,
};
