//! # Shiftdesk Models
//!
//! Domain models and DTOs shared by the store and the HTTP layer.
//!
//! # Modules
//!
//! - [`ids`]: typed UUID identifiers
//! - [`profiles`]: user profiles and administrative mutations
//! - [`audit`]: append-only audit entries
//! - [`schedule`]: day codes, shift slots, availability, shifts and reports

pub mod audit;
pub mod ids;
pub mod profiles;
pub mod schedule;

pub use audit::{AuditChanges, AuditEntry, NewAuditEntry};
pub use ids::{AuditEntryId, BusinessId, ShiftId, ShiftSlotId, UserId};
pub use profiles::{
    AuditQuery, MessageResponse, PermissionCatalogResponse, ProfileMutation,
    UserPermissionsResponse, UserProfile,
};
pub use schedule::{
    AvailabilityEntry, AvailabilityRecord, ClockTime, DayCode, EmployeeAvailability,
    PersistedShift, ProposedShift, ShiftSlot, ShiftTiming, SlotCoverage, ValidationReport,
};
