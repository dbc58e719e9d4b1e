use serde::Serialize;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};

use shiftdesk_core::{
    AdminAction, DenialReason, Permission, PermissionCategory, PermissionInfo, Role,
};
use shiftdesk_models::audit::{AuditChanges, AuditEntry};
use shiftdesk_models::profiles::{
    MessageResponse, PermissionCatalogResponse, UpdateUserPermissionsDto, UpdateUserRoleDto,
    UserPermissionsResponse,
};
use shiftdesk_models::schedule::{
    AvailabilityEntry, AvailabilityResponse, ClockTime, CreateShiftSlotDto, DayCode, DayCoverage,
    EmployeeAvailability, PersistedShift, ProposedShift, ScheduleProposalDto,
    ScheduleSubmissionResponse, SetAvailabilityDto, ShiftSlot, SlotCoverage, UpdateShiftSlotDto,
    ValidationReport, WeekCoverageResponse,
};

/// Body of every error response. Domain errors add their own fields, such as
/// `required` and `reason` on a permission denial or `errors` on a rejected
/// schedule.
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "permission denied: requires manage_permissions")]
    pub error: String,
    #[schema(example = "permission_denied")]
    pub kind: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::permissions_admin::controller::get_catalog,
        crate::modules::permissions_admin::controller::list_users,
        crate::modules::permissions_admin::controller::get_user,
        crate::modules::permissions_admin::controller::update_user_permissions,
        crate::modules::permissions_admin::controller::update_user_role,
        crate::modules::permissions_admin::controller::deactivate_user,
        crate::modules::permissions_admin::controller::activate_user,
        crate::modules::permissions_admin::controller::list_audit_log,
        crate::modules::permissions_admin::controller::get_my_permissions,
        crate::modules::schedule::controller::list_shift_slots,
        crate::modules::schedule::controller::create_shift_slot,
        crate::modules::schedule::controller::update_shift_slot,
        crate::modules::schedule::controller::delete_shift_slot,
        crate::modules::schedule::controller::validate_schedule,
        crate::modules::schedule::controller::submit_schedule,
        crate::modules::schedule::controller::get_week_shifts,
        crate::modules::schedule::controller::delete_week_shifts,
        crate::modules::schedule::controller::get_week_coverage,
        crate::modules::schedule::controller::get_week_availability,
        crate::modules::schedule::controller::get_my_availability,
        crate::modules::schedule::controller::set_my_availability,
    ),
    components(
        schemas(
            ErrorResponse,
            MessageResponse,
            Permission,
            PermissionCategory,
            PermissionInfo,
            PermissionCatalogResponse,
            Role,
            AdminAction,
            DenialReason,
            UserPermissionsResponse,
            UpdateUserPermissionsDto,
            UpdateUserRoleDto,
            AuditEntry,
            AuditChanges,
            DayCode,
            ClockTime,
            ShiftSlot,
            CreateShiftSlotDto,
            UpdateShiftSlotDto,
            ProposedShift,
            PersistedShift,
            ScheduleProposalDto,
            ScheduleSubmissionResponse,
            ValidationReport,
            SlotCoverage,
            DayCoverage,
            WeekCoverageResponse,
            AvailabilityEntry,
            AvailabilityResponse,
            SetAvailabilityDto,
            EmployeeAvailability,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Permissions", description = "Permission catalog, user grants and the audit log"),
        (name = "Schedule", description = "Shift slots, availability, schedule validation and coverage")
    ),
    info(
        title = "Shiftdesk API",
        version = "0.1.0",
        description = "Tenant-scoped authorization and schedule integrity. Callers are identified by headers set by the upstream identity gateway.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "user_id",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("x-user-id"))),
            );
            components.add_security_scheme(
                "business_id",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("x-business-id"))),
            );
        }
    }
}
