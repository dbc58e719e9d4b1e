use async_trait::async_trait;
use chrono::NaiveDate;
use shiftdesk_core::AppError;
use shiftdesk_models::audit::AuditEntry;
use shiftdesk_models::ids::{BusinessId, ShiftSlotId, UserId};
use shiftdesk_models::profiles::{ProfileMutation, UserProfile};
use shiftdesk_models::schedule::{
    AvailabilityEntry, AvailabilityRecord, CreateShiftSlotDto, PersistedShift, ProposedShift,
    ShiftSlot,
};

/// Persistence for everything that belongs to a business.
///
/// Every method except [`TenantStore::find_profile`] is scoped by
/// `business_id` and never returns or touches another tenant's rows.
/// `find_profile` resolves the caller or an admin target by id alone so the
/// caller can tell "missing" from "belongs to another business".
#[async_trait]
pub trait TenantStore: Send + Sync {
    async fn find_profile(&self, user_id: UserId) -> Result<Option<UserProfile>, AppError>;

    async fn list_profiles(&self, business_id: BusinessId) -> Result<Vec<UserProfile>, AppError>;

    /// Applies `mutation` to the target profile and appends the matching audit
    /// entry as one atomic unit. If the audit entry cannot be written the
    /// profile is left unchanged.
    ///
    /// Fails with `NotFound` when the target does not exist and with
    /// `TenantMismatch` when it belongs to another business.
    async fn apply_profile_mutation(
        &self,
        business_id: BusinessId,
        admin_id: UserId,
        target_id: UserId,
        mutation: &ProfileMutation,
    ) -> Result<(UserProfile, AuditEntry), AppError>;

    /// Newest first, optionally narrowed to one target user.
    async fn list_audit_entries(
        &self,
        business_id: BusinessId,
        target_id: Option<UserId>,
    ) -> Result<Vec<AuditEntry>, AppError>;

    async fn list_shift_slots(&self, business_id: BusinessId) -> Result<Vec<ShiftSlot>, AppError>;

    async fn find_shift_slot(
        &self,
        business_id: BusinessId,
        slot_id: ShiftSlotId,
    ) -> Result<Option<ShiftSlot>, AppError>;

    async fn create_shift_slot(
        &self,
        business_id: BusinessId,
        dto: &CreateShiftSlotDto,
    ) -> Result<ShiftSlot, AppError>;

    /// Overwrites the stored slot with the same id. Returns `false` when no
    /// such slot exists for the business.
    async fn update_shift_slot(
        &self,
        business_id: BusinessId,
        slot: &ShiftSlot,
    ) -> Result<bool, AppError>;

    async fn delete_shift_slot(
        &self,
        business_id: BusinessId,
        slot_id: ShiftSlotId,
    ) -> Result<bool, AppError>;

    async fn list_availability(
        &self,
        business_id: BusinessId,
        week_start: NaiveDate,
    ) -> Result<Vec<AvailabilityRecord>, AppError>;

    /// Replaces every record of `user_id` for the week with `entries`.
    async fn replace_availability(
        &self,
        business_id: BusinessId,
        user_id: UserId,
        week_start: NaiveDate,
        entries: &[AvailabilityEntry],
    ) -> Result<Vec<AvailabilityRecord>, AppError>;

    async fn list_week_shifts(
        &self,
        business_id: BusinessId,
        week_start: NaiveDate,
    ) -> Result<Vec<PersistedShift>, AppError>;

    /// Deletes the week's shifts and inserts `shifts` in one transaction.
    async fn replace_week_shifts(
        &self,
        business_id: BusinessId,
        week_start: NaiveDate,
        shifts: &[ProposedShift],
    ) -> Result<Vec<PersistedShift>, AppError>;

    async fn delete_week_shifts(
        &self,
        business_id: BusinessId,
        week_start: NaiveDate,
    ) -> Result<u64, AppError>;
}

/// Orders shifts by day, then start time, then employee.
pub(crate) fn sort_shifts(shifts: &mut [PersistedShift]) {
    shifts.sort_by_key(|s| (s.day, s.start_time, s.end_time, s.employee_id));
}

/// Orders slots by day, start, end and name, with the id as final tiebreak.
pub fn sort_slots(slots: &mut [ShiftSlot]) {
    slots.sort_by(|a, b| {
        (a.day_of_week, a.start_time, a.end_time, &a.slot_name, a.id)
            .cmp(&(b.day_of_week, b.start_time, b.end_time, &b.slot_name, b.id))
    });
}
