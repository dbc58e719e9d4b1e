use std::collections::BTreeSet;

use chrono::NaiveDate;
use shiftdesk_core::{AppError, DomainError, Role};
use shiftdesk_db::TenantStore;
use shiftdesk_models::ids::{BusinessId, ShiftSlotId, UserId};
use shiftdesk_models::schedule::{
    AvailabilityEntry, AvailabilityResponse, CreateShiftSlotDto, DayCode, EmployeeAvailability,
    PersistedShift, ScheduleProposalDto, ScheduleSubmissionResponse, SetAvailabilityDto,
    ShiftSlot, UpdateShiftSlotDto, ValidationReport, WeekCoverageResponse,
};
use tracing::{info, instrument};

use crate::metrics::track_schedule_validation;
use crate::modules::schedule::availability::AvailabilityIndex;
use crate::modules::schedule::coverage::{day_coverage, slot_coverage};
use crate::modules::schedule::validator::validate_schedule;

pub struct ScheduleService;

impl ScheduleService {
    // Shift slots

    #[instrument(skip(store))]
    pub async fn list_slots(
        store: &dyn TenantStore,
        business_id: BusinessId,
    ) -> Result<Vec<ShiftSlot>, AppError> {
        store.list_shift_slots(business_id).await
    }

    #[instrument(skip(store))]
    pub async fn create_slot(
        store: &dyn TenantStore,
        business_id: BusinessId,
        dto: CreateShiftSlotDto,
    ) -> Result<ShiftSlot, AppError> {
        let slot = store.create_shift_slot(business_id, &dto).await?;
        info!(slot_id = %slot.id, day = %slot.day_of_week, "Shift slot created");
        Ok(slot)
    }

    #[instrument(skip(store))]
    pub async fn update_slot(
        store: &dyn TenantStore,
        business_id: BusinessId,
        slot_id: ShiftSlotId,
        dto: UpdateShiftSlotDto,
    ) -> Result<ShiftSlot, AppError> {
        let existing = store
            .find_shift_slot(business_id, slot_id)
            .await?
            .ok_or_else(|| DomainError::not_found("shift_slot", slot_id))?;

        let updated = dto.apply(&existing);
        if !store.update_shift_slot(business_id, &updated).await? {
            return Err(DomainError::not_found("shift_slot", slot_id).into());
        }

        Ok(updated)
    }

    #[instrument(skip(store))]
    pub async fn delete_slot(
        store: &dyn TenantStore,
        business_id: BusinessId,
        slot_id: ShiftSlotId,
    ) -> Result<(), AppError> {
        if !store.delete_shift_slot(business_id, slot_id).await? {
            return Err(DomainError::not_found("shift_slot", slot_id).into());
        }
        Ok(())
    }

    // Availability

    /// Days the user can work in the given week. All seven when the user has
    /// stored nothing for it.
    #[instrument(skip(store))]
    pub async fn available_days(
        store: &dyn TenantStore,
        business_id: BusinessId,
        user_id: UserId,
        week_start: NaiveDate,
    ) -> Result<BTreeSet<DayCode>, AppError> {
        let records = store.list_availability(business_id, week_start).await?;
        let index = AvailabilityIndex::build(business_id, week_start, &records);
        Ok(index.available_days(user_id))
    }

    /// Active employees of the business with their availability for the week.
    #[instrument(skip(store))]
    pub async fn employees_for_week(
        store: &dyn TenantStore,
        business_id: BusinessId,
        week_start: NaiveDate,
    ) -> Result<Vec<EmployeeAvailability>, AppError> {
        let profiles = store.list_profiles(business_id).await?;
        let records = store.list_availability(business_id, week_start).await?;
        let index = AvailabilityIndex::build(business_id, week_start, &records);

        Ok(profiles
            .into_iter()
            .filter(|p| p.is_active && p.role == Role::Employee)
            .map(|p| EmployeeAvailability {
                availability: index.available_days(p.id),
                id: p.id,
                full_name: p.full_name,
            })
            .collect())
    }

    #[instrument(skip(store))]
    pub async fn my_availability(
        store: &dyn TenantStore,
        business_id: BusinessId,
        user_id: UserId,
        week_start: NaiveDate,
    ) -> Result<AvailabilityResponse, AppError> {
        let records = store.list_availability(business_id, week_start).await?;
        let index = AvailabilityIndex::build(business_id, week_start, &records);

        let mut entries: Vec<_> = records
            .iter()
            .filter(|r| r.user_id == user_id)
            .filter(|r| DayCode::for_date(week_start, r.date).is_some())
            .map(|r| AvailabilityEntry {
                date: r.date,
                available: r.available,
            })
            .collect();
        entries.sort_by_key(|e| e.date);

        Ok(AvailabilityResponse {
            user_id,
            week_start,
            entries,
            available_days: index.available_days(user_id),
        })
    }

    /// Replaces the caller's availability for a week. Every date must fall
    /// inside the week and appear at most once.
    #[instrument(skip(store, dto), fields(week_start = %dto.week_start))]
    pub async fn set_availability(
        store: &dyn TenantStore,
        business_id: BusinessId,
        user_id: UserId,
        dto: SetAvailabilityDto,
    ) -> Result<AvailabilityResponse, AppError> {
        let mut errors = Vec::new();
        let mut seen = BTreeSet::new();
        for entry in &dto.entries {
            if DayCode::for_date(dto.week_start, entry.date).is_none() {
                errors.push(format!(
                    "Date {} is outside the week starting {}",
                    entry.date, dto.week_start
                ));
            } else if !seen.insert(entry.date) {
                errors.push(format!("Date {} appears more than once", entry.date));
            }
        }
        if !errors.is_empty() {
            return Err(DomainError::ValidationFailed { errors }.into());
        }

        store
            .replace_availability(business_id, user_id, dto.week_start, &dto.entries)
            .await?;

        Self::my_availability(store, business_id, user_id, dto.week_start).await
    }

    // Proposals and shifts

    /// Runs the validator against the business's active employees without
    /// persisting anything.
    #[instrument(skip(store, proposal), fields(week_start = %proposal.week_start, shifts = proposal.shifts.len()))]
    pub async fn validate_proposal(
        store: &dyn TenantStore,
        business_id: BusinessId,
        proposal: &ScheduleProposalDto,
    ) -> Result<ValidationReport, AppError> {
        let employees = Self::employees_for_week(store, business_id, proposal.week_start).await?;
        let report = validate_schedule(&proposal.shifts, &employees);

        track_schedule_validation(report.valid);
        if !report.valid {
            info!(errors = report.errors.len(), "Schedule proposal rejected");
        }

        Ok(report)
    }

    /// Validates the proposal and, only if it is clean, replaces the week's
    /// shifts with it.
    #[instrument(skip(store, proposal), fields(week_start = %proposal.week_start, shifts = proposal.shifts.len()))]
    pub async fn submit_schedule(
        store: &dyn TenantStore,
        business_id: BusinessId,
        proposal: ScheduleProposalDto,
    ) -> Result<ScheduleSubmissionResponse, AppError> {
        let report = Self::validate_proposal(store, business_id, &proposal).await?;
        if !report.valid {
            return Err(DomainError::ValidationFailed {
                errors: report.errors,
            }
            .into());
        }

        let persisted = store
            .replace_week_shifts(business_id, proposal.week_start, &proposal.shifts)
            .await?;
        let slots = store.list_shift_slots(business_id).await?;

        info!(shifts_created = persisted.len(), "Schedule saved");

        Ok(ScheduleSubmissionResponse {
            message: "Schedule saved".to_string(),
            shifts_created: persisted.len(),
            coverage: slot_coverage(&persisted, &slots),
            warnings: report.warnings,
        })
    }

    #[instrument(skip(store))]
    pub async fn week_shifts(
        store: &dyn TenantStore,
        business_id: BusinessId,
        week_start: NaiveDate,
    ) -> Result<Vec<PersistedShift>, AppError> {
        store.list_week_shifts(business_id, week_start).await
    }

    #[instrument(skip(store))]
    pub async fn delete_week(
        store: &dyn TenantStore,
        business_id: BusinessId,
        week_start: NaiveDate,
    ) -> Result<u64, AppError> {
        let deleted = store.delete_week_shifts(business_id, week_start).await?;
        info!(deleted, "Week shifts deleted");
        Ok(deleted)
    }

    #[instrument(skip(store))]
    pub async fn week_coverage(
        store: &dyn TenantStore,
        business_id: BusinessId,
        week_start: NaiveDate,
    ) -> Result<WeekCoverageResponse, AppError> {
        let shifts = store.list_week_shifts(business_id, week_start).await?;
        let slots = store.list_shift_slots(business_id).await?;

        Ok(WeekCoverageResponse {
            week_start,
            slots: slot_coverage(&shifts, &slots),
            days: day_coverage(&shifts, &slots),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shiftdesk_core::PermissionSet;
    use shiftdesk_db::MemoryTenantStore;
    use shiftdesk_models::profiles::UserProfile;
    use shiftdesk_models::schedule::{AvailabilityRecord, ClockTime, ProposedShift};

    const BUSINESS: BusinessId = BusinessId::from_u128(1);
    const ALICE: UserId = UserId::from_u128(10);
    const BOB: UserId = UserId::from_u128(11);
    const OWNER: UserId = UserId::from_u128(12);

    fn week() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn profile(id: UserId, role: Role, active: bool) -> UserProfile {
        UserProfile {
            id,
            business_id: BUSINESS,
            full_name: Some(format!("user {}", id)),
            email: None,
            role,
            custom_permissions: PermissionSet::new(),
            is_active: active,
        }
    }

    fn seeded() -> MemoryTenantStore {
        let store = MemoryTenantStore::new();
        store.insert_profile(profile(ALICE, Role::Employee, true)).unwrap();
        store.insert_profile(profile(BOB, Role::Employee, false)).unwrap();
        store.insert_profile(profile(OWNER, Role::Admin, true)).unwrap();
        store
            .insert_availability_record(AvailabilityRecord {
                business_id: BUSINESS,
                user_id: ALICE,
                week_start: week(),
                date: week(),
                available: true,
            })
            .unwrap();
        store
    }

    fn proposal(shifts: Vec<ProposedShift>) -> ScheduleProposalDto {
        ScheduleProposalDto {
            week_start: week(),
            shifts,
        }
    }

    fn shift(employee_id: UserId, day: DayCode) -> ProposedShift {
        ProposedShift {
            employee_id,
            day,
            start_time: ClockTime::hm(9, 0).unwrap(),
            end_time: ClockTime::hm(13, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_only_active_employees_are_scheduling_candidates() {
        let store = seeded();
        let employees = ScheduleService::employees_for_week(&store, BUSINESS, week())
            .await
            .unwrap();
        assert_eq!(employees.len(), 1);
        assert_eq!(employees[0].id, ALICE);
        assert_eq!(
            employees[0].availability,
            [DayCode::Mon].into_iter().collect()
        );
    }

    #[tokio::test]
    async fn test_invalid_submission_persists_nothing() {
        let store = seeded();
        let err = ScheduleService::submit_schedule(
            &store,
            BUSINESS,
            proposal(vec![shift(ALICE, DayCode::Mon), shift(ALICE, DayCode::Tue)]),
        )
        .await
        .unwrap_err();

        match err.domain() {
            Some(DomainError::ValidationFailed { errors }) => assert_eq!(errors.len(), 1),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(
            ScheduleService::week_shifts(&store, BUSINESS, week())
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_inactive_employee_cannot_be_scheduled() {
        let store = seeded();
        let report = ScheduleService::validate_proposal(
            &store,
            BUSINESS,
            &proposal(vec![shift(BOB, DayCode::Mon)]),
        )
        .await
        .unwrap();
        assert!(!report.valid);
    }

    #[tokio::test]
    async fn test_valid_submission_replaces_week_and_reports_coverage() {
        let store = seeded();
        store
            .create_shift_slot(
                BUSINESS,
                &CreateShiftSlotDto {
                    day_of_week: DayCode::Mon,
                    slot_name: "morning".into(),
                    start_time: ClockTime::hm(9, 0).unwrap(),
                    end_time: ClockTime::hm(13, 0).unwrap(),
                    required_count: 2,
                },
            )
            .await
            .unwrap();

        let response = ScheduleService::submit_schedule(
            &store,
            BUSINESS,
            proposal(vec![shift(ALICE, DayCode::Mon)]),
        )
        .await
        .unwrap();

        assert_eq!(response.shifts_created, 1);
        assert_eq!(response.coverage["mon-morning-09:00-13:00"].coverage_pct, 50.0);
        assert!(response.warnings.is_empty());

        let coverage = ScheduleService::week_coverage(&store, BUSINESS, week())
            .await
            .unwrap();
        assert_eq!(coverage.days[&DayCode::Mon].scheduled, 1);
    }

    #[tokio::test]
    async fn test_availability_dates_must_be_inside_the_week() {
        let store = seeded();
        let err = ScheduleService::set_availability(
            &store,
            BUSINESS,
            ALICE,
            SetAvailabilityDto {
                week_start: week(),
                entries: vec![
                    AvailabilityEntry {
                        date: week() + chrono::Duration::days(7),
                        available: true,
                    },
                    AvailabilityEntry {
                        date: week(),
                        available: true,
                    },
                    AvailabilityEntry {
                        date: week(),
                        available: false,
                    },
                ],
            },
        )
        .await
        .unwrap_err();

        match err.domain() {
            Some(DomainError::ValidationFailed { errors }) => assert_eq!(errors.len(), 2),
            other => panic!("unexpected error: {:?}", other),
        }
        // Unchanged.
        assert_eq!(
            ScheduleService::available_days(&store, BUSINESS, ALICE, week())
                .await
                .unwrap(),
            [DayCode::Mon].into_iter().collect()
        );
    }

    #[tokio::test]
    async fn test_setting_availability_replaces_the_week() {
        let store = seeded();
        let response = ScheduleService::set_availability(
            &store,
            BUSINESS,
            ALICE,
            SetAvailabilityDto {
                week_start: week(),
                entries: vec![
                    AvailabilityEntry {
                        date: week() + chrono::Duration::days(2),
                        available: true,
                    },
                    AvailabilityEntry {
                        date: week() + chrono::Duration::days(3),
                        available: false,
                    },
                ],
            },
        )
        .await
        .unwrap();

        assert_eq!(response.entries.len(), 2);
        assert_eq!(
            response.available_days,
            [DayCode::Wed].into_iter().collect()
        );
    }

    #[tokio::test]
    async fn test_missing_slot_is_not_found() {
        let store = seeded();
        let err = ScheduleService::delete_slot(&store, BUSINESS, ShiftSlotId::from_u128(5))
            .await
            .unwrap_err();
        assert!(matches!(err.domain(), Some(DomainError::NotFound { .. })));

        let err = ScheduleService::update_slot(
            &store,
            BUSINESS,
            ShiftSlotId::from_u128(5),
            UpdateShiftSlotDto::default(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::NOT_FOUND);
    }
}
