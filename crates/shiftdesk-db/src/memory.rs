//! In-process [`TenantStore`] used by tests.
//!
//! All state sits behind one mutex, so every method observes and produces a
//! consistent snapshot. Mutations are computed on copies and swapped in only
//! once every part of the write has succeeded.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use shiftdesk_core::{AppError, DomainError};
use shiftdesk_models::audit::{AuditEntry, NewAuditEntry};
use shiftdesk_models::ids::{AuditEntryId, BusinessId, ShiftId, ShiftSlotId, UserId};
use shiftdesk_models::profiles::{ProfileMutation, UserProfile};
use shiftdesk_models::schedule::{
    AvailabilityEntry, AvailabilityRecord, CreateShiftSlotDto, PersistedShift, ProposedShift,
    ShiftSlot,
};
use tracing::instrument;

use crate::store::{TenantStore, sort_shifts, sort_slots};

#[derive(Debug, Default)]
struct MemoryState {
    profiles: HashMap<UserId, UserProfile>,
    /// Oldest first.
    audit: Vec<AuditEntry>,
    slots: Vec<ShiftSlot>,
    availability: Vec<AvailabilityRecord>,
    shifts: Vec<PersistedShift>,
    fail_audit_writes: bool,
}

#[derive(Debug, Default)]
pub struct MemoryTenantStore {
    state: Mutex<MemoryState>,
}

impl MemoryTenantStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, MemoryState>, AppError> {
        self.state
            .lock()
            .map_err(|_| AppError::internal(anyhow!("memory store lock poisoned")))
    }

    /// Seeds or overwrites a profile.
    pub fn insert_profile(&self, profile: UserProfile) -> Result<(), AppError> {
        self.state()?.profiles.insert(profile.id, profile);
        Ok(())
    }

    /// Seeds a raw availability record, bypassing week-window checks.
    pub fn insert_availability_record(&self, record: AvailabilityRecord) -> Result<(), AppError> {
        self.state()?.availability.push(record);
        Ok(())
    }

    /// Makes every subsequent audit write fail until reset.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn set_fail_audit_writes(&self, fail: bool) -> Result<(), AppError> {
        self.state()?.fail_audit_writes = fail;
        Ok(())
    }
}

impl MemoryState {
    fn append_audit(&mut self, entry: NewAuditEntry) -> Result<AuditEntry, AppError> {
        if self.fail_audit_writes {
            return Err(AppError::database(anyhow!("audit log write failed")));
        }
        let entry = entry.into_entry(AuditEntryId::new(), Utc::now());
        self.audit.push(entry.clone());
        Ok(entry)
    }
}

#[async_trait]
impl TenantStore for MemoryTenantStore {
    async fn find_profile(&self, user_id: UserId) -> Result<Option<UserProfile>, AppError> {
        Ok(self.state()?.profiles.get(&user_id).cloned())
    }

    async fn list_profiles(&self, business_id: BusinessId) -> Result<Vec<UserProfile>, AppError> {
        let mut profiles: Vec<UserProfile> = self
            .state()?
            .profiles
            .values()
            .filter(|p| p.business_id == business_id)
            .cloned()
            .collect();
        profiles.sort_by(|a, b| (&a.full_name, a.id).cmp(&(&b.full_name, b.id)));
        Ok(profiles)
    }

    #[instrument(skip(self, mutation))]
    async fn apply_profile_mutation(
        &self,
        business_id: BusinessId,
        admin_id: UserId,
        target_id: UserId,
        mutation: &ProfileMutation,
    ) -> Result<(UserProfile, AuditEntry), AppError> {
        let mut state = self.state()?;

        let prior = state
            .profiles
            .get(&target_id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("user_profile", target_id))?;
        if prior.business_id != business_id {
            return Err(DomainError::TenantMismatch.into());
        }
        mutation.check_actor(admin_id, &prior)?;

        let next = mutation.apply(&prior);
        let entry = state.append_audit(NewAuditEntry {
            business_id,
            admin_id,
            target_user_id: target_id,
            action: mutation.action(),
            changes: mutation.audit_changes(&prior),
        })?;
        state.profiles.insert(target_id, next.clone());

        Ok((next, entry))
    }

    async fn list_audit_entries(
        &self,
        business_id: BusinessId,
        target_id: Option<UserId>,
    ) -> Result<Vec<AuditEntry>, AppError> {
        Ok(self
            .state()?
            .audit
            .iter()
            .rev()
            .filter(|e| e.business_id == business_id)
            .filter(|e| target_id.is_none_or(|t| e.target_user_id == t))
            .cloned()
            .collect())
    }

    async fn list_shift_slots(&self, business_id: BusinessId) -> Result<Vec<ShiftSlot>, AppError> {
        let mut slots: Vec<ShiftSlot> = self
            .state()?
            .slots
            .iter()
            .filter(|s| s.business_id == business_id)
            .cloned()
            .collect();
        sort_slots(&mut slots);
        Ok(slots)
    }

    async fn find_shift_slot(
        &self,
        business_id: BusinessId,
        slot_id: ShiftSlotId,
    ) -> Result<Option<ShiftSlot>, AppError> {
        Ok(self
            .state()?
            .slots
            .iter()
            .find(|s| s.id == slot_id && s.business_id == business_id)
            .cloned())
    }

    async fn create_shift_slot(
        &self,
        business_id: BusinessId,
        dto: &CreateShiftSlotDto,
    ) -> Result<ShiftSlot, AppError> {
        let slot = ShiftSlot {
            id: ShiftSlotId::new(),
            business_id,
            day_of_week: dto.day_of_week,
            slot_name: dto.slot_name.clone(),
            start_time: dto.start_time,
            end_time: dto.end_time,
            required_count: dto.required_count,
        };
        self.state()?.slots.push(slot.clone());
        Ok(slot)
    }

    async fn update_shift_slot(
        &self,
        business_id: BusinessId,
        slot: &ShiftSlot,
    ) -> Result<bool, AppError> {
        let mut state = self.state()?;
        match state
            .slots
            .iter_mut()
            .find(|s| s.id == slot.id && s.business_id == business_id)
        {
            Some(existing) => {
                *existing = ShiftSlot {
                    business_id,
                    ..slot.clone()
                };
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_shift_slot(
        &self,
        business_id: BusinessId,
        slot_id: ShiftSlotId,
    ) -> Result<bool, AppError> {
        let mut state = self.state()?;
        let before = state.slots.len();
        state
            .slots
            .retain(|s| !(s.id == slot_id && s.business_id == business_id));
        Ok(state.slots.len() < before)
    }

    async fn list_availability(
        &self,
        business_id: BusinessId,
        week_start: NaiveDate,
    ) -> Result<Vec<AvailabilityRecord>, AppError> {
        Ok(self
            .state()?
            .availability
            .iter()
            .filter(|r| r.business_id == business_id && r.week_start == week_start)
            .cloned()
            .collect())
    }

    async fn replace_availability(
        &self,
        business_id: BusinessId,
        user_id: UserId,
        week_start: NaiveDate,
        entries: &[AvailabilityEntry],
    ) -> Result<Vec<AvailabilityRecord>, AppError> {
        let records: Vec<AvailabilityRecord> = entries
            .iter()
            .map(|e| AvailabilityRecord {
                business_id,
                user_id,
                week_start,
                date: e.date,
                available: e.available,
            })
            .collect();

        let mut state = self.state()?;
        state.availability.retain(|r| {
            !(r.business_id == business_id && r.user_id == user_id && r.week_start == week_start)
        });
        state.availability.extend(records.iter().cloned());
        Ok(records)
    }

    async fn list_week_shifts(
        &self,
        business_id: BusinessId,
        week_start: NaiveDate,
    ) -> Result<Vec<PersistedShift>, AppError> {
        let mut shifts: Vec<PersistedShift> = self
            .state()?
            .shifts
            .iter()
            .filter(|s| s.business_id == business_id && s.week_start == week_start)
            .cloned()
            .collect();
        sort_shifts(&mut shifts);
        Ok(shifts)
    }

    async fn replace_week_shifts(
        &self,
        business_id: BusinessId,
        week_start: NaiveDate,
        shifts: &[ProposedShift],
    ) -> Result<Vec<PersistedShift>, AppError> {
        let mut persisted: Vec<PersistedShift> = shifts
            .iter()
            .map(|s| PersistedShift {
                id: ShiftId::new(),
                business_id,
                week_start,
                employee_id: s.employee_id,
                day: s.day,
                start_time: s.start_time,
                end_time: s.end_time,
            })
            .collect();

        let mut state = self.state()?;
        state
            .shifts
            .retain(|s| !(s.business_id == business_id && s.week_start == week_start));
        state.shifts.extend(persisted.iter().cloned());

        sort_shifts(&mut persisted);
        Ok(persisted)
    }

    async fn delete_week_shifts(
        &self,
        business_id: BusinessId,
        week_start: NaiveDate,
    ) -> Result<u64, AppError> {
        let mut state = self.state()?;
        let before = state.shifts.len();
        state
            .shifts
            .retain(|s| !(s.business_id == business_id && s.week_start == week_start));
        Ok((before - state.shifts.len()) as u64)
    }
}
