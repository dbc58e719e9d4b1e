//! Postgres-backed [`TenantStore`].

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use shiftdesk_core::{AdminAction, AppError, DomainError, Permission, PermissionSet, Role};
use shiftdesk_models::audit::{AuditChanges, AuditEntry, NewAuditEntry};
use shiftdesk_models::ids::{AuditEntryId, BusinessId, ShiftId, ShiftSlotId, UserId};
use shiftdesk_models::profiles::{ProfileMutation, UserProfile};
use shiftdesk_models::schedule::{
    AvailabilityEntry, AvailabilityRecord, CreateShiftSlotDto, DayCode, PersistedShift,
    ProposedShift, ShiftSlot,
};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use tracing::{instrument, warn};

use crate::store::{TenantStore, sort_shifts, sort_slots};

#[derive(Clone, Debug)]
pub struct PgTenantStore {
    pool: PgPool,
}

impl PgTenantStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

// ============ Rows ============

#[derive(Debug, FromRow)]
struct ProfileRow {
    id: UserId,
    business_id: BusinessId,
    full_name: Option<String>,
    email: Option<String>,
    role: String,
    custom_permissions: Vec<String>,
    is_active: bool,
}

impl TryFrom<ProfileRow> for UserProfile {
    type Error = AppError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        let role: Role = row
            .role
            .parse()
            .map_err(|e| AppError::internal(anyhow!("profile {}: {}", row.id, e)))?;

        let mut custom_permissions = PermissionSet::new();
        for id in &row.custom_permissions {
            match id.parse::<Permission>() {
                Ok(p) => {
                    custom_permissions.insert(p);
                }
                // Admin resolution never reads custom grants.
                Err(e) if role == Role::Admin => {
                    warn!(user_id = %row.id, error = %e, "dropping unknown permission on admin profile");
                }
                Err(e) => {
                    return Err(AppError::internal(anyhow!("profile {}: {}", row.id, e)));
                }
            }
        }

        Ok(UserProfile {
            id: row.id,
            business_id: row.business_id,
            full_name: row.full_name,
            email: row.email,
            role,
            custom_permissions,
            is_active: row.is_active,
        })
    }
}

#[derive(Debug, FromRow)]
struct AuditRow {
    id: AuditEntryId,
    business_id: BusinessId,
    admin_id: UserId,
    target_user_id: UserId,
    action: String,
    changes: Json<AuditChanges>,
    created_at: DateTime<Utc>,
}

impl TryFrom<AuditRow> for AuditEntry {
    type Error = AppError;

    fn try_from(row: AuditRow) -> Result<Self, Self::Error> {
        let action: AdminAction = row
            .action
            .parse()
            .map_err(|e: String| AppError::internal(anyhow!(e)))?;
        Ok(AuditEntry {
            id: row.id,
            business_id: row.business_id,
            admin_id: row.admin_id,
            target_user_id: row.target_user_id,
            action,
            changes: row.changes.0,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct ShiftSlotRow {
    id: ShiftSlotId,
    business_id: BusinessId,
    day_of_week: String,
    slot_name: String,
    start_time: NaiveTime,
    end_time: NaiveTime,
    required_count: i32,
}

impl TryFrom<ShiftSlotRow> for ShiftSlot {
    type Error = AppError;

    fn try_from(row: ShiftSlotRow) -> Result<Self, Self::Error> {
        Ok(ShiftSlot {
            id: row.id,
            business_id: row.business_id,
            day_of_week: parse_day(&row.day_of_week)?,
            slot_name: row.slot_name,
            start_time: row.start_time.into(),
            end_time: row.end_time.into(),
            required_count: u32::try_from(row.required_count).map_err(AppError::internal)?,
        })
    }
}

#[derive(Debug, FromRow)]
struct AvailabilityRow {
    business_id: BusinessId,
    user_id: UserId,
    week_start: NaiveDate,
    date: NaiveDate,
    available: bool,
}

impl From<AvailabilityRow> for AvailabilityRecord {
    fn from(row: AvailabilityRow) -> Self {
        AvailabilityRecord {
            business_id: row.business_id,
            user_id: row.user_id,
            week_start: row.week_start,
            date: row.date,
            available: row.available,
        }
    }
}

#[derive(Debug, FromRow)]
struct ShiftRow {
    id: ShiftId,
    business_id: BusinessId,
    week_start: NaiveDate,
    employee_id: UserId,
    day_of_week: String,
    start_time: NaiveTime,
    end_time: NaiveTime,
}

impl TryFrom<ShiftRow> for PersistedShift {
    type Error = AppError;

    fn try_from(row: ShiftRow) -> Result<Self, Self::Error> {
        Ok(PersistedShift {
            id: row.id,
            business_id: row.business_id,
            week_start: row.week_start,
            employee_id: row.employee_id,
            day: parse_day(&row.day_of_week)?,
            start_time: row.start_time.into(),
            end_time: row.end_time.into(),
        })
    }
}

fn parse_day(s: &str) -> Result<DayCode, AppError> {
    s.parse().map_err(|e: String| AppError::internal(anyhow!(e)))
}

fn collect<R, T>(rows: Vec<R>) -> Result<Vec<T>, AppError>
where
    T: TryFrom<R, Error = AppError>,
{
    rows.into_iter().map(T::try_from).collect()
}

const PROFILE_COLUMNS: &str =
    "id, business_id, full_name, email, role, custom_permissions, is_active";

const AUDIT_COLUMNS: &str =
    "id, business_id, admin_id, target_user_id, action, changes, created_at";

const SLOT_COLUMNS: &str =
    "id, business_id, day_of_week, slot_name, start_time, end_time, required_count";

const SHIFT_COLUMNS: &str =
    "id, business_id, week_start, employee_id, day_of_week, start_time, end_time";

// ============ Writes inside a transaction ============

async fn write_profile(
    tx: &mut Transaction<'_, Postgres>,
    profile: &UserProfile,
) -> Result<(), AppError> {
    let permissions: Vec<&str> = profile
        .custom_permissions
        .iter()
        .map(|p| p.as_str())
        .collect();

    sqlx::query(
        "UPDATE profiles
        SET role = $2, custom_permissions = $3, is_active = $4, updated_at = NOW()
        WHERE id = $1",
    )
    .bind(profile.id)
    .bind(profile.role.as_str())
    .bind(&permissions)
    .bind(profile.is_active)
    .execute(&mut **tx)
    .await
    .map_err(AppError::database)?;

    Ok(())
}

async fn insert_audit_entry(
    tx: &mut Transaction<'_, Postgres>,
    entry: NewAuditEntry,
) -> Result<AuditEntry, AppError> {
    let row: AuditRow = sqlx::query_as(&format!(
        "INSERT INTO permission_audit_log
            (id, business_id, admin_id, target_user_id, action, changes)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {AUDIT_COLUMNS}"
    ))
    .bind(AuditEntryId::new())
    .bind(entry.business_id)
    .bind(entry.admin_id)
    .bind(entry.target_user_id)
    .bind(entry.action.as_str())
    .bind(Json(&entry.changes))
    .fetch_one(&mut **tx)
    .await
    .map_err(AppError::database)?;

    row.try_into()
}

#[async_trait]
impl TenantStore for PgTenantStore {
    #[instrument(skip(self))]
    async fn find_profile(&self, user_id: UserId) -> Result<Option<UserProfile>, AppError> {
        let row: Option<ProfileRow> =
            sqlx::query_as(&format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1"))
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(UserProfile::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn list_profiles(&self, business_id: BusinessId) -> Result<Vec<UserProfile>, AppError> {
        let rows: Vec<ProfileRow> = sqlx::query_as(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles
            WHERE business_id = $1
            ORDER BY full_name NULLS LAST, id"
        ))
        .bind(business_id)
        .fetch_all(&self.pool)
        .await?;

        collect(rows)
    }

    #[instrument(skip(self, mutation))]
    async fn apply_profile_mutation(
        &self,
        business_id: BusinessId,
        admin_id: UserId,
        target_id: UserId,
        mutation: &ProfileMutation,
    ) -> Result<(UserProfile, AuditEntry), AppError> {
        let mut tx = self.pool.begin().await?;

        // The row lock serializes concurrent mutations of one profile.
        let row: Option<ProfileRow> = sqlx::query_as(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1 FOR UPDATE"
        ))
        .bind(target_id)
        .fetch_optional(&mut *tx)
        .await?;

        let prior: UserProfile = row
            .ok_or_else(|| DomainError::not_found("user_profile", target_id))?
            .try_into()?;
        if prior.business_id != business_id {
            return Err(DomainError::TenantMismatch.into());
        }
        mutation.check_actor(admin_id, &prior)?;

        let next = mutation.apply(&prior);
        write_profile(&mut tx, &next).await?;

        let entry = insert_audit_entry(
            &mut tx,
            NewAuditEntry {
                business_id,
                admin_id,
                target_user_id: target_id,
                action: mutation.action(),
                changes: mutation.audit_changes(&prior),
            },
        )
        .await?;

        tx.commit().await?;
        Ok((next, entry))
    }

    #[instrument(skip(self))]
    async fn list_audit_entries(
        &self,
        business_id: BusinessId,
        target_id: Option<UserId>,
    ) -> Result<Vec<AuditEntry>, AppError> {
        let rows: Vec<AuditRow> = sqlx::query_as(&format!(
            "SELECT {AUDIT_COLUMNS} FROM permission_audit_log
            WHERE business_id = $1 AND ($2::uuid IS NULL OR target_user_id = $2)
            ORDER BY seq DESC"
        ))
        .bind(business_id)
        .bind(target_id)
        .fetch_all(&self.pool)
        .await?;

        collect(rows)
    }

    #[instrument(skip(self))]
    async fn list_shift_slots(&self, business_id: BusinessId) -> Result<Vec<ShiftSlot>, AppError> {
        let rows: Vec<ShiftSlotRow> = sqlx::query_as(&format!(
            "SELECT {SLOT_COLUMNS} FROM shift_slots WHERE business_id = $1
            ORDER BY start_time, end_time, slot_name, id"
        ))
        .bind(business_id)
        .fetch_all(&self.pool)
        .await?;

        let mut slots: Vec<ShiftSlot> = collect(rows)?;
        sort_slots(&mut slots);
        Ok(slots)
    }

    #[instrument(skip(self))]
    async fn find_shift_slot(
        &self,
        business_id: BusinessId,
        slot_id: ShiftSlotId,
    ) -> Result<Option<ShiftSlot>, AppError> {
        let row: Option<ShiftSlotRow> = sqlx::query_as(&format!(
            "SELECT {SLOT_COLUMNS} FROM shift_slots WHERE id = $1 AND business_id = $2"
        ))
        .bind(slot_id)
        .bind(business_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ShiftSlot::try_from).transpose()
    }

    #[instrument(skip(self, dto))]
    async fn create_shift_slot(
        &self,
        business_id: BusinessId,
        dto: &CreateShiftSlotDto,
    ) -> Result<ShiftSlot, AppError> {
        let required_count = i32::try_from(dto.required_count).map_err(AppError::bad_request)?;

        let row: ShiftSlotRow = sqlx::query_as(&format!(
            "INSERT INTO shift_slots
                (id, business_id, day_of_week, slot_name, start_time, end_time, required_count)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {SLOT_COLUMNS}"
        ))
        .bind(ShiftSlotId::new())
        .bind(business_id)
        .bind(dto.day_of_week.as_str())
        .bind(&dto.slot_name)
        .bind(dto.start_time.0)
        .bind(dto.end_time.0)
        .bind(required_count)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    #[instrument(skip(self, slot), fields(slot_id = %slot.id))]
    async fn update_shift_slot(
        &self,
        business_id: BusinessId,
        slot: &ShiftSlot,
    ) -> Result<bool, AppError> {
        let required_count = i32::try_from(slot.required_count).map_err(AppError::bad_request)?;

        let result = sqlx::query(
            "UPDATE shift_slots
            SET day_of_week = $3, slot_name = $4, start_time = $5, end_time = $6, required_count = $7
            WHERE id = $1 AND business_id = $2",
        )
        .bind(slot.id)
        .bind(business_id)
        .bind(slot.day_of_week.as_str())
        .bind(&slot.slot_name)
        .bind(slot.start_time.0)
        .bind(slot.end_time.0)
        .bind(required_count)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn delete_shift_slot(
        &self,
        business_id: BusinessId,
        slot_id: ShiftSlotId,
    ) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM shift_slots WHERE id = $1 AND business_id = $2")
            .bind(slot_id)
            .bind(business_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn list_availability(
        &self,
        business_id: BusinessId,
        week_start: NaiveDate,
    ) -> Result<Vec<AvailabilityRecord>, AppError> {
        let rows: Vec<AvailabilityRow> = sqlx::query_as(
            "SELECT business_id, user_id, week_start, date, available
            FROM weekly_availability
            WHERE business_id = $1 AND week_start = $2
            ORDER BY user_id, date",
        )
        .bind(business_id)
        .bind(week_start)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(AvailabilityRecord::from).collect())
    }

    #[instrument(skip(self, entries))]
    async fn replace_availability(
        &self,
        business_id: BusinessId,
        user_id: UserId,
        week_start: NaiveDate,
        entries: &[AvailabilityEntry],
    ) -> Result<Vec<AvailabilityRecord>, AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "DELETE FROM weekly_availability
            WHERE business_id = $1 AND user_id = $2 AND week_start = $3",
        )
        .bind(business_id)
        .bind(user_id)
        .bind(week_start)
        .execute(&mut *tx)
        .await?;

        let mut records = Vec::with_capacity(entries.len());
        for entry in entries {
            let row: AvailabilityRow = sqlx::query_as(
                "INSERT INTO weekly_availability (business_id, user_id, week_start, date, available)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING business_id, user_id, week_start, date, available",
            )
            .bind(business_id)
            .bind(user_id)
            .bind(week_start)
            .bind(entry.date)
            .bind(entry.available)
            .fetch_one(&mut *tx)
            .await?;
            records.push(row.into());
        }

        tx.commit().await?;
        Ok(records)
    }

    #[instrument(skip(self))]
    async fn list_week_shifts(
        &self,
        business_id: BusinessId,
        week_start: NaiveDate,
    ) -> Result<Vec<PersistedShift>, AppError> {
        let rows: Vec<ShiftRow> = sqlx::query_as(&format!(
            "SELECT {SHIFT_COLUMNS} FROM shifts WHERE business_id = $1 AND week_start = $2"
        ))
        .bind(business_id)
        .bind(week_start)
        .fetch_all(&self.pool)
        .await?;

        let mut shifts: Vec<PersistedShift> = collect(rows)?;
        sort_shifts(&mut shifts);
        Ok(shifts)
    }

    #[instrument(skip(self, shifts), fields(count = shifts.len()))]
    async fn replace_week_shifts(
        &self,
        business_id: BusinessId,
        week_start: NaiveDate,
        shifts: &[ProposedShift],
    ) -> Result<Vec<PersistedShift>, AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM shifts WHERE business_id = $1 AND week_start = $2")
            .bind(business_id)
            .bind(week_start)
            .execute(&mut *tx)
            .await?;

        let mut persisted = Vec::with_capacity(shifts.len());
        for shift in shifts {
            let row: ShiftRow = sqlx::query_as(&format!(
                "INSERT INTO shifts
                    (id, business_id, week_start, employee_id, day_of_week, start_time, end_time)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING {SHIFT_COLUMNS}"
            ))
            .bind(ShiftId::new())
            .bind(business_id)
            .bind(week_start)
            .bind(shift.employee_id)
            .bind(shift.day.as_str())
            .bind(shift.start_time.0)
            .bind(shift.end_time.0)
            .fetch_one(&mut *tx)
            .await?;
            persisted.push(PersistedShift::try_from(row)?);
        }

        tx.commit().await?;
        sort_shifts(&mut persisted);
        Ok(persisted)
    }

    #[instrument(skip(self))]
    async fn delete_week_shifts(
        &self,
        business_id: BusinessId,
        week_start: NaiveDate,
    ) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM shifts WHERE business_id = $1 AND week_start = $2")
            .bind(business_id)
            .bind(week_start)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
