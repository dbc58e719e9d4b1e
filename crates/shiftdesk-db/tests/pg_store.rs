//! Postgres store tests. They need `DATABASE_URL` pointing at a server where
//! sqlx may create scratch databases, so they are ignored by default:
//!
//! ```sh
//! cargo test -p shiftdesk-db --test pg_store -- --ignored
//! ```

use chrono::NaiveDate;
use shiftdesk_core::{AdminAction, DomainError, Permission, Role};
use shiftdesk_db::{PgPool, PgTenantStore, TenantStore};
use shiftdesk_models::ids::{BusinessId, UserId};
use shiftdesk_models::profiles::ProfileMutation;
use shiftdesk_models::schedule::{ClockTime, DayCode, ProposedShift};

const BUSINESS: BusinessId = BusinessId::from_u128(0xb1);
const OTHER_BUSINESS: BusinessId = BusinessId::from_u128(0xb2);
const ADMIN: UserId = UserId::from_u128(0xa1);
const EMPLOYEE: UserId = UserId::from_u128(0xe1);
const OUTSIDER: UserId = UserId::from_u128(0xe2);

async fn seed(pool: &PgPool) {
    for (id, business, role) in [
        (ADMIN, BUSINESS, "admin"),
        (EMPLOYEE, BUSINESS, "employee"),
        (OUTSIDER, OTHER_BUSINESS, "employee"),
    ] {
        sqlx::query(
            "INSERT INTO profiles (id, business_id, full_name, role) VALUES ($1, $2, $3, $4)",
        )
        .bind(id)
        .bind(business)
        .bind(format!("user {}", id))
        .bind(role)
        .execute(pool)
        .await
        .unwrap();
    }
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_mutation_and_audit_commit_together(pool: PgPool) {
    seed(&pool).await;
    let store = PgTenantStore::new(pool.clone());

    let (updated, entry) = store
        .apply_profile_mutation(
            BUSINESS,
            ADMIN,
            EMPLOYEE,
            &ProfileMutation::CustomPermissions([Permission::EditSchedule].into_iter().collect()),
        )
        .await
        .unwrap();
    assert!(updated.custom_permissions.contains(&Permission::EditSchedule));
    assert_eq!(entry.action, AdminAction::UpdatePermissions);

    let entries = store.list_audit_entries(BUSINESS, Some(EMPLOYEE)).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id, entry.id);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_mutation_of_other_tenant_is_rejected(pool: PgPool) {
    seed(&pool).await;
    let store = PgTenantStore::new(pool);

    let err = store
        .apply_profile_mutation(BUSINESS, ADMIN, OUTSIDER, &ProfileMutation::Role(Role::Admin))
        .await
        .unwrap_err();
    assert_eq!(err.domain(), Some(&DomainError::TenantMismatch));
    assert!(store.list_audit_entries(BUSINESS, None).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_audit_log_rejects_updates(pool: PgPool) {
    seed(&pool).await;
    let store = PgTenantStore::new(pool.clone());
    store
        .apply_profile_mutation(BUSINESS, ADMIN, EMPLOYEE, &ProfileMutation::Active(false))
        .await
        .unwrap();

    let result = sqlx::query("UPDATE permission_audit_log SET action = 'activate_user'")
        .execute(&pool)
        .await;
    assert!(result.is_err());

    let result = sqlx::query("DELETE FROM permission_audit_log")
        .execute(&pool)
        .await;
    assert!(result.is_err());
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_unknown_permission_on_employee_row_is_a_load_error(pool: PgPool) {
    seed(&pool).await;
    sqlx::query("UPDATE profiles SET custom_permissions = '{fly}' WHERE id = $1")
        .bind(EMPLOYEE)
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("UPDATE profiles SET custom_permissions = '{fly}' WHERE id = $1")
        .bind(ADMIN)
        .execute(&pool)
        .await
        .unwrap();

    let store = PgTenantStore::new(pool);
    assert!(store.find_profile(EMPLOYEE).await.is_err());

    let admin = store.find_profile(ADMIN).await.unwrap().unwrap();
    assert!(admin.custom_permissions.is_empty());
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_week_shifts_roundtrip_times(pool: PgPool) {
    seed(&pool).await;
    let store = PgTenantStore::new(pool);
    let week = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

    store
        .replace_week_shifts(
            BUSINESS,
            week,
            &[ProposedShift {
                employee_id: EMPLOYEE,
                day: DayCode::Fri,
                start_time: "09:00".parse::<ClockTime>().unwrap(),
                end_time: "13:00:00".parse::<ClockTime>().unwrap(),
            }],
        )
        .await
        .unwrap();

    let shifts = store.list_week_shifts(BUSINESS, week).await.unwrap();
    assert_eq!(shifts.len(), 1);
    assert_eq!(shifts[0].day, DayCode::Fri);
    assert_eq!(shifts[0].end_time, ClockTime::hm(13, 0).unwrap());
    assert!(store.list_week_shifts(OTHER_BUSINESS, week).await.unwrap().is_empty());
}
