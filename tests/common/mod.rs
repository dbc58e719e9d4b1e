#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use shiftdesk::router::init_router;
use shiftdesk::shiftdesk_config::{CorsConfig, IdentityConfig};
use shiftdesk::shiftdesk_core::{Permission, PermissionSet, Role};
use shiftdesk::shiftdesk_db::MemoryTenantStore;
use shiftdesk::shiftdesk_models::ids::{BusinessId, UserId};
use shiftdesk::shiftdesk_models::profiles::UserProfile;
use shiftdesk::state::AppState;
use tower::ServiceExt;

pub const BUSINESS: BusinessId = BusinessId::from_u128(0xb1);
pub const OTHER_BUSINESS: BusinessId = BusinessId::from_u128(0xb2);

pub const ADMIN: UserId = UserId::from_u128(0xa1);
/// Employee with `manage_permissions` granted on top of the defaults.
pub const MANAGER: UserId = UserId::from_u128(0xa2);
pub const EMPLOYEE: UserId = UserId::from_u128(0xe1);
/// Employee with `generate_schedule` granted.
pub const SCHEDULER: UserId = UserId::from_u128(0xe2);
/// Deactivated admin.
pub const INACTIVE_ADMIN: UserId = UserId::from_u128(0xa3);
pub const OUTSIDER: UserId = UserId::from_u128(0xe9);
pub const OTHER_ADMIN: UserId = UserId::from_u128(0xa9);

pub struct TestApp {
    pub app: Router,
    pub store: Arc<MemoryTenantStore>,
}

pub fn profile(
    id: UserId,
    business_id: BusinessId,
    name: &str,
    role: Role,
    custom: &[Permission],
    is_active: bool,
) -> UserProfile {
    UserProfile {
        id,
        business_id,
        full_name: Some(name.to_string()),
        email: Some(format!("{}@example.com", name.to_lowercase())),
        role,
        custom_permissions: custom.iter().copied().collect::<PermissionSet>(),
        is_active,
    }
}

pub fn setup_test_app() -> TestApp {
    let store = Arc::new(MemoryTenantStore::new());
    for p in [
        profile(ADMIN, BUSINESS, "Ada", Role::Admin, &[], true),
        profile(
            MANAGER,
            BUSINESS,
            "Mona",
            Role::Employee,
            &[Permission::ManagePermissions],
            true,
        ),
        profile(EMPLOYEE, BUSINESS, "Eve", Role::Employee, &[], true),
        profile(
            SCHEDULER,
            BUSINESS,
            "Sam",
            Role::Employee,
            &[Permission::GenerateSchedule],
            true,
        ),
        profile(INACTIVE_ADMIN, BUSINESS, "Ian", Role::Admin, &[], false),
        profile(OUTSIDER, OTHER_BUSINESS, "Otto", Role::Employee, &[], true),
        profile(OTHER_ADMIN, OTHER_BUSINESS, "Oona", Role::Admin, &[], true),
    ] {
        store.insert_profile(p).unwrap();
    }

    let state = AppState::new(
        store.clone(),
        IdentityConfig::default(),
        CorsConfig::default(),
    );

    TestApp {
        app: init_router(state),
        store,
    }
}

/// Identity headers for a seeded user in their own business.
pub fn as_user(user: UserId) -> Option<(UserId, BusinessId)> {
    let business = if user == OUTSIDER || user == OTHER_ADMIN {
        OTHER_BUSINESS
    } else {
        BUSINESS
    };
    Some((user, business))
}

/// Sends one request and returns the status with the JSON body, or `Null`
/// when the body is empty.
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    identity: Option<(UserId, BusinessId)>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some((user, business)) = identity {
        builder = builder
            .header("x-user-id", user.to_string())
            .header("x-business-id", business.to_string());
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}
