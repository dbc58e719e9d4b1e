use axum::{
    Router,
    routing::{get, put},
};

use crate::state::AppState;

use super::controller::{
    activate_user, deactivate_user, get_catalog, get_my_permissions, get_user, list_audit_log,
    list_users, update_user_permissions, update_user_role,
};

pub fn init_permissions_admin_router() -> Router<AppState> {
    Router::new()
        .route("/catalog", get(get_catalog))
        .route("/users", get(list_users))
        .route("/users/{user_id}", get(get_user))
        .route("/users/{user_id}/permissions", put(update_user_permissions))
        .route("/users/{user_id}/role", put(update_user_role))
        .route("/users/{user_id}/deactivate", put(deactivate_user))
        .route("/users/{user_id}/activate", put(activate_user))
        .route("/audit", get(list_audit_log))
}

pub fn init_me_router() -> Router<AppState> {
    Router::new().route("/permissions", get(get_my_permissions))
}
