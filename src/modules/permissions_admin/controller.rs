use axum::{
    Json,
    extract::{Path, Query, State},
};
use shiftdesk_core::{AppError, Permission, Requirement};
use shiftdesk_models::audit::AuditEntry;
use shiftdesk_models::ids::UserId;
use shiftdesk_models::profiles::{
    AuditQuery, MessageResponse, PermissionCatalogResponse, ProfileMutation,
    UpdateUserPermissionsDto, UpdateUserRoleDto, UserPermissionsResponse,
};
use tracing::instrument;

use crate::middleware::identity::AuthUser;
use crate::modules::permissions_admin::service::PermissionsAdminService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

const MANAGE: Requirement = Requirement::Permission(Permission::ManagePermissions);

#[utoipa::path(
    get,
    path = "/api/admin/permissions/catalog",
    responses(
        (status = 200, description = "Every permission and the employee defaults", body = PermissionCatalogResponse),
        (status = 401, description = "Missing identity headers", body = crate::docs::ErrorResponse),
        (status = 403, description = "Requires manage_permissions", body = crate::docs::ErrorResponse)
    ),
    tag = "Permissions",
    security(("user_id" = [], "business_id" = []))
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id()))]
pub async fn get_catalog(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<PermissionCatalogResponse>, AppError> {
    state.authorize(&auth_user, MANAGE)?;

    Ok(Json(PermissionCatalogResponse::from_catalog(&state.catalog)))
}

#[utoipa::path(
    get,
    path = "/api/admin/permissions/users",
    responses(
        (status = 200, description = "Users of the business with their permissions", body = Vec<UserPermissionsResponse>),
        (status = 401, description = "Missing identity headers", body = crate::docs::ErrorResponse),
        (status = 403, description = "Requires manage_permissions", body = crate::docs::ErrorResponse)
    ),
    tag = "Permissions",
    security(("user_id" = [], "business_id" = []))
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id()))]
pub async fn list_users(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<UserPermissionsResponse>>, AppError> {
    state.authorize(&auth_user, MANAGE)?;

    let users = PermissionsAdminService::list_users(
        state.store.as_ref(),
        &state.catalog,
        auth_user.business_id(),
    )
    .await?;

    Ok(Json(users))
}

#[utoipa::path(
    get,
    path = "/api/admin/permissions/users/{user_id}",
    params(
        ("user_id" = String, Path, description = "Target user ID")
    ),
    responses(
        (status = 200, description = "User permissions", body = UserPermissionsResponse),
        (status = 403, description = "Requires manage_permissions or user is in another business", body = crate::docs::ErrorResponse),
        (status = 404, description = "User not found", body = crate::docs::ErrorResponse)
    ),
    tag = "Permissions",
    security(("user_id" = [], "business_id" = []))
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id()))]
pub async fn get_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(target_id): Path<UserId>,
) -> Result<Json<UserPermissionsResponse>, AppError> {
    state.authorize(&auth_user, MANAGE)?;

    let user = PermissionsAdminService::get_user(
        state.store.as_ref(),
        &state.catalog,
        auth_user.business_id(),
        target_id,
    )
    .await?;

    Ok(Json(user))
}

#[utoipa::path(
    put,
    path = "/api/admin/permissions/users/{user_id}/permissions",
    params(
        ("user_id" = String, Path, description = "Target user ID")
    ),
    request_body = UpdateUserPermissionsDto,
    responses(
        (status = 200, description = "Custom permissions replaced", body = UserPermissionsResponse),
        (status = 400, description = "Unknown permission id", body = crate::docs::ErrorResponse),
        (status = 403, description = "Denied, other business or self-modification", body = crate::docs::ErrorResponse),
        (status = 404, description = "User not found", body = crate::docs::ErrorResponse)
    ),
    tag = "Permissions",
    security(("user_id" = [], "business_id" = []))
)]
#[instrument(skip(state, auth_user, dto), fields(user_id = %auth_user.user_id()))]
pub async fn update_user_permissions(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(target_id): Path<UserId>,
    ValidatedJson(dto): ValidatedJson<UpdateUserPermissionsDto>,
) -> Result<Json<UserPermissionsResponse>, AppError> {
    state.authorize(&auth_user, MANAGE)?;

    let (updated, _) = PermissionsAdminService::apply_mutation(
        state.store.as_ref(),
        &auth_user.profile,
        target_id,
        ProfileMutation::CustomPermissions(dto.into_set()),
    )
    .await?;

    Ok(Json(UserPermissionsResponse::from_profile(
        &updated,
        &state.catalog,
    )))
}

#[utoipa::path(
    put,
    path = "/api/admin/permissions/users/{user_id}/role",
    params(
        ("user_id" = String, Path, description = "Target user ID")
    ),
    request_body = UpdateUserRoleDto,
    responses(
        (status = 200, description = "Role changed", body = UserPermissionsResponse),
        (status = 400, description = "Unknown role", body = crate::docs::ErrorResponse),
        (status = 403, description = "Denied, other business or self-modification", body = crate::docs::ErrorResponse),
        (status = 404, description = "User not found", body = crate::docs::ErrorResponse)
    ),
    tag = "Permissions",
    security(("user_id" = [], "business_id" = []))
)]
#[instrument(skip(state, auth_user, dto), fields(user_id = %auth_user.user_id()))]
pub async fn update_user_role(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(target_id): Path<UserId>,
    ValidatedJson(dto): ValidatedJson<UpdateUserRoleDto>,
) -> Result<Json<UserPermissionsResponse>, AppError> {
    state.authorize(&auth_user, MANAGE)?;

    let (updated, _) = PermissionsAdminService::apply_mutation(
        state.store.as_ref(),
        &auth_user.profile,
        target_id,
        ProfileMutation::Role(dto.role),
    )
    .await?;

    Ok(Json(UserPermissionsResponse::from_profile(
        &updated,
        &state.catalog,
    )))
}

#[utoipa::path(
    put,
    path = "/api/admin/permissions/users/{user_id}/deactivate",
    params(
        ("user_id" = String, Path, description = "Target user ID")
    ),
    responses(
        (status = 200, description = "User deactivated", body = MessageResponse),
        (status = 403, description = "Denied, other business or self-deactivation", body = crate::docs::ErrorResponse),
        (status = 404, description = "User not found", body = crate::docs::ErrorResponse)
    ),
    tag = "Permissions",
    security(("user_id" = [], "business_id" = []))
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id()))]
pub async fn deactivate_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(target_id): Path<UserId>,
) -> Result<Json<MessageResponse>, AppError> {
    state.authorize(&auth_user, MANAGE)?;

    PermissionsAdminService::apply_mutation(
        state.store.as_ref(),
        &auth_user.profile,
        target_id,
        ProfileMutation::Active(false),
    )
    .await?;

    Ok(Json(MessageResponse::new("User deactivated successfully")))
}

#[utoipa::path(
    put,
    path = "/api/admin/permissions/users/{user_id}/activate",
    params(
        ("user_id" = String, Path, description = "Target user ID")
    ),
    responses(
        (status = 200, description = "User activated", body = MessageResponse),
        (status = 403, description = "Denied or user is in another business", body = crate::docs::ErrorResponse),
        (status = 404, description = "User not found", body = crate::docs::ErrorResponse)
    ),
    tag = "Permissions",
    security(("user_id" = [], "business_id" = []))
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id()))]
pub async fn activate_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(target_id): Path<UserId>,
) -> Result<Json<MessageResponse>, AppError> {
    state.authorize(&auth_user, MANAGE)?;

    PermissionsAdminService::apply_mutation(
        state.store.as_ref(),
        &auth_user.profile,
        target_id,
        ProfileMutation::Active(true),
    )
    .await?;

    Ok(Json(MessageResponse::new("User activated successfully")))
}

#[utoipa::path(
    get,
    path = "/api/admin/permissions/audit",
    params(AuditQuery),
    responses(
        (status = 200, description = "Audit entries, newest first", body = Vec<AuditEntry>),
        (status = 403, description = "Requires admin role", body = crate::docs::ErrorResponse)
    ),
    tag = "Permissions",
    security(("user_id" = [], "business_id" = []))
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id()))]
pub async fn list_audit_log(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<AuditQuery>,
) -> Result<Json<Vec<AuditEntry>>, AppError> {
    state.authorize(&auth_user, Requirement::Admin)?;

    let entries = PermissionsAdminService::list_audit(
        state.store.as_ref(),
        auth_user.business_id(),
        query.user_id,
    )
    .await?;

    Ok(Json(entries))
}

/// Effective permissions of the calling user. Needs no permission, only a
/// known profile.
#[utoipa::path(
    get,
    path = "/api/me/permissions",
    responses(
        (status = 200, description = "Calling user's permissions", body = UserPermissionsResponse),
        (status = 401, description = "Missing identity headers or unknown user", body = crate::docs::ErrorResponse)
    ),
    tag = "Permissions",
    security(("user_id" = [], "business_id" = []))
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id()))]
pub async fn get_my_permissions(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<UserPermissionsResponse>, AppError> {
    Ok(Json(UserPermissionsResponse::from_profile(
        &auth_user.profile,
        &state.catalog,
    )))
}
