use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::NaiveDate;
use shiftdesk_core::{AppError, Permission, Requirement};
use shiftdesk_models::ids::ShiftSlotId;
use shiftdesk_models::profiles::MessageResponse;
use shiftdesk_models::schedule::{
    AvailabilityResponse, CreateShiftSlotDto, EmployeeAvailability, PersistedShift,
    ScheduleProposalDto, ScheduleSubmissionResponse, SetAvailabilityDto, ShiftSlot,
    UpdateShiftSlotDto, ValidationReport, WeekCoverageResponse,
};
use tracing::instrument;

use crate::middleware::identity::AuthUser;
use crate::modules::schedule::service::ScheduleService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

fn view() -> Requirement {
    Requirement::Permission(Permission::ViewSchedule)
}

fn edit() -> Requirement {
    Requirement::Permission(Permission::EditSchedule)
}

fn edit_or_generate() -> Requirement {
    Requirement::AnyOf(vec![Permission::EditSchedule, Permission::GenerateSchedule])
}

#[utoipa::path(
    get,
    path = "/api/schedule/shift-slots",
    responses(
        (status = 200, description = "Shift slots of the business", body = Vec<ShiftSlot>),
        (status = 403, description = "Requires view_schedule", body = crate::docs::ErrorResponse)
    ),
    tag = "Schedule",
    security(("user_id" = [], "business_id" = []))
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id()))]
pub async fn list_shift_slots(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<ShiftSlot>>, AppError> {
    state.authorize(&auth_user, view())?;

    let slots = ScheduleService::list_slots(state.store.as_ref(), auth_user.business_id()).await?;

    Ok(Json(slots))
}

#[utoipa::path(
    post,
    path = "/api/schedule/shift-slots",
    request_body = CreateShiftSlotDto,
    responses(
        (status = 201, description = "Shift slot created", body = ShiftSlot),
        (status = 403, description = "Requires edit_schedule", body = crate::docs::ErrorResponse),
        (status = 422, description = "Invalid slot", body = crate::docs::ErrorResponse)
    ),
    tag = "Schedule",
    security(("user_id" = [], "business_id" = []))
)]
#[instrument(skip(state, auth_user, dto), fields(user_id = %auth_user.user_id()))]
pub async fn create_shift_slot(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateShiftSlotDto>,
) -> Result<(StatusCode, Json<ShiftSlot>), AppError> {
    state.authorize(&auth_user, edit())?;

    let slot =
        ScheduleService::create_slot(state.store.as_ref(), auth_user.business_id(), dto).await?;

    Ok((StatusCode::CREATED, Json(slot)))
}

#[utoipa::path(
    put,
    path = "/api/schedule/shift-slots/{slot_id}",
    params(
        ("slot_id" = String, Path, description = "Shift slot ID")
    ),
    request_body = UpdateShiftSlotDto,
    responses(
        (status = 200, description = "Shift slot updated", body = ShiftSlot),
        (status = 403, description = "Requires edit_schedule", body = crate::docs::ErrorResponse),
        (status = 404, description = "Shift slot not found", body = crate::docs::ErrorResponse),
        (status = 422, description = "Invalid slot", body = crate::docs::ErrorResponse)
    ),
    tag = "Schedule",
    security(("user_id" = [], "business_id" = []))
)]
#[instrument(skip(state, auth_user, dto), fields(user_id = %auth_user.user_id()))]
pub async fn update_shift_slot(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(slot_id): Path<ShiftSlotId>,
    ValidatedJson(dto): ValidatedJson<UpdateShiftSlotDto>,
) -> Result<Json<ShiftSlot>, AppError> {
    state.authorize(&auth_user, edit())?;

    let slot = ScheduleService::update_slot(
        state.store.as_ref(),
        auth_user.business_id(),
        slot_id,
        dto,
    )
    .await?;

    Ok(Json(slot))
}

#[utoipa::path(
    delete,
    path = "/api/schedule/shift-slots/{slot_id}",
    params(
        ("slot_id" = String, Path, description = "Shift slot ID")
    ),
    responses(
        (status = 204, description = "Shift slot deleted"),
        (status = 403, description = "Requires edit_schedule", body = crate::docs::ErrorResponse),
        (status = 404, description = "Shift slot not found", body = crate::docs::ErrorResponse)
    ),
    tag = "Schedule",
    security(("user_id" = [], "business_id" = []))
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id()))]
pub async fn delete_shift_slot(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(slot_id): Path<ShiftSlotId>,
) -> Result<StatusCode, AppError> {
    state.authorize(&auth_user, edit())?;

    ScheduleService::delete_slot(state.store.as_ref(), auth_user.business_id(), slot_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/schedule/validate",
    request_body = ScheduleProposalDto,
    responses(
        (status = 200, description = "Validation report, valid or not", body = ValidationReport),
        (status = 403, description = "Requires edit_schedule or generate_schedule", body = crate::docs::ErrorResponse)
    ),
    tag = "Schedule",
    security(("user_id" = [], "business_id" = []))
)]
#[instrument(skip(state, auth_user, proposal), fields(user_id = %auth_user.user_id()))]
pub async fn validate_schedule(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(proposal): ValidatedJson<ScheduleProposalDto>,
) -> Result<Json<ValidationReport>, AppError> {
    state.authorize(&auth_user, edit_or_generate())?;

    let report = ScheduleService::validate_proposal(
        state.store.as_ref(),
        auth_user.business_id(),
        &proposal,
    )
    .await?;

    Ok(Json(report))
}

#[utoipa::path(
    post,
    path = "/api/schedule/submit",
    request_body = ScheduleProposalDto,
    responses(
        (status = 201, description = "Week replaced with the proposal", body = ScheduleSubmissionResponse),
        (status = 403, description = "Requires edit_schedule or generate_schedule", body = crate::docs::ErrorResponse),
        (status = 422, description = "Proposal violates availability or double booking", body = crate::docs::ErrorResponse)
    ),
    tag = "Schedule",
    security(("user_id" = [], "business_id" = []))
)]
#[instrument(skip(state, auth_user, proposal), fields(user_id = %auth_user.user_id()))]
pub async fn submit_schedule(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(proposal): ValidatedJson<ScheduleProposalDto>,
) -> Result<(StatusCode, Json<ScheduleSubmissionResponse>), AppError> {
    state.authorize(&auth_user, edit_or_generate())?;

    let response = ScheduleService::submit_schedule(
        state.store.as_ref(),
        auth_user.business_id(),
        proposal,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/schedule/shifts/{week_start}",
    params(
        ("week_start" = String, Path, description = "First day of the week (YYYY-MM-DD)")
    ),
    responses(
        (status = 200, description = "Persisted shifts of the week", body = Vec<PersistedShift>),
        (status = 403, description = "Requires view_schedule", body = crate::docs::ErrorResponse)
    ),
    tag = "Schedule",
    security(("user_id" = [], "business_id" = []))
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id()))]
pub async fn get_week_shifts(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(week_start): Path<NaiveDate>,
) -> Result<Json<Vec<PersistedShift>>, AppError> {
    state.authorize(&auth_user, view())?;

    let shifts =
        ScheduleService::week_shifts(state.store.as_ref(), auth_user.business_id(), week_start)
            .await?;

    Ok(Json(shifts))
}

#[utoipa::path(
    delete,
    path = "/api/schedule/shifts/{week_start}",
    params(
        ("week_start" = String, Path, description = "First day of the week (YYYY-MM-DD)")
    ),
    responses(
        (status = 200, description = "Week cleared", body = MessageResponse),
        (status = 403, description = "Requires edit_schedule", body = crate::docs::ErrorResponse)
    ),
    tag = "Schedule",
    security(("user_id" = [], "business_id" = []))
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id()))]
pub async fn delete_week_shifts(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(week_start): Path<NaiveDate>,
) -> Result<Json<MessageResponse>, AppError> {
    state.authorize(&auth_user, edit())?;

    let deleted =
        ScheduleService::delete_week(state.store.as_ref(), auth_user.business_id(), week_start)
            .await?;

    Ok(Json(MessageResponse::new(format!(
        "Deleted {} shift(s)",
        deleted
    ))))
}

#[utoipa::path(
    get,
    path = "/api/schedule/coverage/{week_start}",
    params(
        ("week_start" = String, Path, description = "First day of the week (YYYY-MM-DD)")
    ),
    responses(
        (status = 200, description = "Slot and day coverage of the persisted week", body = WeekCoverageResponse),
        (status = 403, description = "Requires view_schedule", body = crate::docs::ErrorResponse)
    ),
    tag = "Schedule",
    security(("user_id" = [], "business_id" = []))
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id()))]
pub async fn get_week_coverage(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(week_start): Path<NaiveDate>,
) -> Result<Json<WeekCoverageResponse>, AppError> {
    state.authorize(&auth_user, view())?;

    let coverage =
        ScheduleService::week_coverage(state.store.as_ref(), auth_user.business_id(), week_start)
            .await?;

    Ok(Json(coverage))
}

#[utoipa::path(
    get,
    path = "/api/schedule/availability/{week_start}",
    params(
        ("week_start" = String, Path, description = "First day of the week (YYYY-MM-DD)")
    ),
    responses(
        (status = 200, description = "Availability of every active employee", body = Vec<EmployeeAvailability>),
        (status = 403, description = "Requires view_schedule and view_employees", body = crate::docs::ErrorResponse)
    ),
    tag = "Schedule",
    security(("user_id" = [], "business_id" = []))
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id()))]
pub async fn get_week_availability(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(week_start): Path<NaiveDate>,
) -> Result<Json<Vec<EmployeeAvailability>>, AppError> {
    state.authorize(
        &auth_user,
        Requirement::AllOf(vec![Permission::ViewSchedule, Permission::ViewEmployees]),
    )?;

    let employees = ScheduleService::employees_for_week(
        state.store.as_ref(),
        auth_user.business_id(),
        week_start,
    )
    .await?;

    Ok(Json(employees))
}

#[utoipa::path(
    get,
    path = "/api/schedule/my-availability/{week_start}",
    params(
        ("week_start" = String, Path, description = "First day of the week (YYYY-MM-DD)")
    ),
    responses(
        (status = 200, description = "Calling user's availability", body = AvailabilityResponse),
        (status = 403, description = "Requires set_availability", body = crate::docs::ErrorResponse)
    ),
    tag = "Schedule",
    security(("user_id" = [], "business_id" = []))
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id()))]
pub async fn get_my_availability(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(week_start): Path<NaiveDate>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    state.authorize(&auth_user, Requirement::Permission(Permission::SetAvailability))?;

    let availability = ScheduleService::my_availability(
        state.store.as_ref(),
        auth_user.business_id(),
        auth_user.user_id(),
        week_start,
    )
    .await?;

    Ok(Json(availability))
}

#[utoipa::path(
    put,
    path = "/api/schedule/my-availability",
    request_body = SetAvailabilityDto,
    responses(
        (status = 200, description = "Availability replaced", body = AvailabilityResponse),
        (status = 403, description = "Requires set_availability", body = crate::docs::ErrorResponse),
        (status = 422, description = "Date outside the week or repeated", body = crate::docs::ErrorResponse)
    ),
    tag = "Schedule",
    security(("user_id" = [], "business_id" = []))
)]
#[instrument(skip(state, auth_user, dto), fields(user_id = %auth_user.user_id()))]
pub async fn set_my_availability(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<SetAvailabilityDto>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    state.authorize(&auth_user, Requirement::Permission(Permission::SetAvailability))?;

    let availability = ScheduleService::set_availability(
        state.store.as_ref(),
        auth_user.business_id(),
        auth_user.user_id(),
        dto,
    )
    .await?;

    Ok(Json(availability))
}
