use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

use super::controller::{
    create_shift_slot, delete_shift_slot, delete_week_shifts, get_my_availability,
    get_week_availability, get_week_coverage, get_week_shifts, list_shift_slots,
    set_my_availability, submit_schedule, update_shift_slot, validate_schedule,
};

pub fn init_schedule_router() -> Router<AppState> {
    Router::new()
        .route("/shift-slots", get(list_shift_slots).post(create_shift_slot))
        .route(
            "/shift-slots/{slot_id}",
            put(update_shift_slot).delete(delete_shift_slot),
        )
        .route("/validate", post(validate_schedule))
        .route("/submit", post(submit_schedule))
        .route(
            "/shifts/{week_start}",
            get(get_week_shifts).delete(delete_week_shifts),
        )
        .route("/coverage/{week_start}", get(get_week_coverage))
        .route("/availability/{week_start}", get(get_week_availability))
        .route("/my-availability", put(set_my_availability))
        .route("/my-availability/{week_start}", get(get_my_availability))
}
