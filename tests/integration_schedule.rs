mod common;

use axum::http::StatusCode;
use common::{
    ADMIN, EMPLOYEE, MANAGER, OTHER_ADMIN, SCHEDULER, as_user, send, setup_test_app,
};
use serde_json::{Value, json};

const WEEK: &str = "2024-01-01";

fn shift(employee: impl ToString, day: &str) -> Value {
    json!({
        "employee_id": employee.to_string(),
        "day": day,
        "start_time": "09:00",
        "end_time": "13:00",
    })
}

fn morning_slot(day: &str, required: u32) -> Value {
    json!({
        "day_of_week": day,
        "slot_name": "morning",
        "start_time": "09:00",
        "end_time": "13:00:00",
        "required_count": required,
    })
}

#[tokio::test]
async fn test_shift_slot_lifecycle() {
    let t = setup_test_app();

    let (status, slot) = send(
        &t.app,
        "POST",
        "/api/schedule/shift-slots",
        as_user(ADMIN),
        Some(morning_slot("fri", 2)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(slot["end_time"], "13:00");
    let slot_uri = format!("/api/schedule/shift-slots/{}", slot["id"].as_str().unwrap());

    let (status, body) = send(
        &t.app,
        "GET",
        "/api/schedule/shift-slots",
        as_user(EMPLOYEE),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = send(
        &t.app,
        "PUT",
        &slot_uri,
        as_user(ADMIN),
        Some(json!({"required_count": 3})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["required_count"], 3);
    assert_eq!(body["slot_name"], "morning");

    let (status, _) = send(&t.app, "DELETE", &slot_uri, as_user(ADMIN), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&t.app, "DELETE", &slot_uri, as_user(ADMIN), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_employee_cannot_edit_slots() {
    let t = setup_test_app();

    let (status, body) = send(
        &t.app,
        "POST",
        "/api/schedule/shift-slots",
        as_user(EMPLOYEE),
        Some(morning_slot("mon", 1)),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["kind"], "permission_denied");
}

#[tokio::test]
async fn test_invalid_slot_is_unprocessable() {
    let t = setup_test_app();

    let (status, _) = send(
        &t.app,
        "POST",
        "/api/schedule/shift-slots",
        as_user(ADMIN),
        Some(morning_slot("mon", 0)),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send(
        &t.app,
        "POST",
        "/api/schedule/shift-slots",
        as_user(ADMIN),
        Some(morning_slot("someday", 1)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_slots_are_invisible_to_other_businesses() {
    let t = setup_test_app();

    let (_, slot) = send(
        &t.app,
        "POST",
        "/api/schedule/shift-slots",
        as_user(ADMIN),
        Some(morning_slot("fri", 2)),
    )
    .await;
    let slot_uri = format!("/api/schedule/shift-slots/{}", slot["id"].as_str().unwrap());

    let (_, body) = send(
        &t.app,
        "GET",
        "/api/schedule/shift-slots",
        as_user(OTHER_ADMIN),
        None,
    )
    .await;
    assert_eq!(body, json!([]));

    let (status, _) = send(
        &t.app,
        "PUT",
        &slot_uri,
        as_user(OTHER_ADMIN),
        Some(json!({"required_count": 9})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&t.app, "DELETE", &slot_uri, as_user(OTHER_ADMIN), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_validate_reports_every_violation() {
    let t = setup_test_app();

    // Eve is only available on Monday.
    let (status, _) = send(
        &t.app,
        "PUT",
        "/api/schedule/my-availability",
        as_user(EMPLOYEE),
        Some(json!({
            "week_start": WEEK,
            "entries": [
                {"date": "2024-01-01", "available": true},
                {"date": "2024-01-02", "available": false}
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, report) = send(
        &t.app,
        "POST",
        "/api/schedule/validate",
        as_user(SCHEDULER),
        Some(json!({
            "week_start": WEEK,
            "shifts": [
                shift(EMPLOYEE, "mon"),
                shift(EMPLOYEE, "mon"),
                shift(EMPLOYEE, "tue"),
                shift(MANAGER, "sun"),
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["valid"], false);
    assert_eq!(report["warnings"], json!([]));
    assert_eq!(
        report["errors"],
        json!([
            format!("Employee {} scheduled twice on mon", EMPLOYEE),
            format!("Employee {} (Eve) not available on tue", EMPLOYEE),
        ])
    );
}

#[tokio::test]
async fn test_admin_is_not_a_scheduling_candidate() {
    let t = setup_test_app();

    let (_, report) = send(
        &t.app,
        "POST",
        "/api/schedule/validate",
        as_user(ADMIN),
        Some(json!({"week_start": WEEK, "shifts": [shift(ADMIN, "wed")]})),
    )
    .await;
    assert_eq!(
        report["errors"],
        json!([format!("Employee {} (Unknown) not available on wed", ADMIN)])
    );
}

#[tokio::test]
async fn test_employee_cannot_validate_or_submit() {
    let t = setup_test_app();
    let proposal = json!({"week_start": WEEK, "shifts": []});

    for path in ["/api/schedule/validate", "/api/schedule/submit"] {
        let (status, body) = send(
            &t.app,
            "POST",
            path,
            as_user(EMPLOYEE),
            Some(proposal.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["required"]["type"], "any_of");
    }
}

#[tokio::test]
async fn test_rejected_submission_persists_nothing() {
    let t = setup_test_app();

    let (status, body) = send(
        &t.app,
        "POST",
        "/api/schedule/submit",
        as_user(ADMIN),
        Some(json!({
            "week_start": WEEK,
            "shifts": [shift(EMPLOYEE, "mon"), shift(EMPLOYEE, "mon")]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "validation_failed");
    assert_eq!(body["errors"].as_array().unwrap().len(), 1);

    let (_, shifts) = send(
        &t.app,
        "GET",
        &format!("/api/schedule/shifts/{}", WEEK),
        as_user(ADMIN),
        None,
    )
    .await;
    assert_eq!(shifts, json!([]));
}

#[tokio::test]
async fn test_submit_replaces_week_and_reports_coverage() {
    let t = setup_test_app();

    for (day, required) in [("fri", 2), ("sat", 1)] {
        let (status, _) = send(
            &t.app,
            "POST",
            "/api/schedule/shift-slots",
            as_user(ADMIN),
            Some(morning_slot(day, required)),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, _) = send(
        &t.app,
        "POST",
        "/api/schedule/submit",
        as_user(ADMIN),
        Some(json!({"week_start": WEEK, "shifts": [shift(MANAGER, "thu")]})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &t.app,
        "POST",
        "/api/schedule/submit",
        as_user(ADMIN),
        Some(json!({
            "week_start": WEEK,
            "shifts": [
                shift(EMPLOYEE, "fri"),
                shift(SCHEDULER, "sat"),
                shift(MANAGER, "sat"),
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["shifts_created"], 3);
    assert_eq!(body["coverage"]["fri-morning-09:00-13:00"]["coverage_pct"], 50.0);
    assert_eq!(body["coverage"]["sat-morning-09:00-13:00"]["coverage_pct"], 200.0);
    assert_eq!(body["coverage"]["sat-morning-09:00-13:00"]["slot_times"], "09:00-13:00");

    let (_, shifts) = send(
        &t.app,
        "GET",
        &format!("/api/schedule/shifts/{}", WEEK),
        as_user(EMPLOYEE),
        None,
    )
    .await;
    let days: Vec<&str> = shifts
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["day"].as_str().unwrap())
        .collect();
    assert_eq!(days, vec!["fri", "sat", "sat"]);

    let (status, coverage) = send(
        &t.app,
        "GET",
        &format!("/api/schedule/coverage/{}", WEEK),
        as_user(EMPLOYEE),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(coverage["days"]["fri"]["required"], 2);
    assert_eq!(coverage["days"]["sat"]["scheduled"], 2);

    let (status, body) = send(
        &t.app,
        "DELETE",
        &format!("/api/schedule/shifts/{}", WEEK),
        as_user(ADMIN),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Deleted 3 shift(s)");
}

#[tokio::test]
async fn test_availability_overview_needs_view_employees() {
    let t = setup_test_app();
    let uri = format!("/api/schedule/availability/{}", WEEK);

    let (status, body) = send(&t.app, "GET", &uri, as_user(EMPLOYEE), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["required"]["type"], "all_of");

    let (status, body) = send(&t.app, "GET", &uri, as_user(ADMIN), None).await;
    assert_eq!(status, StatusCode::OK);
    let employees = body.as_array().unwrap();
    assert_eq!(employees.len(), 3);
    assert!(
        employees
            .iter()
            .all(|e| e["availability"].as_array().unwrap().len() == 7)
    );
}

#[tokio::test]
async fn test_my_availability_roundtrip_and_window_check() {
    let t = setup_test_app();

    let (status, body) = send(
        &t.app,
        "GET",
        &format!("/api/schedule/my-availability/{}", WEEK),
        as_user(EMPLOYEE),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["entries"], json!([]));
    assert_eq!(body["available_days"].as_array().unwrap().len(), 7);

    let (status, body) = send(
        &t.app,
        "PUT",
        "/api/schedule/my-availability",
        as_user(EMPLOYEE),
        Some(json!({
            "week_start": WEEK,
            "entries": [{"date": "2024-01-08", "available": true}]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "validation_failed");

    let (status, body) = send(
        &t.app,
        "PUT",
        "/api/schedule/my-availability",
        as_user(EMPLOYEE),
        Some(json!({
            "week_start": WEEK,
            "entries": [
                {"date": "2024-01-03", "available": true},
                {"date": "2024-01-07", "available": true}
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available_days"], json!(["wed", "sun"]));
}
