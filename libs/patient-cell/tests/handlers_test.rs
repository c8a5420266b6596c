// libs/patient-cell/tests/handlers_test.rs

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use patient_cell::{create_patient_router, HospitalManager};
use shared_utils::test_utils::{SamplePatients, TestDatabase};

async fn setup_app() -> (TestDatabase, Router) {
    let db = TestDatabase::new().await;
    let manager = HospitalManager::new(db.pool.clone()).await.unwrap();
    (db, create_patient_router(Arc::new(manager)))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<String>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(text) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(text))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn add(app: &Router, body: Value) -> Value {
    let (status, json) = send(app, "POST", "/add_patient", Some(body.to_string())).await;
    assert_eq!(status, StatusCode::OK, "add_patient failed: {}", json);
    json
}

#[tokio::test]
async fn test_add_patient_returns_id_and_doctor() {
    let (_db, app) = setup_app().await;

    let json = add(&app, SamplePatients::fever("555-2000", "2025-07-01T09:00")).await;

    assert_eq!(json["message"], "Patient added");
    assert_eq!(json["doctor"], "Dr. Sharma (General)");
    assert_eq!(json["id"].as_str().unwrap().len(), 8);
}

#[tokio::test]
async fn test_add_patient_accepts_string_age() {
    let (_db, app) = setup_app().await;

    let mut body = SamplePatients::headache("555-2001", "2025-07-01T09:00");
    body["age"] = json!("67");
    let created = add(&app, body).await;

    let uri = format!("/api/search_by_id/{}", created["id"].as_str().unwrap());
    let (status, json) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["age"], 67);
    assert_eq!(json["appointment_time"], "2025-07-01T09:00");
    assert_eq!(json["status"], "Pending");
}

#[tokio::test]
async fn test_add_patient_validation_errors() {
    let (_db, app) = setup_app().await;

    let (status, json) = send(&app, "POST", "/add_patient", Some("{\"name\": \"x\"}".to_string())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().starts_with("Failed to add patient"));

    let mut bad_time = SamplePatients::fever("555-2002", "2025-07-01T09:00");
    bad_time["appointment_time"] = json!("next tuesday");
    let (status, json) = send(&app, "POST", "/add_patient", Some(bad_time.to_string())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("appointment_time"));
}

#[tokio::test]
async fn test_search_by_id_not_found() {
    let (_db, app) = setup_app().await;

    let (status, json) = send(&app, "GET", "/api/search_by_id/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Patient not found");

    let (status, _) = send(&app, "GET", "/api/search_by_id_db/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_memory_and_db_listings() {
    let (_db, app) = setup_app().await;

    let late = add(&app, SamplePatients::fever("555-2100", "2025-07-02T15:00")).await;
    let early = add(&app, SamplePatients::headache("555-2101", "2025-07-01T08:00")).await;

    let (status, memory) = send(&app, "GET", "/api/patients", None).await;
    assert_eq!(status, StatusCode::OK);
    let memory_ids: Vec<&Value> = memory.as_array().unwrap().iter().map(|p| &p["id"]).collect();
    assert_eq!(memory_ids, vec![&late["id"], &early["id"]]);

    let (status, stored) = send(&app, "GET", "/api/patients/db", None).await;
    assert_eq!(status, StatusCode::OK);
    let stored_ids: Vec<&Value> = stored.as_array().unwrap().iter().map(|p| &p["id"]).collect();
    assert_eq!(stored_ids, vec![&early["id"], &late["id"]]);

    let (_, priority) = send(&app, "GET", "/api/patients/priority", None).await;
    assert_eq!(priority[0]["id"], early["id"]);
}

#[tokio::test]
async fn test_filters() {
    let (_db, app) = setup_app().await;

    let fever = add(&app, SamplePatients::fever("555-2200", "2025-07-01T09:00")).await;
    add(&app, SamplePatients::headache("555-2201", "2025-07-01T10:00")).await;

    let (_, by_phone) = send(&app, "GET", "/api/search_by_phone/555-2200", None).await;
    assert_eq!(by_phone.as_array().unwrap().len(), 1);
    assert_eq!(by_phone[0]["id"], fever["id"]);

    let (_, by_doctor) = send(&app, "GET", "/api/filter_by_doctor/dr.%20sharma%20(general)", None).await;
    assert_eq!(by_doctor.as_array().unwrap().len(), 1);

    let (_, by_status) = send(&app, "GET", "/api/filter_by_status/PENDING", None).await;
    assert_eq!(by_status.as_array().unwrap().len(), 2);

    let (status, none) = send(&app, "GET", "/api/filter_by_status/discharged", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(none, json!([]));
}

#[tokio::test]
async fn test_update_status_flow() {
    let (_db, app) = setup_app().await;

    let created = add(&app, SamplePatients::fever("555-2300", "2025-07-01T09:00")).await;
    let id = created["id"].as_str().unwrap();

    let (status, json) = send(
        &app,
        "POST",
        &format!("/api/update_status/{}", id),
        Some(SamplePatients::status_update("Completed").to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Status updated");

    let (_, stored) = send(&app, "GET", &format!("/api/search_by_id_db/{}", id), None).await;
    assert_eq!(stored["status"], "Completed");

    let (status, _) = send(
        &app,
        "POST",
        "/api/update_status/unknown1",
        Some(SamplePatients::status_update("Completed").to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_flow() {
    let (_db, app) = setup_app().await;

    let created = add(&app, SamplePatients::fever("555-2400", "2025-07-01T09:00")).await;
    let uri = format!("/api/delete_patient/{}", created["id"].as_str().unwrap());

    let (status, json) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Patient deleted");

    let (status, _) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, all) = send(&app, "GET", "/api/patients", None).await;
    assert_eq!(all, json!([]));
}

#[tokio::test]
async fn test_statistics_sync_and_reload() {
    let (_db, app) = setup_app().await;

    add(&app, SamplePatients::fever("555-2500", "2025-07-01T09:00")).await;
    add(&app, SamplePatients::fever("555-2501", "2025-07-01T09:30")).await;
    add(&app, SamplePatients::headache("555-2502", "2025-07-01T10:00")).await;

    let (status, stats) = send(&app, "GET", "/api/statistics", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total_patients"], 3);
    assert_eq!(stats["by_status"]["Pending"], 3);
    assert_eq!(stats["by_doctor"]["Dr. Sharma (General)"], 2);

    let (status, json) = send(&app, "POST", "/api/sync", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Data synced to database");

    let (status, json) = send(&app, "POST", "/api/reload", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Data reloaded from database");

    let (_, all) = send(&app, "GET", "/api/patients", None).await;
    assert_eq!(all.as_array().unwrap().len(), 3);
}
