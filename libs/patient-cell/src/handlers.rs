use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};

use shared_models::error::AppError;

use crate::models::{
    MessageResponse, Patient, PatientError, PatientStatistics, RegisterPatientRequest,
    RegistrationResponse, UpdateStatusRequest,
};
use crate::services::HospitalManager;

/// Keeps the 404/400 mapping but prefixes store failures with what was being done.
fn failure(context: &str, err: PatientError) -> AppError {
    match err {
        PatientError::DatabaseError(e) => AppError::Database(format!("{}: {}", context, e)),
        other => AppError::from(other),
    }
}

fn body<T>(context: &str, payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(value)| value)
        .map_err(|e| AppError::BadRequest(format!("{}: {}", context, e.body_text())))
}

#[axum::debug_handler]
pub async fn add_patient(
    State(manager): State<Arc<HospitalManager>>,
    payload: Result<Json<RegisterPatientRequest>, JsonRejection>,
) -> Result<Json<RegistrationResponse>, AppError> {
    let request = body("Failed to add patient", payload)?;

    let patient = manager
        .register(request)
        .await
        .map_err(|e| failure("Failed to add patient", e))?;

    Ok(Json(RegistrationResponse {
        message: "Patient added".to_string(),
        id: patient.id,
        doctor: patient.doctor,
    }))
}

#[axum::debug_handler]
pub async fn get_patients(State(manager): State<Arc<HospitalManager>>) -> Json<Vec<Patient>> {
    Json(manager.list_all().await)
}

#[axum::debug_handler]
pub async fn get_patients_from_db(State(manager): State<Arc<HospitalManager>>) -> Result<Json<Vec<Patient>>, AppError> {
    let patients = manager
        .list_all_from_store()
        .await
        .map_err(|e| failure("Failed to fetch patients from DB", e))?;

    Ok(Json(patients))
}

#[axum::debug_handler]
pub async fn get_priority_patients(State(manager): State<Arc<HospitalManager>>) -> Json<Vec<Patient>> {
    Json(manager.priority_ordered().await)
}

#[axum::debug_handler]
pub async fn search_by_id(
    State(manager): State<Arc<HospitalManager>>,
    Path(patient_id): Path<String>,
) -> Result<Json<Patient>, AppError> {
    let patient = manager
        .get_by_id(&patient_id)
        .await
        .map_err(|e| failure("Search failed", e))?;

    Ok(Json(patient))
}

#[axum::debug_handler]
pub async fn search_by_id_in_db(
    State(manager): State<Arc<HospitalManager>>,
    Path(patient_id): Path<String>,
) -> Result<Json<Patient>, AppError> {
    let patient = manager
        .get_by_id_from_store(&patient_id)
        .await
        .map_err(|e| failure("Database search failed", e))?;

    Ok(Json(patient))
}

#[axum::debug_handler]
pub async fn search_by_phone(
    State(manager): State<Arc<HospitalManager>>,
    Path(phone): Path<String>,
) -> Json<Vec<Patient>> {
    Json(manager.find_by_phone(&phone).await)
}

#[axum::debug_handler]
pub async fn filter_by_doctor(
    State(manager): State<Arc<HospitalManager>>,
    Path(doctor): Path<String>,
) -> Json<Vec<Patient>> {
    Json(manager.filter_by_doctor(&doctor).await)
}

#[axum::debug_handler]
pub async fn filter_by_status(
    State(manager): State<Arc<HospitalManager>>,
    Path(status): Path<String>,
) -> Json<Vec<Patient>> {
    Json(manager.filter_by_status(&status).await)
}

#[axum::debug_handler]
pub async fn update_status(
    State(manager): State<Arc<HospitalManager>>,
    Path(patient_id): Path<String>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let request = body("Failed to update status", payload)?;

    manager
        .update_status(&patient_id, &request.status)
        .await
        .map_err(|e| failure("Failed to update status", e))?;

    Ok(Json(MessageResponse::new("Status updated")))
}

#[axum::debug_handler]
pub async fn delete_patient(
    State(manager): State<Arc<HospitalManager>>,
    Path(patient_id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    manager
        .delete(&patient_id)
        .await
        .map_err(|e| failure("Failed to delete patient", e))?;

    Ok(Json(MessageResponse::new("Patient deleted")))
}

#[axum::debug_handler]
pub async fn get_statistics(State(manager): State<Arc<HospitalManager>>) -> Result<Json<PatientStatistics>, AppError> {
    let stats = manager
        .statistics()
        .await
        .map_err(|e| failure("Failed to get statistics", e))?;

    Ok(Json(stats))
}

#[axum::debug_handler]
pub async fn sync_data(State(manager): State<Arc<HospitalManager>>) -> Result<Json<MessageResponse>, AppError> {
    manager
        .sync_to_store()
        .await
        .map_err(|e| failure("Failed to sync", e))?;

    Ok(Json(MessageResponse::new("Data synced to database")))
}

#[axum::debug_handler]
pub async fn reload_data(State(manager): State<Arc<HospitalManager>>) -> Result<Json<MessageResponse>, AppError> {
    manager
        .reload_from_store()
        .await
        .map_err(|e| failure("Failed to reload", e))?;

    Ok(Json(MessageResponse::new("Data reloaded from database")))
}
