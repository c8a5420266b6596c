use std::sync::Arc;
use axum::{routing::{delete, get, post}, Router};

use crate::handlers::*;
use crate::services::HospitalManager;

pub fn create_patient_router(manager: Arc<HospitalManager>) -> Router {
    Router::new()
        .route("/add_patient", post(add_patient))
        .route("/api/patients", get(get_patients))
        .route("/api/patients/db", get(get_patients_from_db))
        .route("/api/patients/priority", get(get_priority_patients))
        .route("/api/search_by_id/{id}", get(search_by_id))
        .route("/api/search_by_id_db/{id}", get(search_by_id_in_db))
        .route("/api/search_by_phone/{phone}", get(search_by_phone))
        .route("/api/filter_by_doctor/{doctor}", get(filter_by_doctor))
        .route("/api/filter_by_status/{status}", get(filter_by_status))
        .route("/api/update_status/{id}", post(update_status))
        .route("/api/delete_patient/{id}", delete(delete_patient))
        .route("/api/statistics", get(get_statistics))
        .route("/api/sync", post(sync_data))
        .route("/api/reload", post(reload_data))
        .with_state(manager)
}
