use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use doctor_cell::router::doctor_routes;
use patient_cell::{create_patient_router, HospitalManager};

pub fn create_router(manager: Arc<HospitalManager>) -> Router {
    Router::new()
        .route("/", get(|| async { "Clinic Triage API is running!" }))
        .merge(doctor_routes())
        .merge(create_patient_router(manager))
}
