use axum::{routing::post, Router};

use crate::handlers;

pub fn doctor_routes() -> Router {
    Router::new()
        .route("/api/suggest-doctor", post(handlers::suggest_doctor_for_symptoms))
}
