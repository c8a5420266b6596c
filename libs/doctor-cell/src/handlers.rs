use axum::{extract::rejection::JsonRejection, Json};
use tracing::info;

use shared_models::error::AppError;

use crate::models::{DoctorSuggestion, SuggestDoctorRequest};
use crate::services::TriageService;

/// Responds with a one-element list so the registration form can render it
/// the same way as a multi-doctor result.
#[axum::debug_handler]
pub async fn suggest_doctor_for_symptoms(
    payload: Result<Json<SuggestDoctorRequest>, JsonRejection>,
) -> Result<Json<Vec<DoctorSuggestion>>, AppError> {
    let Json(request) = payload
        .map_err(|e| AppError::BadRequest(format!("Failed to suggest doctor: {}", e.body_text())))?;

    let symptoms = request.symptoms.unwrap_or_default();
    let suggestion = TriageService::new().suggestion_for(&symptoms);
    info!("Suggested {} for symptoms '{}'", suggestion.name, symptoms);

    Ok(Json(vec![suggestion]))
}
