use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use service_core::extract::ValidatedJson;

use crate::dtos::{
    AnalysisResponse, FailureResponse, HealthAnalysisRequest, TreatmentRequest, TreatmentResponse,
};
use crate::services::ProviderError;
use crate::startup::AppState;

/// Failure raised while producing advisory text.
///
/// Never surfaces as a transport error: clients get HTTP 200 with
/// `{"error": ..., "success": false}` and must inspect `success`.
#[derive(Debug)]
pub struct HandlerFailure(pub ProviderError);

impl From<ProviderError> for HandlerFailure {
    fn from(err: ProviderError) -> Self {
        HandlerFailure(err)
    }
}

impl IntoResponse for HandlerFailure {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(FailureResponse::new(self.0.to_string()))).into_response()
    }
}

#[tracing::instrument(skip(state, request), fields(species = %request.species, symptoms = request.symptoms.len()))]
pub async fn analyze_health(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<HealthAnalysisRequest>,
) -> Result<Json<AnalysisResponse>, HandlerFailure> {
    if let Some(clinical) = &request.clinical_data {
        tracing::debug!(fields = clinical.len(), "Clinical data received");
    }

    let analysis = state.dispatcher.analyze_health(&request).await?;

    Ok(Json(AnalysisResponse::new(analysis)))
}

#[tracing::instrument(skip(state, request), fields(species = %request.species, diseases = request.diseases.len()))]
pub async fn generate_treatment(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<TreatmentRequest>,
) -> Result<Json<TreatmentResponse>, HandlerFailure> {
    let treatment_plan = state.dispatcher.generate_treatment(&request).await?;

    Ok(Json(TreatmentResponse::new(treatment_plan)))
}
