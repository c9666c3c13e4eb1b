use axum::{extract::State, Json};
use service_core::extract::ValidatedJson;

use crate::dtos::{ReportRequest, ReportResponse};
use crate::startup::AppState;

#[tracing::instrument(skip(state, request), fields(species = %request.species))]
pub async fn report_case(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<ReportRequest>,
) -> Json<ReportResponse> {
    let case = state.dispatcher.report_case(request);

    tracing::info!(diseases = case.diseases.len(), commune = %case.location.commune, "Case reported");

    Json(ReportResponse::new(case))
}
