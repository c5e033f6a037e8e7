use axum::{extract::{State, Path, Query}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AuthUser;
use crate::api::dtos::requests::GenerateInstancesRequest;
use crate::api::dtos::responses::OccurrencesResponse;
use crate::domain::services::recurrence::DEFAULT_HORIZON_WEEKS;
use crate::error::AppError;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct OccurrencesQuery {
    pub weeks: Option<u32>,
}

pub async fn preview_occurrences(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(session_id): Path<String>,
    Query(params): Query<OccurrencesQuery>,
) -> Result<impl IntoResponse, AppError> {
    let weeks = params.weeks.unwrap_or(DEFAULT_HORIZON_WEEKS);
    let occurrences = state.session_service
        .preview_occurrences(&session_id, &user_id, weeks)
        .await?;

    Ok(Json(OccurrencesResponse {
        session_id,
        occurrences: occurrences.iter().map(|ts| ts.to_rfc3339()).collect(),
    }))
}

pub async fn generate_instances(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(session_id): Path<String>,
    Json(payload): Json<GenerateInstancesRequest>,
) -> Result<impl IntoResponse, AppError> {
    let weeks = payload.weeks.unwrap_or(DEFAULT_HORIZON_WEEKS);
    let batch = state.materializer
        .generate_instances(&session_id, &user_id, weeks)
        .await?;
    Ok(Json(batch))
}
