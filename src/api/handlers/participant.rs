use axum::{extract::{State, Path}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AuthUser;
use crate::api::dtos::requests::UpdateParticipantStatusRequest;
use crate::error::AppError;
use std::sync::Arc;

pub async fn join_session(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let participant = state.session_service.join_session(&session_id, &user_id).await?;
    Ok(Json(participant))
}

pub async fn leave_session(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let participant = state.session_service.leave_session(&session_id, &user_id).await?;
    Ok(Json(participant))
}

pub async fn confirm_registration(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let participant = state.session_service.confirm_registration(&session_id, &user_id).await?;
    Ok(Json(participant))
}

pub async fn self_check_in(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let participant = state.session_service.self_check_in(&session_id, &user_id).await?;
    Ok(Json(participant))
}

pub async fn list_participants(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let participants = state.session_service.list_participants(&session_id, &user_id).await?;
    Ok(Json(participants))
}

pub async fn update_participant_status(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path((session_id, participant_user_id)): Path<(String, String)>,
    Json(payload): Json<UpdateParticipantStatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    let participant = state.session_service
        .update_participant_status(&session_id, &participant_user_id, &user_id, payload.status)
        .await?;
    Ok(Json(participant))
}
