use axum::{extract::{State, Path, Query}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AuthUser;
use crate::api::dtos::requests::{CloneSessionRequest, CreateSessionRequest, UpdateSessionRequest};
use crate::domain::models::session::{NewSessionParams, SessionPatch, SessionStatus, SessionVisibility};
use crate::error::AppError;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Deserialize)]
pub struct DiscoverQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
}

pub async fn create_session(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateSessionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let params = NewSessionParams {
        instructor_id: user_id,
        group_id: payload.group_id,
        title: payload.title,
        description: payload.description.unwrap_or_default(),
        session_type: payload.session_type,
        visibility: payload.visibility.unwrap_or(SessionVisibility::Group),
        scheduled_at: payload.scheduled_at,
        duration_min: payload.duration_min,
        location: payload.location,
        max_participants: payload.max_participants,
        price: payload.price,
        currency: payload.currency.unwrap_or_else(|| "RON".to_string()),
        status: payload.status.unwrap_or(SessionStatus::Scheduled),
        is_recurring: payload.is_recurring.unwrap_or(false),
        recurrence_rule: payload.recurrence_rule,
    };

    let created = state.session_service.create(params).await?;
    Ok(Json(created))
}

pub async fn get_my_sessions(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Query(params): Query<PageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let sessions = state.session_service
        .my_sessions(&user_id, params.page.unwrap_or(1), params.limit.unwrap_or(20))
        .await?;
    Ok(Json(sessions))
}

pub async fn discover_sessions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DiscoverQuery>,
) -> Result<impl IntoResponse, AppError> {
    let sessions = state.session_service
        .discover(params.page.unwrap_or(1), params.limit.unwrap_or(20), params.search.as_deref())
        .await?;
    Ok(Json(sessions))
}

pub async fn get_session(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let session = state.session_service.get_session(&session_id, &user_id).await?;
    Ok(Json(session))
}

pub async fn update_session(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(session_id): Path<String>,
    Json(payload): Json<UpdateSessionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let patch = SessionPatch {
        title: payload.title,
        description: payload.description,
        session_type: payload.session_type,
        visibility: payload.visibility,
        scheduled_at: payload.scheduled_at,
        duration_min: payload.duration_min,
        location: payload.location,
        max_participants: payload.max_participants,
        price: payload.price,
        currency: payload.currency,
        group_id: payload.group_id,
        status: payload.status,
        is_recurring: payload.is_recurring,
        recurrence_rule: payload.recurrence_rule,
    };

    let updated = state.session_service.update(&session_id, &user_id, patch).await?;
    Ok(Json(updated))
}

pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.session_service.delete(&session_id, &user_id).await?;
    Ok(Json(serde_json::json!({"status": "deleted"})))
}

pub async fn clone_session(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(session_id): Path<String>,
    Json(payload): Json<CloneSessionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let created = state.session_service
        .clone_session(&session_id, &user_id, payload.scheduled_at)
        .await?;
    Ok(Json(created))
}
