use crate::domain::models::participant::ParticipantStatus;
use crate::domain::models::session::{RecurringRule, SessionStatus, SessionType, SessionVisibility};
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Deserialize)]
pub struct CreateSessionRequest {
    pub title: String,
    pub description: Option<String>,
    pub session_type: SessionType,
    pub visibility: Option<SessionVisibility>,
    pub group_id: Option<String>,
    pub scheduled_at: DateTime<Utc>,
    pub duration_min: i32,
    pub location: Option<String>,
    pub max_participants: Option<i32>,
    pub price: Option<f64>,
    pub currency: Option<String>,
    pub status: Option<SessionStatus>,
    pub is_recurring: Option<bool>,
    pub recurrence_rule: Option<RecurringRule>,
}

#[derive(Deserialize)]
pub struct UpdateSessionRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub session_type: Option<SessionType>,
    pub visibility: Option<SessionVisibility>,
    pub group_id: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub duration_min: Option<i32>,
    pub location: Option<String>,
    pub max_participants: Option<i32>,
    pub price: Option<f64>,
    pub currency: Option<String>,
    pub status: Option<SessionStatus>,
    pub is_recurring: Option<bool>,
    pub recurrence_rule: Option<RecurringRule>,
}

#[derive(Deserialize)]
pub struct CloneSessionRequest {
    pub scheduled_at: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct GenerateInstancesRequest {
    pub weeks: Option<u32>,
}

#[derive(Deserialize)]
pub struct UpdateParticipantStatusRequest {
    pub status: ParticipantStatus,
}
