use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "participant_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParticipantStatus {
    Registered,
    Confirmed,
    Attended,
    NoShow,
    Cancelled,
}

impl ParticipantStatus {
    // Cancelled rows are kept for reactivation but no longer tie the
    // user to the session.
    pub fn is_active(&self) -> bool {
        !matches!(self, ParticipantStatus::Cancelled)
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct SessionParticipant {
    pub id: String,
    pub session_id: String,
    pub user_id: String,
    pub status: ParticipantStatus,
    pub checked_in_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SessionParticipant {
    pub fn new(session_id: String, user_id: String) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4().to_string(),
            session_id,
            user_id,
            status: ParticipantStatus::Registered,
            checked_in_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}
