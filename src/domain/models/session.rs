use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "session_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionType {
    OneOnOne,
    Group,
    Online,
    Workshop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "session_visibility", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionVisibility {
    Public,
    Group,
    Clients,
    Private,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "session_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    Draft,
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "frequency", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecurringRule {
    Daily {
        interval: u32,
        end_date: Option<DateTime<Utc>>,
        end_after_occurrences: Option<u32>,
    },
    Weekly {
        interval: u32,
        days_of_week: Option<Vec<u8>>, // 0 = Sunday .. 6 = Saturday
        end_date: Option<DateTime<Utc>>,
        end_after_occurrences: Option<u32>,
    },
    Monthly {
        interval: u32,
        end_date: Option<DateTime<Utc>>,
        end_after_occurrences: Option<u32>,
    },
}

impl RecurringRule {
    pub fn interval(&self) -> u32 {
        match self {
            RecurringRule::Daily { interval, .. } => *interval,
            RecurringRule::Weekly { interval, .. } => *interval,
            RecurringRule::Monthly { interval, .. } => *interval,
        }
    }

    pub fn end_date(&self) -> Option<DateTime<Utc>> {
        match self {
            RecurringRule::Daily { end_date, .. } => *end_date,
            RecurringRule::Weekly { end_date, .. } => *end_date,
            RecurringRule::Monthly { end_date, .. } => *end_date,
        }
    }

    pub fn end_after_occurrences(&self) -> Option<u32> {
        match self {
            RecurringRule::Daily { end_after_occurrences, .. } => *end_after_occurrences,
            RecurringRule::Weekly { end_after_occurrences, .. } => *end_after_occurrences,
            RecurringRule::Monthly { end_after_occurrences, .. } => *end_after_occurrences,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.interval() == 0 {
            return Err("Recurrence interval must be at least 1".to_string());
        }
        if self.end_after_occurrences() == Some(0) {
            return Err("end_after_occurrences must be at least 1".to_string());
        }
        if let RecurringRule::Weekly { days_of_week: Some(days), .. } = self {
            if days.is_empty() {
                return Err("days_of_week must not be empty when provided".to_string());
            }
            if days.iter().any(|d| *d > 6) {
                return Err("days_of_week entries must be 0 (Sunday) through 6 (Saturday)".to_string());
            }
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Session {
    pub id: String,
    pub instructor_id: String,
    pub group_id: Option<String>,
    pub title: String,
    pub description: String,
    pub session_type: SessionType,
    pub visibility: SessionVisibility,
    pub scheduled_at: DateTime<Utc>,
    pub duration_min: i32,
    pub location: Option<String>,
    pub max_participants: Option<i32>,
    pub price: Option<f64>,
    pub currency: String,
    pub status: SessionStatus,
    pub is_recurring: bool,
    pub recurrence_rule: Option<Json<RecurringRule>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

pub struct NewSessionParams {
    pub instructor_id: String,
    pub group_id: Option<String>,
    pub title: String,
    pub description: String,
    pub session_type: SessionType,
    pub visibility: SessionVisibility,
    pub scheduled_at: DateTime<Utc>,
    pub duration_min: i32,
    pub location: Option<String>,
    pub max_participants: Option<i32>,
    pub price: Option<f64>,
    pub currency: String,
    pub status: SessionStatus,
    pub is_recurring: bool,
    pub recurrence_rule: Option<RecurringRule>,
}

// Partial update; unset fields are left untouched. Empty strings clear
// the nullable location and group_id fields.
#[derive(Debug, Default)]
pub struct SessionPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub session_type: Option<SessionType>,
    pub visibility: Option<SessionVisibility>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub duration_min: Option<i32>,
    pub location: Option<String>,
    pub max_participants: Option<i32>,
    pub price: Option<f64>,
    pub currency: Option<String>,
    pub group_id: Option<String>,
    pub status: Option<SessionStatus>,
    pub is_recurring: Option<bool>,
    pub recurrence_rule: Option<RecurringRule>,
}

impl Session {
    pub fn new(params: NewSessionParams) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4().to_string(),
            instructor_id: params.instructor_id,
            group_id: params.group_id,
            title: params.title,
            description: params.description,
            session_type: params.session_type,
            visibility: params.visibility,
            scheduled_at: params.scheduled_at,
            duration_min: params.duration_min,
            location: params.location,
            max_participants: params.max_participants,
            price: params.price,
            currency: params.currency,
            status: params.status,
            is_recurring: params.is_recurring,
            recurrence_rule: params.recurrence_rule.map(Json),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Standalone copy at a new start time: fresh id, SCHEDULED, never
    /// recurring. Used for manual clones and for materialized instances.
    pub fn duplicate_at(&self, scheduled_at: DateTime<Utc>) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4().to_string(),
            instructor_id: self.instructor_id.clone(),
            group_id: self.group_id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            session_type: self.session_type,
            visibility: self.visibility,
            scheduled_at,
            duration_min: self.duration_min,
            location: self.location.clone(),
            max_participants: self.max_participants,
            price: self.price,
            currency: self.currency.clone(),
            status: SessionStatus::Scheduled,
            is_recurring: false,
            recurrence_rule: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }
}
