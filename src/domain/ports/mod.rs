use crate::domain::models::{
    notification::NotificationKind,
    participant::SessionParticipant,
    session::Session,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub struct MemberSessionQuery {
    pub user_id: String,
    pub group_ids: Vec<String>,
    pub client_instructor_ids: Vec<String>,
    pub limit: i64,
    pub offset: i64,
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create(&self, session: &Session) -> Result<Session, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Session>, AppError>;
    async fn update(&self, session: &Session) -> Result<Session, AppError>;
    async fn soft_delete(&self, id: &str, deleted_at: DateTime<Utc>) -> Result<(), AppError>;
    async fn list_for_member(&self, query: &MemberSessionQuery) -> Result<Vec<Session>, AppError>;
    async fn list_public_upcoming(
        &self,
        now: DateTime<Utc>,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Session>, AppError>;
    // Soft-deleted rows included: instance dedup must see them.
    async fn scheduled_times_matching(
        &self,
        instructor_id: &str,
        title: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<DateTime<Utc>>, AppError>;
}

#[async_trait]
pub trait ParticipantRepository: Send + Sync {
    async fn find(&self, session_id: &str, user_id: &str) -> Result<Option<SessionParticipant>, AppError>;
    async fn list_by_session(&self, session_id: &str) -> Result<Vec<SessionParticipant>, AppError>;
    // Insert or reactivate under the capacity bound, atomically.
    async fn register(&self, session_id: &str, user_id: &str) -> Result<SessionParticipant, AppError>;
    async fn update(&self, participant: &SessionParticipant) -> Result<SessionParticipant, AppError>;
}

#[async_trait]
pub trait GroupDirectory: Send + Sync {
    async fn is_active_member(&self, group_id: &str, user_id: &str) -> Result<bool, AppError>;
    async fn list_group_ids(&self, user_id: &str) -> Result<Vec<String>, AppError>;
}

#[async_trait]
pub trait ClientDirectory: Send + Sync {
    async fn is_active_client(&self, instructor_id: &str, user_id: &str) -> Result<bool, AppError>;
    async fn list_active_instructor_ids(&self, user_id: &str) -> Result<Vec<String>, AppError>;
}

#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn notify(
        &self,
        user_id: &str,
        kind: NotificationKind,
        context: &serde_json::Value,
    ) -> Result<(), AppError>;
}
