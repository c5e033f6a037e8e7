use crate::domain::{models::participant::SessionParticipant, ports::ParticipantRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

pub struct SqliteParticipantRepo {
    pool: SqlitePool,
}

impl SqliteParticipantRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ParticipantRepository for SqliteParticipantRepo {
    async fn find(&self, session_id: &str, user_id: &str) -> Result<Option<SessionParticipant>, AppError> {
        sqlx::query_as::<_, SessionParticipant>(
            "SELECT * FROM session_participants WHERE session_id = ? AND user_id = ?"
        )
            .bind(session_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_session(&self, session_id: &str) -> Result<Vec<SessionParticipant>, AppError> {
        sqlx::query_as::<_, SessionParticipant>(
            "SELECT * FROM session_participants WHERE session_id = ? ORDER BY created_at ASC"
        )
            .bind(session_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    // Both writes below carry the capacity check in their WHERE clause, so
    // a single statement decides join-vs-full and SQLite's write lock
    // serializes concurrent joins. NULL max_participants means unbounded.
    async fn register(&self, session_id: &str, user_id: &str) -> Result<SessionParticipant, AppError> {
        let existing = self.find(session_id, user_id).await?;

        if let Some(row) = existing {
            if row.status.is_active() {
                return Err(AppError::Conflict("Already registered for this session".to_string()));
            }

            let result = sqlx::query(
                r#"UPDATE session_participants SET status = 'REGISTERED', checked_in_at = NULL, updated_at = ?
                   WHERE id = ? AND status = 'CANCELLED'
                     AND (SELECT COUNT(*) FROM session_participants WHERE session_id = ? AND status NOT IN ('CANCELLED', 'NO_SHOW'))
                         < (SELECT COALESCE(max_participants, 2147483647) FROM sessions WHERE id = ?)"#
            )
                .bind(Utc::now()).bind(&row.id).bind(session_id).bind(session_id)
                .execute(&self.pool)
                .await
                .map_err(AppError::Database)?;

            if result.rows_affected() == 0 {
                return Err(AppError::Conflict("Session is full".to_string()));
            }
        } else {
            let row = SessionParticipant::new(session_id.to_string(), user_id.to_string());
            let result = sqlx::query(
                r#"INSERT INTO session_participants (id, session_id, user_id, status, checked_in_at, created_at, updated_at)
                   SELECT ?, ?, ?, ?, ?, ?, ?
                   WHERE (SELECT COUNT(*) FROM session_participants WHERE session_id = ? AND status NOT IN ('CANCELLED', 'NO_SHOW'))
                         < (SELECT COALESCE(max_participants, 2147483647) FROM sessions WHERE id = ?)"#
            )
                .bind(&row.id).bind(&row.session_id).bind(&row.user_id).bind(row.status)
                .bind(row.checked_in_at).bind(row.created_at).bind(row.updated_at)
                .bind(session_id).bind(session_id)
                .execute(&self.pool)
                .await
                .map_err(AppError::Database)?;

            if result.rows_affected() == 0 {
                return Err(AppError::Conflict("Session is full".to_string()));
            }
        }

        self.find(session_id, user_id).await?.ok_or(AppError::Internal)
    }

    async fn update(&self, participant: &SessionParticipant) -> Result<SessionParticipant, AppError> {
        sqlx::query_as::<_, SessionParticipant>(
            r#"UPDATE session_participants SET status = ?, checked_in_at = ?, updated_at = ?
               WHERE id = ?
               RETURNING *"#
        )
            .bind(participant.status)
            .bind(participant.checked_in_at)
            .bind(participant.updated_at)
            .bind(&participant.id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
