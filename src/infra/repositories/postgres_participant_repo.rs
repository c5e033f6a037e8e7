use crate::domain::{
    models::participant::{ParticipantStatus, SessionParticipant},
    ports::ParticipantRepository,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

pub struct PostgresParticipantRepo {
    pool: PgPool,
}

impl PostgresParticipantRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ParticipantRepository for PostgresParticipantRepo {
    async fn find(&self, session_id: &str, user_id: &str) -> Result<Option<SessionParticipant>, AppError> {
        sqlx::query_as::<_, SessionParticipant>(
            "SELECT * FROM session_participants WHERE session_id = $1 AND user_id = $2"
        )
            .bind(session_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_session(&self, session_id: &str) -> Result<Vec<SessionParticipant>, AppError> {
        sqlx::query_as::<_, SessionParticipant>(
            "SELECT * FROM session_participants WHERE session_id = $1 ORDER BY created_at ASC"
        )
            .bind(session_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn register(&self, session_id: &str, user_id: &str) -> Result<SessionParticipant, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        // The row lock serializes concurrent joins on the same session.
        let max_participants: Option<i32> = sqlx::query_scalar::<_, Option<i32>>(
            "SELECT max_participants FROM sessions WHERE id = $1 FOR UPDATE"
        )
            .bind(session_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::Database)?
            .ok_or(AppError::NotFound("Session not found".to_string()))?;

        let existing = sqlx::query_as::<_, SessionParticipant>(
            "SELECT * FROM session_participants WHERE session_id = $1 AND user_id = $2"
        )
            .bind(session_id)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        if let Some(row) = &existing
            && row.status.is_active()
        {
            return Err(AppError::Conflict("Already registered for this session".to_string()));
        }

        if let Some(max) = max_participants {
            let active: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM session_participants WHERE session_id = $1 AND status NOT IN ('CANCELLED', 'NO_SHOW')"
            )
                .bind(session_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(AppError::Database)?;

            if active >= max as i64 {
                return Err(AppError::Conflict("Session is full".to_string()));
            }
        }

        let registered = if let Some(row) = existing {
            sqlx::query_as::<_, SessionParticipant>(
                r#"UPDATE session_participants SET status = $1, checked_in_at = NULL, updated_at = $2
                   WHERE id = $3
                   RETURNING *"#
            )
                .bind(ParticipantStatus::Registered)
                .bind(Utc::now())
                .bind(&row.id)
                .fetch_one(&mut *tx)
                .await
                .map_err(AppError::Database)?
        } else {
            let row = SessionParticipant::new(session_id.to_string(), user_id.to_string());
            sqlx::query_as::<_, SessionParticipant>(
                r#"INSERT INTO session_participants (id, session_id, user_id, status, checked_in_at, created_at, updated_at)
                   VALUES ($1, $2, $3, $4, $5, $6, $7)
                   RETURNING *"#
            )
                .bind(&row.id).bind(&row.session_id).bind(&row.user_id).bind(row.status)
                .bind(row.checked_in_at).bind(row.created_at).bind(row.updated_at)
                .fetch_one(&mut *tx)
                .await
                .map_err(AppError::Database)?
        };

        tx.commit().await.map_err(AppError::Database)?;
        Ok(registered)
    }

    async fn update(&self, participant: &SessionParticipant) -> Result<SessionParticipant, AppError> {
        sqlx::query_as::<_, SessionParticipant>(
            r#"UPDATE session_participants SET status = $1, checked_in_at = $2, updated_at = $3
               WHERE id = $4
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
