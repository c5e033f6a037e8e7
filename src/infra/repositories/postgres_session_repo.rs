use crate::domain::{models::session::Session, ports::{MemberSessionQuery, SessionRepository}};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

pub struct PostgresSessionRepo {
    pool: PgPool,
}

impl PostgresSessionRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for PostgresSessionRepo {
    async fn create(&self, session: &Session) -> Result<Session, AppError> {
        sqlx::query_as::<_, Session>(
            r#"INSERT INTO sessions (id, instructor_id, group_id, title, description, session_type, visibility, scheduled_at, duration_min, location, max_participants, price, currency, status, is_recurring, recurrence_rule, created_at, updated_at, deleted_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
               RETURNING *"#
        )
            .bind(&session.id).bind(&session.instructor_id).bind(&session.group_id).bind(&session.title)
            .bind(&session.description).bind(session.session_type).bind(session.visibility).bind(session.scheduled_at)
            .bind(session.duration_min).bind(&session.location).bind(session.max_participants).bind(session.price)
            .bind(&session.currency).bind(session.status).bind(session.is_recurring).bind(&session.recurrence_rule)
            .bind(session.created_at).bind(session.updated_at).bind(session.deleted_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Session>, AppError> {
        sqlx::query_as::<_, Session>(
            "SELECT * FROM sessions WHERE id = $1 AND deleted_at IS NULL"
        )
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update(&self, session: &Session) -> Result<Session, AppError> {
        sqlx::query_as::<_, Session>(
            r#"UPDATE sessions SET group_id=$1, title=$2, description=$3, session_type=$4, visibility=$5, scheduled_at=$6, duration_min=$7, location=$8, max_participants=$9, price=$10, currency=$11, status=$12, is_recurring=$13, recurrence_rule=$14, updated_at=$15
               WHERE id=$16 AND deleted_at IS NULL
               RETURNING *"#
        )
            .bind(&session.group_id).bind(&session.title).bind(&session.description).bind(session.session_type)
            .bind(session.visibility).bind(session.scheduled_at).bind(session.duration_min).bind(&session.location)
            .bind(session.max_participants).bind(session.price).bind(&session.currency).bind(session.status)
            .bind(session.is_recurring).bind(&session.recurrence_rule).bind(session.updated_at)
            .bind(&session.id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn soft_delete(&self, id: &str, deleted_at: DateTime<Utc>) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE sessions SET deleted_at = $1, updated_at = $1 WHERE id = $2 AND deleted_at IS NULL")
            .bind(deleted_at)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Session not found".into()));
        }
        Ok(())
    }

    async fn list_for_member(&self, query: &MemberSessionQuery) -> Result<Vec<Session>, AppError> {
        sqlx::query_as::<_, Session>(
            r#"SELECT DISTINCT s.* FROM sessions s
               LEFT JOIN session_participants p ON p.session_id = s.id AND p.user_id = $1 AND p.status != 'CANCELLED'
               WHERE s.deleted_at IS NULL AND (
                   s.instructor_id = $1
                   OR s.visibility = 'PUBLIC'
                   OR p.id IS NOT NULL
                   OR (s.visibility = 'GROUP' AND s.group_id = ANY($2))
                   OR (s.visibility = 'CLIENTS' AND s.instructor_id = ANY($3))
               )
               ORDER BY s.scheduled_at ASC
               LIMIT $4 OFFSET $5"#
        )
            .bind(&query.user_id)
            .bind(&query.group_ids)
            .bind(&query.client_instructor_ids)
            .bind(query.limit)
            .bind(query.offset)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_public_upcoming(&self, now: DateTime<Utc>, search: Option<&str>, limit: i64, offset: i64) -> Result<Vec<Session>, AppError> {
        let mut sql = String::from(
            "SELECT * FROM sessions WHERE deleted_at IS NULL AND visibility = 'PUBLIC' AND scheduled_at >= $1 AND status NOT IN ('COMPLETED', 'CANCELLED')"
        );
        if search.is_some() {
            sql.push_str(" AND (LOWER(title) LIKE $2 OR LOWER(description) LIKE $2 OR LOWER(COALESCE(location, '')) LIKE $2) ORDER BY scheduled_at ASC LIMIT $3 OFFSET $4");
        } else {
            sql.push_str(" ORDER BY scheduled_at ASC LIMIT $2 OFFSET $3");
        }

        let mut q = sqlx::query_as::<_, Session>(&sql).bind(now);
        if let Some(term) = search {
            q = q.bind(format!("%{}%", term.to_lowercase()));
        }
        q.bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn scheduled_times_matching(&self, instructor_id: &str, title: &str, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Vec<DateTime<Utc>>, AppError> {
        // No deleted_at filter here: a deleted instance still marks its
        // slot as already generated.
        sqlx::query_scalar::<_, DateTime<Utc>>(
            "SELECT scheduled_at FROM sessions WHERE instructor_id = $1 AND title = $2 AND scheduled_at BETWEEN $3 AND $4"
        )
            .bind(instructor_id)
            .bind(title)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
