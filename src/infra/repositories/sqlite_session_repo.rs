use crate::domain::{models::session::Session, ports::{MemberSessionQuery, SessionRepository}};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

pub struct SqliteSessionRepo {
    pool: SqlitePool,
}

impl SqliteSessionRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for SqliteSessionRepo {
    async fn create(&self, session: &Session) -> Result<Session, AppError> {
        sqlx::query_as::<_, Session>(
            r#"INSERT INTO sessions (id, instructor_id, group_id, title, description, session_type, visibility, scheduled_at, duration_min, location, max_participants, price, currency, status, is_recurring, recurrence_rule, created_at, updated_at, deleted_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
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
            "SELECT * FROM sessions WHERE id = ? AND deleted_at IS NULL"
        )
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update(&self, session: &Session) -> Result<Session, AppError> {
        sqlx::query_as::<_, Session>(
            r#"UPDATE sessions SET group_id=?, title=?, description=?, session_type=?, visibility=?, scheduled_at=?, duration_min=?, location=?, max_participants=?, price=?, currency=?, status=?, is_recurring=?, recurrence_rule=?, updated_at=?
               WHERE id=? AND deleted_at IS NULL
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
        let result = sqlx::query("UPDATE sessions SET deleted_at = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL")
            .bind(deleted_at)
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
        let mut clauses = String::from("s.instructor_id = ? OR s.visibility = 'PUBLIC' OR p.id IS NOT NULL");
        if !query.group_ids.is_empty() {
            let marks = vec!["?"; query.group_ids.len()].join(", ");
            clauses.push_str(&format!(" OR (s.visibility = 'GROUP' AND s.group_id IN ({}))", marks));
        }
        if !query.client_instructor_ids.is_empty() {
            let marks = vec!["?"; query.client_instructor_ids.len()].join(", ");
            clauses.push_str(&format!(" OR (s.visibility = 'CLIENTS' AND s.instructor_id IN ({}))", marks));
        }

        let sql = format!(
            r#"SELECT DISTINCT s.* FROM sessions s
               LEFT JOIN session_participants p ON p.session_id = s.id AND p.user_id = ? AND p.status != 'CANCELLED'
               WHERE s.deleted_at IS NULL AND ({})
               ORDER BY s.scheduled_at ASC
               LIMIT ? OFFSET ?"#,
            clauses
        );

        let mut q = sqlx::query_as::<_, Session>(&sql).bind(&query.user_id).bind(&query.user_id);
        for group_id in &query.group_ids {
            q = q.bind(group_id);
        }
        for instructor_id in &query.client_instructor_ids {
            q = q.bind(instructor_id);
        }
        q.bind(query.limit)
            .bind(query.offset)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_public_upcoming(&self, now: DateTime<Utc>, search: Option<&str>, limit: i64, offset: i64) -> Result<Vec<Session>, AppError> {
        let mut sql = String::from(
            "SELECT * FROM sessions WHERE deleted_at IS NULL AND visibility = 'PUBLIC' AND scheduled_at >= ? AND status NOT IN ('COMPLETED', 'CANCELLED')"
        );
        if search.is_some() {
            sql.push_str(" AND (LOWER(title) LIKE ? OR LOWER(description) LIKE ? OR LOWER(COALESCE(location, '')) LIKE ?)");
        }
        sql.push_str(" ORDER BY scheduled_at ASC LIMIT ? OFFSET ?");

        let mut q = sqlx::query_as::<_, Session>(&sql).bind(now);
        if let Some(term) = search {
            let pattern = format!("%{}%", term.to_lowercase());
            q = q.bind(pattern.clone()).bind(pattern.clone()).bind(pattern);
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
            "SELECT scheduled_at FROM sessions WHERE instructor_id = ? AND title = ? AND scheduled_at BETWEEN ? AND ?"
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
