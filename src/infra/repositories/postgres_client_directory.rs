use crate::domain::ports::ClientDirectory;
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

// Read-only view over the coaching module's relationship table. Only
// ACTIVE relationships count; PENDING and ARCHIVED grant nothing.
pub struct PostgresClientDirectory {
    pool: PgPool,
}

impl PostgresClientDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClientDirectory for PostgresClientDirectory {
    async fn is_active_client(&self, instructor_id: &str, user_id: &str) -> Result<bool, AppError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM client_relationships WHERE instructor_id = $1 AND user_id = $2 AND status = 'ACTIVE'"
        )
            .bind(instructor_id)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(count > 0)
    }

    async fn list_active_instructor_ids(&self, user_id: &str) -> Result<Vec<String>, AppError> {
        sqlx::query_scalar::<_, String>(
            "SELECT instructor_id FROM client_relationships WHERE user_id = $1 AND status = 'ACTIVE'"
        )
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
