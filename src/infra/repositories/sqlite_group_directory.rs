use crate::domain::ports::GroupDirectory;
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

// Read-only view over the groups module's membership table.
pub struct SqliteGroupDirectory {
    pool: SqlitePool,
}

impl SqliteGroupDirectory {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GroupDirectory for SqliteGroupDirectory {
    async fn is_active_member(&self, group_id: &str, user_id: &str) -> Result<bool, AppError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM group_members WHERE group_id = ? AND user_id = ? AND status = 'ACTIVE'"
        )
            .bind(group_id)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(count > 0)
    }

    async fn list_group_ids(&self, user_id: &str) -> Result<Vec<String>, AppError> {
        sqlx::query_scalar::<_, String>(
            "SELECT group_id FROM group_members WHERE user_id = ? AND status = 'ACTIVE'"
        )
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
