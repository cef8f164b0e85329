use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::sql;

/// A row of the `users` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    #[serde(rename = "ID")]
    pub id: i32,
    pub username: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Persistence operations the users service needs.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Idempotent; existing rows are left untouched.
    async fn create_table(&self) -> Result<(), sqlx::Error>;

    /// Returns the id assigned by the store.
    async fn insert_one(&self, username: &str) -> Result<i32, sqlx::Error>;

    /// Newest first, at most `limit` rows.
    async fn select_many(&self, limit: i64) -> Result<Vec<User>, sqlx::Error>;

    /// Returns the number of rows removed.
    async fn delete_many(&self) -> Result<u64, sqlx::Error>;
}

#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create_table(&self) -> Result<(), sqlx::Error> {
        sqlx::query(sql::CREATE_TABLE).execute(&self.pool).await?;
        Ok(())
    }

    async fn insert_one(&self, username: &str) -> Result<i32, sqlx::Error> {
        sqlx::query_scalar::<_, i32>(sql::INSERT_ONE)
            .bind(username)
            .fetch_one(&self.pool)
            .await
    }

    async fn select_many(&self, limit: i64) -> Result<Vec<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(sql::SELECT_MANY)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
    }

    async fn delete_many(&self) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(sql::DELETE_MANY).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}
