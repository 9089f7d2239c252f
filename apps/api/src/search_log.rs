//! Append-only search history. The engine writes one row per completed
//! query and never reads it back; the reporting dashboard consumes it.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;

/// One completed search, ready to append. `created_at` is stamped by the
/// store itself.
#[derive(Debug)]
pub struct NewSearchLog<'a> {
    pub telegram_id: i64,
    pub search_query: &'a str,
    pub structured_preferences: Option<Value>,
}

#[async_trait]
pub trait SearchLogSink: Send + Sync {
    /// Appends one entry. Write-once; failures are the caller's to swallow,
    /// a search result must never be lost to a logging problem.
    async fn record(&self, entry: &NewSearchLog<'_>) -> anyhow::Result<()>;
}

pub struct PgSearchLog {
    pool: PgPool,
}

impl PgSearchLog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SearchLogSink for PgSearchLog {
    async fn record(&self, entry: &NewSearchLog<'_>) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO user_searches (telegram_id, search_query, structured_preferences) \
             VALUES ($1, $2, $3)",
        )
        .bind(entry.telegram_id)
        .bind(entry.search_query)
        .bind(entry.structured_preferences.clone())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
