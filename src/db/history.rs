// Database queries for the generation history audit trail

use crate::db::schema::HistoryRecord;
use crate::errors::Result;
use serde::Deserialize;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryFilter {
    /// Substring match on the provider name
    pub provider: Option<String>,
    pub status: Option<String>,
    pub limit: Option<i64>,
    /// Set by the handler when the caller may only see their own rows
    #[serde(skip)]
    pub user_id: Option<String>,
}

pub async fn insert(pool: &SqlitePool, entry: &HistoryRecord) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO generation_history (
            id, provider, prompt, content, timestamp, word_count, template,
            status, settings, user_id
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&entry.id)
    .bind(&entry.provider)
    .bind(&entry.prompt)
    .bind(&entry.content)
    .bind(entry.timestamp)
    .bind(entry.word_count)
    .bind(&entry.template)
    .bind(&entry.status)
    .bind(&entry.settings)
    .bind(&entry.user_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Filtered list, newest first
pub async fn list(pool: &SqlitePool, filter: &HistoryFilter) -> Result<Vec<HistoryRecord>> {
    let mut builder: QueryBuilder<Sqlite> =
        QueryBuilder::new("SELECT * FROM generation_history WHERE 1=1");

    if let Some(provider) = filter.provider.as_deref().filter(|p| !p.is_empty()) {
        builder
            .push(" AND provider LIKE ")
            .push_bind(format!("%{}%", provider));
    }

    if let Some(status) = filter.status.as_deref() {
        builder.push(" AND status = ").push_bind(status.to_string());
    }

    if let Some(user_id) = filter.user_id.as_deref() {
        builder.push(" AND user_id = ").push_bind(user_id.to_string());
    }

    builder.push(" ORDER BY timestamp DESC");

    let limit = filter.limit.unwrap_or(50).clamp(1, 500);
    builder.push(" LIMIT ").push_bind(limit);

    let entries = builder.build_query_as::<HistoryRecord>().fetch_all(pool).await?;
    Ok(entries)
}

pub async fn count(pool: &SqlitePool) -> Result<i64> {
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM generation_history")
        .fetch_one(pool)
        .await?;

    Ok(count.0)
}

pub async fn delete(pool: &SqlitePool, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM generation_history WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn delete_all(pool: &SqlitePool) -> Result<u64> {
    let result = sqlx::query("DELETE FROM generation_history").execute(pool).await?;
    Ok(result.rows_affected())
}
