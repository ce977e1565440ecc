// Database queries for the AI provider catalogue

use crate::db::schema::{ProviderRecord, ProviderStatus};
use crate::errors::Result;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

pub async fn insert_if_missing(pool: &SqlitePool, provider: &ProviderRecord) -> Result<()> {
    sqlx::query(
        r#"
        INSERT OR IGNORE INTO ai_providers (
            id, name, status, description, api_key, last_used, capabilities, max_tokens, pricing
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&provider.id)
    .bind(&provider.name)
    .bind(&provider.status)
    .bind(&provider.description)
    .bind(&provider.api_key)
    .bind(provider.last_used)
    .bind(&provider.capabilities)
    .bind(provider.max_tokens)
    .bind(&provider.pricing)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn get_by_id(pool: &SqlitePool, id: &str) -> Result<Option<ProviderRecord>> {
    let provider = sqlx::query_as::<_, ProviderRecord>("SELECT * FROM ai_providers WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(provider)
}

pub async fn list_all(pool: &SqlitePool) -> Result<Vec<ProviderRecord>> {
    let providers =
        sqlx::query_as::<_, ProviderRecord>("SELECT * FROM ai_providers ORDER BY name ASC")
            .fetch_all(pool)
            .await?;

    Ok(providers)
}

/// Store or clear the API key together with the matching connection status.
/// One statement, so the key and the status can never diverge.
pub async fn set_api_key(
    pool: &SqlitePool,
    id: &str,
    api_key: Option<&str>,
    status: ProviderStatus,
) -> Result<()> {
    sqlx::query("UPDATE ai_providers SET api_key = ?, status = ? WHERE id = ?")
        .bind(api_key)
        .bind(status.as_str())
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn set_status(pool: &SqlitePool, id: &str, status: ProviderStatus) -> Result<()> {
    sqlx::query("UPDATE ai_providers SET status = ? WHERE id = ?")
        .bind(status.as_str())
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn touch_last_used(pool: &SqlitePool, id: &str, at: DateTime<Utc>) -> Result<()> {
    sqlx::query("UPDATE ai_providers SET last_used = ? WHERE id = ?")
        .bind(at)
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}
