// Database queries for webhook audit logs

use crate::db::schema::WebhookLogRecord;
use crate::errors::Result;
use sqlx::types::Json;
use sqlx::SqlitePool;

pub async fn insert(pool: &SqlitePool, log: &WebhookLogRecord) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO webhook_logs (id, source, timestamp, data, processed, type, result, processing_time_ms)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&log.id)
    .bind(&log.source)
    .bind(log.timestamp)
    .bind(&log.data)
    .bind(log.processed)
    .bind(&log.event_type)
    .bind(&log.result)
    .bind(log.processing_time_ms)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn get_by_id(pool: &SqlitePool, id: &str) -> Result<Option<WebhookLogRecord>> {
    let log = sqlx::query_as::<_, WebhookLogRecord>("SELECT * FROM webhook_logs WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(log)
}

pub async fn list(pool: &SqlitePool, limit: i64) -> Result<Vec<WebhookLogRecord>> {
    let logs = sqlx::query_as::<_, WebhookLogRecord>(
        "SELECT * FROM webhook_logs ORDER BY timestamp DESC LIMIT ?",
    )
    .bind(limit.clamp(1, 500))
    .fetch_all(pool)
    .await?;

    Ok(logs)
}

/// Mark a log row processed and attach the dispatch result. The processed
/// flag only ever goes false -> true.
pub async fn finalize(
    pool: &SqlitePool,
    id: &str,
    result: &serde_json::Value,
    processing_time_ms: i64,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE webhook_logs
        SET processed = 1, result = ?, processing_time_ms = ?
        WHERE id = ?
        "#,
    )
    .bind(Json(result.clone()))
    .bind(processing_time_ms)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::pool::test_pool;
    use chrono::Utc;

    fn sample_log(source: &str) -> WebhookLogRecord {
        WebhookLogRecord {
            id: uuid::Uuid::new_v4().to_string(),
            source: source.to_string(),
            timestamp: Utc::now(),
            data: Json(serde_json::json!({"title": "Bitcoin rally"})),
            processed: false,
            event_type: Some("crypto-rss".to_string()),
            result: None,
            processing_time_ms: None,
        }
    }

    #[tokio::test]
    async fn test_insert_and_finalize() {
        let pool = test_pool().await;
        let log = sample_log("rss-cointelegraph");
        insert(&pool, &log).await.unwrap();

        let stored = get_by_id(&pool, &log.id).await.unwrap().unwrap();
        assert!(!stored.processed);
        assert!(stored.result.is_none());

        finalize(&pool, &log.id, &serde_json::json!({"articleId": "a1"}), 42)
            .await
            .unwrap();

        let finalized = get_by_id(&pool, &log.id).await.unwrap().unwrap();
        assert!(finalized.processed);
        assert_eq!(finalized.processing_time_ms, Some(42));
        assert_eq!(
            finalized.result.unwrap().0["articleId"],
            serde_json::json!("a1")
        );
    }

    #[tokio::test]
    async fn test_list_is_bounded() {
        let pool = test_pool().await;
        for _ in 0..5 {
            insert(&pool, &sample_log("telegram")).await.unwrap();
        }

        let logs = list(&pool, 3).await.unwrap();
        assert_eq!(logs.len(), 3);
    }
}
