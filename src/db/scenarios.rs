// Database queries for scenarios

use crate::db::schema::ScenarioRecord;
use crate::errors::Result;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

/// List filters accepted by the scenario registry
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScenarioFilter {
    #[serde(rename = "type")]
    pub scenario_type: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
}

/// Partial update applied by PUT /api/scenarios/:id
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScenarioUpdate {
    pub name: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
    pub source: Option<String>,
    pub target: Option<String>,
    pub language: Option<String>,
    #[serde(rename = "nextExecution")]
    pub next_execution: Option<String>,
    pub description: Option<String>,
    pub config: Option<serde_json::Value>,
}

impl ScenarioUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.status.is_none()
            && self.source.is_none()
            && self.target.is_none()
            && self.language.is_none()
            && self.next_execution.is_none()
            && self.description.is_none()
            && self.config.is_none()
    }
}

pub async fn insert(pool: &SqlitePool, scenario: &ScenarioRecord) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO scenarios (
            id, name, type, category, status, source, target, language,
            last_execution, next_execution, execution_count, success_rate,
            avg_execution_time, description, config, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&scenario.id)
    .bind(&scenario.name)
    .bind(&scenario.scenario_type)
    .bind(&scenario.category)
    .bind(&scenario.status)
    .bind(&scenario.source)
    .bind(&scenario.target)
    .bind(&scenario.language)
    .bind(scenario.last_execution)
    .bind(&scenario.next_execution)
    .bind(scenario.execution_count)
    .bind(scenario.success_rate)
    .bind(scenario.avg_execution_time)
    .bind(&scenario.description)
    .bind(&scenario.config)
    .bind(scenario.created_at)
    .bind(scenario.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn get_by_id(pool: &SqlitePool, id: &str) -> Result<Option<ScenarioRecord>> {
    let scenario = sqlx::query_as::<_, ScenarioRecord>("SELECT * FROM scenarios WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(scenario)
}

/// Filtered list, most recently executed first
pub async fn list(pool: &SqlitePool, filter: &ScenarioFilter) -> Result<Vec<ScenarioRecord>> {
    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM scenarios WHERE 1=1");

    if let Some(scenario_type) = filter.scenario_type.as_deref().filter(|t| *t != "all") {
        builder.push(" AND type = ").push_bind(scenario_type.to_string());
    }

    if let Some(status) = filter.status.as_deref().filter(|s| *s != "all") {
        builder.push(" AND status = ").push_bind(status.to_string());
    }

    if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        builder
            .push(" AND (name LIKE ")
            .push_bind(pattern.clone())
            .push(" OR source LIKE ")
            .push_bind(pattern.clone())
            .push(" OR category LIKE ")
            .push_bind(pattern)
            .push(")");
    }

    builder.push(" ORDER BY last_execution DESC");

    let scenarios = builder.build_query_as::<ScenarioRecord>().fetch_all(pool).await?;
    Ok(scenarios)
}

/// Apply a partial update; returns the updated record, or None if the id is
/// unknown
pub async fn update(
    pool: &SqlitePool,
    id: &str,
    changes: &ScenarioUpdate,
    now: DateTime<Utc>,
) -> Result<Option<ScenarioRecord>> {
    if get_by_id(pool, id).await?.is_none() {
        return Ok(None);
    }

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE scenarios SET ");
    let mut fields = builder.separated(", ");

    if let Some(name) = &changes.name {
        fields.push("name = ").push_bind_unseparated(name.clone());
    }
    if let Some(category) = &changes.category {
        fields.push("category = ").push_bind_unseparated(category.clone());
    }
    if let Some(status) = &changes.status {
        fields.push("status = ").push_bind_unseparated(status.clone());
    }
    if let Some(source) = &changes.source {
        fields.push("source = ").push_bind_unseparated(source.clone());
    }
    if let Some(target) = &changes.target {
        fields.push("target = ").push_bind_unseparated(target.clone());
    }
    if let Some(language) = &changes.language {
        fields.push("language = ").push_bind_unseparated(language.clone());
    }
    if let Some(next_execution) = &changes.next_execution {
        fields
            .push("next_execution = ")
            .push_bind_unseparated(next_execution.clone());
    }
    if let Some(description) = &changes.description {
        fields
            .push("description = ")
            .push_bind_unseparated(description.clone());
    }
    if let Some(config) = &changes.config {
        fields
            .push("config = ")
            .push_bind_unseparated(sqlx::types::Json(config.clone()));
    }
    fields.push("updated_at = ").push_bind_unseparated(now);

    builder.push(" WHERE id = ").push_bind(id.to_string());
    builder.build().execute(pool).await?;

    get_by_id(pool, id).await
}

pub async fn set_status(pool: &SqlitePool, id: &str, status: &str, now: DateTime<Utc>) -> Result<()> {
    sqlx::query("UPDATE scenarios SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Write the post-execution statistics. Runs against any executor so the
/// caller can bundle it with the article insert in one transaction.
pub async fn update_stats<'e, E>(
    executor: E,
    id: &str,
    execution_count: i64,
    success_rate: f64,
    avg_execution_time: f64,
    last_execution: DateTime<Utc>,
) -> Result<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        UPDATE scenarios
        SET execution_count = ?, success_rate = ?, avg_execution_time = ?,
            last_execution = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(execution_count)
    .bind(success_rate)
    .bind(avg_execution_time)
    .bind(last_execution)
    .bind(last_execution)
    .bind(id)
    .execute(executor)
    .await?;

    Ok(())
}

pub async fn delete(pool: &SqlitePool, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM scenarios WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::pool::test_pool;
    use sqlx::types::Json;

    fn sample_scenario(name: &str, scenario_type: &str, status: &str, source: &str) -> ScenarioRecord {
        ScenarioRecord {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            scenario_type: scenario_type.to_string(),
            category: Some("Crypto News".to_string()),
            status: status.to_string(),
            source: source.to_string(),
            target: Some("ContentGen".to_string()),
            language: "FR".to_string(),
            last_execution: None,
            next_execution: Some("Manuel".to_string()),
            execution_count: 0,
            success_rate: 100.0,
            avg_execution_time: 0.0,
            description: None,
            config: Json(serde_json::json!({})),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_filters() {
        let pool = test_pool().await;
        insert(&pool, &sample_scenario("Scrapping Cointelegraph", "scraping", "active", "Cointelegraph"))
            .await
            .unwrap();
        insert(&pool, &sample_scenario("Traduction DE", "translation", "paused", "Evergreen FR"))
            .await
            .unwrap();

        let all = list(&pool, &ScenarioFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);

        let scraping = list(
            &pool,
            &ScenarioFilter {
                scenario_type: Some("scraping".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(scraping.len(), 1);
        assert_eq!(scraping[0].source, "Cointelegraph");

        let searched = list(
            &pool,
            &ScenarioFilter {
                search: Some("cointele".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(searched.len(), 1);

        let paused = list(
            &pool,
            &ScenarioFilter {
                status: Some("paused".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(paused.len(), 1);
        assert_eq!(paused[0].scenario_type, "translation");
    }

    #[tokio::test]
    async fn test_partial_update_and_delete() {
        let pool = test_pool().await;
        let scenario = sample_scenario("Scrapping Newsbit", "scraping", "pending", "Newsbit");
        insert(&pool, &scenario).await.unwrap();

        let updated = update(
            &pool,
            &scenario.id,
            &ScenarioUpdate {
                name: Some("Scrapping Newsbit v2".to_string()),
                ..Default::default()
            },
            Utc::now(),
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(updated.name, "Scrapping Newsbit v2");
        assert_eq!(updated.source, "Newsbit");
        assert!(updated.updated_at.is_some());

        assert!(delete(&pool, &scenario.id).await.unwrap());
        assert!(!delete(&pool, &scenario.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_stats() {
        let pool = test_pool().await;
        let scenario = sample_scenario("Scrapping Blockworks", "scraping", "active", "Blockworks");
        insert(&pool, &scenario).await.unwrap();

        let now = Utc::now();
        update_stats(&pool, &scenario.id, 1, 99.5, 2.5, now).await.unwrap();

        let reloaded = get_by_id(&pool, &scenario.id).await.unwrap().unwrap();
        assert_eq!(reloaded.execution_count, 1);
        assert!((reloaded.success_rate - 99.5).abs() < f64::EPSILON);
        assert!((reloaded.avg_execution_time - 2.5).abs() < f64::EPSILON);
        assert!(reloaded.last_execution.is_some());
    }
}
