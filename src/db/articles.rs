// Database queries for articles

use crate::db::schema::ArticleRecord;
use crate::errors::Result;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArticleFilter {
    pub project: Option<String>,
    pub status: Option<String>,
    pub author: Option<String>,
    pub language: Option<String>,
    pub limit: Option<i64>,
}

/// Partial update applied by PUT /api/articles/:id
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArticleUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub status: Option<String>,
    pub category: Option<String>,
    pub language: Option<String>,
}

impl ArticleUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.excerpt.is_none()
            && self.keywords.is_none()
            && self.status.is_none()
            && self.category.is_none()
            && self.language.is_none()
    }
}

/// Insert an article. Generic over the executor so the scenario execute path
/// can bundle it with the statistics update in one transaction.
pub async fn insert<'e, E>(executor: E, article: &ArticleRecord) -> Result<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO articles (
            id, title, content, excerpt, keywords, project_id, template_id,
            status, seo_data, source, scenario_id, original_article_id,
            language, category, word_count, author_id, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&article.id)
    .bind(&article.title)
    .bind(&article.content)
    .bind(&article.excerpt)
    .bind(&article.keywords)
    .bind(&article.project_id)
    .bind(&article.template_id)
    .bind(&article.status)
    .bind(&article.seo_data)
    .bind(&article.source)
    .bind(&article.scenario_id)
    .bind(&article.original_article_id)
    .bind(&article.language)
    .bind(&article.category)
    .bind(article.word_count)
    .bind(&article.author_id)
    .bind(article.created_at)
    .bind(article.updated_at)
    .execute(executor)
    .await?;

    Ok(())
}

pub async fn get_by_id(pool: &SqlitePool, id: &str) -> Result<Option<ArticleRecord>> {
    let article = sqlx::query_as::<_, ArticleRecord>("SELECT * FROM articles WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(article)
}

/// Filtered list, newest first
pub async fn list(pool: &SqlitePool, filter: &ArticleFilter) -> Result<Vec<ArticleRecord>> {
    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM articles WHERE 1=1");

    if let Some(project) = filter.project.as_deref() {
        builder.push(" AND project_id = ").push_bind(project.to_string());
    }

    if let Some(status) = filter.status.as_deref() {
        builder.push(" AND status = ").push_bind(status.to_string());
    }

    if let Some(author) = filter.author.as_deref() {
        builder.push(" AND author_id = ").push_bind(author.to_string());
    }

    if let Some(language) = filter.language.as_deref() {
        builder.push(" AND language = ").push_bind(language.to_string());
    }

    builder.push(" ORDER BY created_at DESC");

    let limit = filter.limit.unwrap_or(50).clamp(1, 500);
    builder.push(" LIMIT ").push_bind(limit);

    let articles = builder.build_query_as::<ArticleRecord>().fetch_all(pool).await?;
    Ok(articles)
}

/// Apply a partial update; returns the updated record, or None if the id is
/// unknown
pub async fn update(
    pool: &SqlitePool,
    id: &str,
    changes: &ArticleUpdate,
    now: DateTime<Utc>,
) -> Result<Option<ArticleRecord>> {
    if get_by_id(pool, id).await?.is_none() {
        return Ok(None);
    }

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE articles SET ");
    let mut fields = builder.separated(", ");

    if let Some(title) = &changes.title {
        fields.push("title = ").push_bind_unseparated(title.clone());
    }
    if let Some(content) = &changes.content {
        fields.push("content = ").push_bind_unseparated(content.clone());
        fields
            .push("word_count = ")
            .push_bind_unseparated(content.split_whitespace().count() as i64);
    }
    if let Some(excerpt) = &changes.excerpt {
        fields.push("excerpt = ").push_bind_unseparated(excerpt.clone());
    }
    if let Some(keywords) = &changes.keywords {
        fields
            .push("keywords = ")
            .push_bind_unseparated(sqlx::types::Json(keywords.clone()));
    }
    if let Some(status) = &changes.status {
        fields.push("status = ").push_bind_unseparated(status.clone());
    }
    if let Some(category) = &changes.category {
        fields.push("category = ").push_bind_unseparated(category.clone());
    }
    if let Some(language) = &changes.language {
        fields.push("language = ").push_bind_unseparated(language.clone());
    }
    fields.push("updated_at = ").push_bind_unseparated(now);

    builder.push(" WHERE id = ").push_bind(id.to_string());
    builder.build().execute(pool).await?;

    get_by_id(pool, id).await
}

/// Most recent published article in the given language, if any
pub async fn latest_published_in_language(
    pool: &SqlitePool,
    language: &str,
) -> Result<Option<ArticleRecord>> {
    let article = sqlx::query_as::<_, ArticleRecord>(
        r#"
        SELECT * FROM articles
        WHERE language = ? AND status = 'published'
        ORDER BY created_at DESC
        LIMIT 1
        "#,
    )
    .bind(language)
    .fetch_optional(pool)
    .await?;

    Ok(article)
}

/// Most recent article regardless of status or language
pub async fn latest(pool: &SqlitePool) -> Result<Option<ArticleRecord>> {
    let article =
        sqlx::query_as::<_, ArticleRecord>("SELECT * FROM articles ORDER BY created_at DESC LIMIT 1")
            .fetch_optional(pool)
            .await?;

    Ok(article)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::pool::test_pool;
    use crate::db::schema::SeoData;
    use sqlx::types::Json;

    fn sample_article(title: &str, status: &str, language: &str) -> ArticleRecord {
        let now = Utc::now();
        ArticleRecord {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.to_string(),
            content: "Un contenu de test pour la base.".to_string(),
            excerpt: None,
            keywords: Json(vec!["Crypto".to_string()]),
            project_id: None,
            template_id: None,
            status: status.to_string(),
            seo_data: Json(SeoData::default()),
            source: None,
            scenario_id: None,
            original_article_id: None,
            language: language.to_string(),
            category: None,
            word_count: 6,
            author_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_list_and_filters() {
        let pool = test_pool().await;
        insert(&pool, &sample_article("Bitcoin en hausse", "published", "FR")).await.unwrap();
        insert(&pool, &sample_article("Brouillon", "draft", "FR")).await.unwrap();

        let all = list(&pool, &ArticleFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);

        let published = list(
            &pool,
            &ArticleFilter {
                status: Some("published".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].title, "Bitcoin en hausse");
    }

    #[tokio::test]
    async fn test_latest_published_in_language() {
        let pool = test_pool().await;
        insert(&pool, &sample_article("Draft FR", "draft", "FR")).await.unwrap();
        insert(&pool, &sample_article("Published EN", "published", "EN")).await.unwrap();

        assert!(latest_published_in_language(&pool, "FR").await.unwrap().is_none());
        let en = latest_published_in_language(&pool, "EN").await.unwrap().unwrap();
        assert_eq!(en.title, "Published EN");

        assert!(latest(&pool).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_update_recomputes_word_count() {
        let pool = test_pool().await;
        let article = sample_article("Guide SEO", "draft", "FR");
        insert(&pool, &article).await.unwrap();

        let updated = update(
            &pool,
            &article.id,
            &ArticleUpdate {
                content: Some("one two three".to_string()),
                ..Default::default()
            },
            Utc::now(),
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(updated.word_count, 3);
    }
}
