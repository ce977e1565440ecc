use crate::{config::DatabaseConfig, errors::Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

/// Create a SQLite connection pool
pub async fn create_pool(config: &DatabaseConfig) -> Result<SqlitePool> {
    tracing::info!("Creating database connection pool");

    let options = SqliteConnectOptions::from_str(&config.url)
        .map_err(crate::errors::AppError::Database)?
        .create_if_missing(true)
        .foreign_keys(false);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
        .connect_with(options)
        .await?;

    tracing::info!(
        "Database connection pool created with {} max connections",
        config.max_connections
    );

    Ok(pool)
}

/// Create the tables and indexes if they do not exist yet
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    tracing::info!("Initializing database schema");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            username TEXT UNIQUE NOT NULL,
            email TEXT UNIQUE NOT NULL,
            name TEXT NOT NULL,
            role TEXT NOT NULL CHECK (role IN ('super_admin', 'manager', 'redacteur')),
            password_hash TEXT NOT NULL,
            avatar TEXT,
            status TEXT NOT NULL DEFAULT 'active' CHECK (status IN ('active', 'inactive')),
            created_at TEXT NOT NULL,
            last_login TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS scenarios (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            type TEXT NOT NULL CHECK (type IN ('scraping', 'redaction', 'ia-generator', 'translation')),
            category TEXT,
            status TEXT NOT NULL DEFAULT 'pending' CHECK (status IN ('active', 'paused', 'error', 'pending')),
            source TEXT NOT NULL,
            target TEXT,
            language TEXT NOT NULL DEFAULT 'FR',
            last_execution TEXT,
            next_execution TEXT,
            execution_count INTEGER NOT NULL DEFAULT 0,
            success_rate REAL NOT NULL DEFAULT 100.0,
            avg_execution_time REAL NOT NULL DEFAULT 0.0,
            description TEXT,
            config TEXT NOT NULL DEFAULT '{}',
            created_at TEXT NOT NULL,
            updated_at TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS articles (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            excerpt TEXT,
            keywords TEXT NOT NULL DEFAULT '[]',
            project_id TEXT,
            template_id TEXT,
            status TEXT NOT NULL DEFAULT 'draft'
                CHECK (status IN ('draft', 'published', 'archived', 'ready-for-wordpress')),
            seo_data TEXT NOT NULL DEFAULT '{}',
            source TEXT,
            scenario_id TEXT,
            original_article_id TEXT,
            language TEXT NOT NULL DEFAULT 'FR',
            category TEXT,
            word_count INTEGER NOT NULL DEFAULT 0,
            author_id TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS generation_history (
            id TEXT PRIMARY KEY,
            provider TEXT NOT NULL,
            prompt TEXT NOT NULL,
            content TEXT,
            timestamp TEXT NOT NULL,
            word_count INTEGER NOT NULL DEFAULT 0,
            template TEXT,
            status TEXT NOT NULL CHECK (status IN ('success', 'error')),
            settings TEXT NOT NULL DEFAULT '{}',
            user_id TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS webhook_logs (
            id TEXT PRIMARY KEY,
            source TEXT NOT NULL,
            timestamp TEXT NOT NULL,
            data TEXT NOT NULL,
            processed INTEGER NOT NULL DEFAULT 0,
            type TEXT,
            result TEXT,
            processing_time_ms INTEGER
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS ai_providers (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'disconnected'
                CHECK (status IN ('connected', 'disconnected', 'error')),
            description TEXT,
            api_key TEXT,
            last_used TEXT,
            capabilities TEXT NOT NULL DEFAULT '[]',
            max_tokens INTEGER NOT NULL DEFAULT 0,
            pricing TEXT NOT NULL DEFAULT 'standard'
        )
        "#,
    )
    .execute(pool)
    .await?;

    create_indexes(pool).await?;

    tracing::info!("Database schema ready");
    Ok(())
}

async fn create_indexes(pool: &SqlitePool) -> Result<()> {
    let statements = [
        "CREATE INDEX IF NOT EXISTS idx_articles_created_at ON articles(created_at DESC)",
        "CREATE INDEX IF NOT EXISTS idx_articles_status ON articles(status)",
        "CREATE INDEX IF NOT EXISTS idx_articles_author ON articles(author_id)",
        "CREATE INDEX IF NOT EXISTS idx_articles_project ON articles(project_id)",
        "CREATE INDEX IF NOT EXISTS idx_generation_timestamp ON generation_history(timestamp DESC)",
        "CREATE INDEX IF NOT EXISTS idx_generation_provider ON generation_history(provider)",
        "CREATE INDEX IF NOT EXISTS idx_generation_user ON generation_history(user_id)",
        "CREATE INDEX IF NOT EXISTS idx_webhook_timestamp ON webhook_logs(timestamp DESC)",
        "CREATE INDEX IF NOT EXISTS idx_webhook_source ON webhook_logs(source)",
        "CREATE INDEX IF NOT EXISTS idx_webhook_processed ON webhook_logs(processed)",
        "CREATE INDEX IF NOT EXISTS idx_scenarios_status ON scenarios(status)",
        "CREATE INDEX IF NOT EXISTS idx_scenarios_type ON scenarios(type)",
    ];

    for statement in statements {
        sqlx::query(statement).execute(pool).await?;
    }

    Ok(())
}

/// Health check for the database connection
pub async fn health_check(pool: &SqlitePool) -> Result<()> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// In-memory pool for tests. Single connection so every query sees the same
/// database.
#[cfg(test)]
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("failed to open in-memory database");

    init_schema(&pool).await.expect("failed to initialize schema");
    pool
}
