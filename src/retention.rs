// Scheduled retention: purge aged rows, then compact storage
//
// Runs once a day on its own task. Single-flight: an overlapping run is
// skipped, never queued.

use crate::config::RetentionConfig;
use crate::errors::Result;
use chrono::{Duration as ChronoDuration, Timelike, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Articles whose category contains this marker are never purged
const PROTECTED_CATEGORY_MARKER: &str = "important";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionReport {
    pub articles_deleted: u64,
    pub history_deleted: u64,
    pub logs_deleted: u64,
}

pub struct RetentionJob {
    pool: SqlitePool,
    config: RetentionConfig,
    guard: Arc<Mutex<()>>,
}

impl RetentionJob {
    pub fn new(pool: SqlitePool, config: RetentionConfig) -> Self {
        Self {
            pool,
            config,
            guard: Arc::new(Mutex::new(())),
        }
    }

    /// Spawn the daily schedule. Returns immediately; the job never blocks
    /// request handling.
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            if !self.config.enabled {
                tracing::info!("Retention job disabled");
                return;
            }

            tracing::info!(
                "Retention job scheduled daily at {:02}:00 UTC ({} day window)",
                self.config.hour_utc,
                self.config.max_age_days
            );

            loop {
                tokio::time::sleep(self.sleep_until_next_run()).await;

                match self.run_once().await {
                    Ok(Some(report)) => {
                        tracing::info!(
                            "Retention pass done: {} articles, {} history entries, {} webhook logs removed",
                            report.articles_deleted,
                            report.history_deleted,
                            report.logs_deleted
                        );
                    }
                    Ok(None) => {
                        tracing::warn!("Retention pass skipped, previous run still in flight");
                    }
                    Err(e) => {
                        tracing::error!("Retention pass failed: {}", e);
                    }
                }
            }
        })
    }

    fn sleep_until_next_run(&self) -> Duration {
        let now = Utc::now();
        let today_run = now
            .with_hour(self.config.hour_utc)
            .and_then(|t| t.with_minute(0))
            .and_then(|t| t.with_second(0))
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or(now);

        let next = if today_run > now {
            today_run
        } else {
            today_run + ChronoDuration::days(1)
        };

        (next - now).to_std().unwrap_or(Duration::from_secs(60))
    }

    /// One purge pass. Returns None when another pass holds the guard.
    pub async fn run_once(&self) -> Result<Option<RetentionReport>> {
        let Ok(_guard) = self.guard.try_lock() else {
            return Ok(None);
        };

        let cutoff = Utc::now() - ChronoDuration::days(self.config.max_age_days);
        tracing::info!("Retention pass starting (cutoff {})", cutoff);

        // Aged articles, except published ones and protected categories
        let articles = sqlx::query(
            r#"
            DELETE FROM articles
            WHERE created_at < ?
              AND status != 'published'
              AND (category IS NULL OR category NOT LIKE ?)
            "#,
        )
        .bind(cutoff)
        .bind(format!("%{}%", PROTECTED_CATEGORY_MARKER))
        .execute(&self.pool)
        .await?
        .rows_affected();

        // History and webhook logs age out unconditionally
        let history = sqlx::query("DELETE FROM generation_history WHERE timestamp < ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await?
            .rows_affected();

        let logs = sqlx::query("DELETE FROM webhook_logs WHERE timestamp < ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await?
            .rows_affected();

        // Compact after the purge
        sqlx::query("VACUUM").execute(&self.pool).await?;

        Ok(Some(RetentionReport {
            articles_deleted: articles,
            history_deleted: history,
            logs_deleted: logs,
        }))
    }
}
