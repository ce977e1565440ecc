// Webhook ingestion gateway
//
// Every inbound event is journaled before anything else happens: the log
// insert is the only failure that can prevent acknowledgement. Matching and
// generation then run on a decoupled task, and the log row is finalized with
// the outcome. Unmatched events keep processed = false so operators can pick
// them up later.

use crate::api::routes::AppState;
use crate::db::schema::{ScenarioRecord, ScenarioType, WebhookLogRecord};
use crate::db::{articles, scenarios, webhook_logs};
use crate::errors::Result;
use crate::pipeline;
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use sqlx::types::Json;
use std::time::Instant;
use uuid::Uuid;

/// Marker token matched against redaction scenario sources
const CHAT_INTAKE_MARKER: &str = "telegram";

/// The five inbound route families
#[derive(Debug, Clone)]
pub enum WebhookFamily {
    /// Generic automation platforms (make, n8n)
    Platform(&'static str),
    /// RSS-style crypto feed, tagged with the path source token
    CryptoFeed(String),
    /// Chat-document intake
    ChatIntake,
    /// Generic AI trigger
    AiTrigger,
}

impl WebhookFamily {
    /// Source label stored on the log row
    pub fn source_label(&self) -> String {
        match self {
            WebhookFamily::Platform(name) => format!("{}.com", name),
            WebhookFamily::CryptoFeed(source) => format!("rss-{}", source),
            WebhookFamily::ChatIntake => "telegram".to_string(),
            WebhookFamily::AiTrigger => "ia-trigger".to_string(),
        }
    }

    fn event_type(&self) -> Option<&'static str> {
        match self {
            WebhookFamily::Platform(_) => Some("automation"),
            WebhookFamily::CryptoFeed(_) => Some("crypto-rss"),
            WebhookFamily::ChatIntake => Some("telegram"),
            WebhookFamily::AiTrigger => Some("ia-trigger"),
        }
    }
}

/// Immediate acknowledgement returned to the caller
#[derive(Debug, Clone, Serialize)]
pub struct IngestReceipt {
    pub webhook_id: String,
    pub message: String,
}

/// Journal the event, acknowledge, and hand processing to a background task.
/// The returned handle is the processing task; request handlers drop it,
/// tests await it.
pub async fn ingest(
    state: &AppState,
    family: WebhookFamily,
    payload: Value,
) -> Result<(IngestReceipt, tokio::task::JoinHandle<()>)> {
    let log = WebhookLogRecord {
        id: Uuid::new_v4().to_string(),
        source: family.source_label(),
        timestamp: Utc::now(),
        data: Json(payload.clone()),
        processed: false,
        event_type: family.event_type().map(|t| t.to_string()),
        result: None,
        processing_time_ms: None,
    };

    // Audit before action: nothing else may happen until this row is durable
    webhook_logs::insert(&state.pool, &log).await?;
    tracing::info!("Webhook received from {} (log {})", log.source, log.id);

    let receipt = IngestReceipt {
        webhook_id: log.id.clone(),
        message: format!("Webhook reçu de {}, traitement en cours", log.source),
    };

    let task_state = state.clone();
    let handle = tokio::spawn(async move {
        process(&task_state, &log.id, family, payload).await;
    });

    Ok((receipt, handle))
}

/// Match and dispatch one journaled event, then finalize its log row.
/// Runs on the decoupled path; also called directly by tests.
pub async fn process(state: &AppState, log_id: &str, family: WebhookFamily, payload: Value) {
    let started = Instant::now();
    let outcome = dispatch(state, &family, &payload).await;
    let elapsed_ms = started.elapsed().as_millis() as i64;

    let result = match outcome {
        // No matching scenario and nothing to generate: the event stays
        // unprocessed, available for manual handling
        Ok(None) => {
            tracing::info!("Webhook {} left unprocessed (no matching scenario)", log_id);
            return;
        }
        Ok(Some(article_id)) => {
            tracing::info!("Webhook {} produced article {}", log_id, article_id);
            json!({ "status": "generated", "articleId": article_id })
        }
        Err(e) => {
            tracing::error!("Webhook {} dispatch failed: {}", log_id, e);
            json!({ "status": "failed", "error": e.to_string() })
        }
    };

    if let Err(e) = webhook_logs::finalize(&state.pool, log_id, &result, elapsed_ms).await {
        tracing::error!("Failed to finalize webhook log {}: {}", log_id, e);
    }
}

/// Resolve a matching active scenario and run its handler. Returns the id of
/// the produced article, or None when the event needs no generation.
async fn dispatch(state: &AppState, family: &WebhookFamily, payload: &Value) -> Result<Option<String>> {
    match family {
        WebhookFamily::Platform(_) => {
            let wants_article = payload
                .get("action")
                .and_then(|v| v.as_str())
                .map(|action| action == "generate_article")
                .unwrap_or(false);

            if !wants_article {
                return Ok(None);
            }

            let article = pipeline::generic_article(payload, None);
            articles::insert(&state.pool, &article).await?;
            Ok(Some(article.id))
        }
        WebhookFamily::CryptoFeed(source) => {
            let scenario =
                find_active(state, ScenarioType::Scraping, |s| contains_ci(&s.source, source)).await?;
            run_matched(state, scenario, payload).await
        }
        WebhookFamily::ChatIntake => {
            let scenario = find_active(state, ScenarioType::Redaction, |s| {
                contains_ci(&s.source, CHAT_INTAKE_MARKER)
            })
            .await?;
            run_matched(state, scenario, payload).await
        }
        WebhookFamily::AiTrigger => {
            // First active ia-generator scenario in list order
            let scenario = find_active(state, ScenarioType::IaGenerator, |_| true).await?;
            run_matched(state, scenario, payload).await
        }
    }
}

async fn run_matched(
    state: &AppState,
    scenario: Option<ScenarioRecord>,
    payload: &Value,
) -> Result<Option<String>> {
    let Some(scenario) = scenario else {
        return Ok(None);
    };

    let article =
        pipeline::run_handler(&state.pool, state.translator.as_ref(), &scenario, payload).await?;
    articles::insert(&state.pool, &article).await?;

    Ok(Some(article.id))
}

/// First active scenario of the given type satisfying the predicate, in
/// registry list order
async fn find_active<F>(
    state: &AppState,
    scenario_type: ScenarioType,
    predicate: F,
) -> Result<Option<ScenarioRecord>>
where
    F: Fn(&ScenarioRecord) -> bool,
{
    let filter = scenarios::ScenarioFilter {
        scenario_type: Some(scenario_type.as_str().to_string()),
        status: Some("active".to_string()),
        search: None,
    };

    let candidates = scenarios::list(&state.pool, &filter).await?;
    Ok(candidates.into_iter().find(predicate))
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::routes::test_support::test_state;

    fn scenario(scenario_type: &str, status: &str, source: &str) -> ScenarioRecord {
        ScenarioRecord {
            id: Uuid::new_v4().to_string(),
            name: format!("Scenario {}", source),
            scenario_type: scenario_type.to_string(),
            category: None,
            status: status.to_string(),
            source: source.to_string(),
            target: None,
            language: "FR".to_string(),
            last_execution: None,
            next_execution: None,
            execution_count: 0,
            success_rate: 100.0,
            avg_execution_time: 0.0,
            description: None,
            config: Json(json!({})),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_chat_intake_always_journals_exactly_one_log() {
        // Without any matching scenario
        let state = test_state().await;
        let (receipt, handle) = ingest(&state, WebhookFamily::ChatIntake, json!({"url": "https://x"}))
            .await
            .unwrap();
        handle.await.unwrap();

        let logs = webhook_logs::list(&state.pool, 100).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].id, receipt.webhook_id);
        assert_eq!(logs[0].source, "telegram");

        // With a matching scenario: still exactly one new log row
        scenarios::insert(&state.pool, &scenario("redaction", "active", "Telegram URL"))
            .await
            .unwrap();
        let (_, handle) = ingest(&state, WebhookFamily::ChatIntake, json!({"url": "https://y"}))
            .await
            .unwrap();
        handle.await.unwrap();

        let logs = webhook_logs::list(&state.pool, 100).await.unwrap();
        assert_eq!(logs.len(), 2);
    }

    #[tokio::test]
    async fn test_crypto_match_is_case_insensitive_and_finalizes_log() {
        let state = test_state().await;
        scenarios::insert(&state.pool, &scenario("scraping", "active", "Cointelegraph"))
            .await
            .unwrap();

        let family = WebhookFamily::CryptoFeed("cointelegraph".to_string());
        let (receipt, handle) = ingest(&state, family, json!({"title": "Bitcoin rally"}))
            .await
            .unwrap();
        handle.await.unwrap();

        let log = webhook_logs::get_by_id(&state.pool, &receipt.webhook_id)
            .await
            .unwrap()
            .unwrap();
        assert!(log.processed);
        assert!(log.processing_time_ms.is_some());
        let result = log.result.unwrap().0;
        assert_eq!(result["status"], "generated");

        let article_id = result["articleId"].as_str().unwrap();
        let article = articles::get_by_id(&state.pool, article_id).await.unwrap().unwrap();
        assert_eq!(article.status, "published");
        assert_eq!(article.category.as_deref(), Some("Crypto News"));
    }

    #[tokio::test]
    async fn test_paused_scenarios_are_not_matched() {
        let state = test_state().await;
        scenarios::insert(&state.pool, &scenario("scraping", "paused", "Cointelegraph"))
            .await
            .unwrap();

        let family = WebhookFamily::CryptoFeed("cointelegraph".to_string());
        let (receipt, handle) = ingest(&state, family, json!({})).await.unwrap();
        handle.await.unwrap();

        let log = webhook_logs::get_by_id(&state.pool, &receipt.webhook_id)
            .await
            .unwrap()
            .unwrap();
        assert!(!log.processed, "unmatched events stay available for manual processing");
        assert!(articles::list(&state.pool, &Default::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_platform_generate_action_creates_draft() {
        let state = test_state().await;
        let payload = json!({"action": "generate_article", "title": "Via Make"});

        let (_, handle) = ingest(&state, WebhookFamily::Platform("make"), payload).await.unwrap();
        handle.await.unwrap();

        let articles = articles::list(&state.pool, &Default::default()).await.unwrap();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].status, "draft");
        assert_eq!(articles[0].title, "Via Make");
    }

    #[tokio::test]
    async fn test_ai_trigger_takes_first_active_generator() {
        let state = test_state().await;
        scenarios::insert(&state.pool, &scenario("ia-generator", "active", "IA Engine"))
            .await
            .unwrap();

        let (receipt, handle) = ingest(&state, WebhookFamily::AiTrigger, json!({"prompt": "Tendances"}))
            .await
            .unwrap();
        handle.await.unwrap();

        let log = webhook_logs::get_by_id(&state.pool, &receipt.webhook_id)
            .await
            .unwrap()
            .unwrap();
        assert!(log.processed);
        assert_eq!(log.result.unwrap().0["status"], "generated");
    }
}
