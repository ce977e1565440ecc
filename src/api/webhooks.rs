// Webhook HTTP surface
//
// Thin handlers over the gateway. Callers always get 200 with an in-band
// success flag; the only exception is a failure to journal the event, which
// surfaces as a 500 before any acknowledgement.

use crate::api::routes::AppState;
use crate::auth::AuthUser;
use crate::authz::Permission;
use crate::db::schema::WebhookLogRecord;
use crate::db::webhook_logs;
use crate::errors::Result;
use crate::gateway::{self, WebhookFamily};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

async fn ingest(
    state: &AppState,
    family: WebhookFamily,
    payload: Option<Json<Value>>,
) -> Result<Json<Value>> {
    let payload = payload.map(|Json(value)| value).unwrap_or_else(|| json!({}));

    let (receipt, _task) = gateway::ingest(state, family, payload).await?;

    Ok(Json(json!({
        "success": true,
        "message": receipt.message,
        "webhookId": receipt.webhook_id,
    })))
}

/// POST /api/webhooks/make
pub async fn make(
    State(state): State<AppState>,
    payload: Option<Json<Value>>,
) -> Result<Json<Value>> {
    ingest(&state, WebhookFamily::Platform("make"), payload).await
}

/// POST /api/webhooks/n8n
pub async fn n8n(
    State(state): State<AppState>,
    payload: Option<Json<Value>>,
) -> Result<Json<Value>> {
    ingest(&state, WebhookFamily::Platform("n8n"), payload).await
}

/// POST /api/webhooks/crypto/:source
pub async fn crypto(
    State(state): State<AppState>,
    Path(source): Path<String>,
    payload: Option<Json<Value>>,
) -> Result<Json<Value>> {
    ingest(&state, WebhookFamily::CryptoFeed(source), payload).await
}

/// POST /api/webhooks/telegram
pub async fn telegram(
    State(state): State<AppState>,
    payload: Option<Json<Value>>,
) -> Result<Json<Value>> {
    ingest(&state, WebhookFamily::ChatIntake, payload).await
}

/// POST /api/webhooks/ia-trigger
pub async fn ia_trigger(
    State(state): State<AppState>,
    payload: Option<Json<Value>>,
) -> Result<Json<Value>> {
    ingest(&state, WebhookFamily::AiTrigger, payload).await
}

#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    pub limit: Option<i64>,
}

/// GET /api/webhooks/logs
pub async fn logs(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<LogsQuery>,
) -> Result<Json<Vec<WebhookLogRecord>>> {
    auth.role.require(Permission::ViewSystemLogs)?;

    let logs = webhook_logs::list(&state.pool, query.limit.unwrap_or(100)).await?;
    Ok(Json(logs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::routes::create_router;
    use crate::api::routes::test_support::{send, test_state, token_for};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_all_webhook_families_acknowledge() {
        let state = test_state().await;
        let app = create_router(state);

        for uri in [
            "/api/webhooks/make",
            "/api/webhooks/n8n",
            "/api/webhooks/crypto/cointelegraph",
            "/api/webhooks/telegram",
            "/api/webhooks/ia-trigger",
        ] {
            let (status, body) = send(app.clone(), "POST", uri, None, Some(json!({}))).await;
            assert_eq!(status, StatusCode::OK, "{} did not acknowledge", uri);
            assert_eq!(body["success"], true);
        }
    }

    #[tokio::test]
    async fn test_empty_body_is_accepted() {
        let state = test_state().await;
        let app = create_router(state);

        let (status, body) = send(app, "POST", "/api/webhooks/telegram", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
    }

    #[tokio::test]
    async fn test_log_listing_requires_view_system_logs() {
        let state = test_state().await;
        let manager = token_for(&state, "manager", "manager").await;
        let admin = token_for(&state, "admin", "super_admin").await;
        let app = create_router(state.clone());

        send(app.clone(), "POST", "/api/webhooks/telegram", None, Some(json!({}))).await;

        let (status, _) = send(app.clone(), "GET", "/api/webhooks/logs", Some(&manager), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = send(app, "GET", "/api/webhooks/logs", Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
    }
}
