// Scenario registry endpoints: CRUD, toggle, execute

use crate::api::routes::AppState;
use crate::auth::AuthUser;
use crate::authz::Permission;
use crate::db::scenarios::{self, ScenarioFilter, ScenarioUpdate};
use crate::db::schema::{ArticleRecord, ScenarioRecord, ScenarioStatus, ScenarioType};
use crate::db::articles;
use crate::domain::scenario as state_machine;
use crate::errors::{AppError, Result};
use crate::pipeline;
use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::types::Json as SqlJson;
use uuid::Uuid;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateScenario {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub scenario_type: Option<String>,
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

#[derive(Debug, Serialize)]
pub struct ExecuteResponse {
    pub success: bool,
    pub message: String,
    pub result: ArticleRecord,
    #[serde(rename = "executionTime")]
    pub execution_time: f64,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/scenarios
pub async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(filter): Query<ScenarioFilter>,
) -> Result<Json<Vec<ScenarioRecord>>> {
    auth.role
        .require_any(&[Permission::ViewScenarios, Permission::ManageScenarios])?;

    let scenarios = scenarios::list(&state.pool, &filter).await?;
    Ok(Json(scenarios))
}

/// POST /api/scenarios
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(request): Json<CreateScenario>,
) -> Result<Json<ScenarioRecord>> {
    auth.role.require(Permission::ManageScenarios)?;

    let name = request
        .name
        .as_deref()
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Scenario name is required".to_string()))?;

    let scenario_type = request
        .scenario_type
        .as_deref()
        .and_then(ScenarioType::parse)
        .ok_or_else(|| AppError::Validation("Unknown scenario type".to_string()))?;

    let source = request
        .source
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Scenario source is required".to_string()))?;

    let status = match request.status.as_deref() {
        None => ScenarioStatus::Pending,
        Some(s) => ScenarioStatus::parse(s)
            .ok_or_else(|| AppError::Validation("Unknown scenario status".to_string()))?,
    };

    let scenario = ScenarioRecord {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        scenario_type: scenario_type.as_str().to_string(),
        category: request.category,
        status: status.as_str().to_string(),
        source: source.to_string(),
        target: Some(request.target.unwrap_or_else(|| "ContentGen".to_string())),
        language: request.language.unwrap_or_else(|| "FR".to_string()),
        last_execution: None,
        next_execution: Some(request.next_execution.unwrap_or_else(|| "Manuel".to_string())),
        execution_count: 0,
        success_rate: 100.0,
        avg_execution_time: 0.0,
        description: request.description,
        config: SqlJson(request.config.unwrap_or_else(|| json!({}))),
        created_at: Utc::now(),
        updated_at: None,
    };

    scenarios::insert(&state.pool, &scenario).await?;
    tracing::info!("Scenario created: {} (type {})", scenario.name, scenario.scenario_type);

    Ok(Json(scenario))
}

/// PUT /api/scenarios/:id
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(changes): Json<ScenarioUpdate>,
) -> Result<Json<ScenarioRecord>> {
    auth.role.require(Permission::ManageScenarios)?;

    if let Some(status) = changes.status.as_deref() {
        if ScenarioStatus::parse(status).is_none() {
            return Err(AppError::Validation("Unknown scenario status".to_string()));
        }
    }

    let scenario = scenarios::update(&state.pool, &id, &changes, Utc::now())
        .await?
        .ok_or(AppError::ScenarioNotFound)?;

    tracing::info!("Scenario updated: {}", scenario.name);
    Ok(Json(scenario))
}

/// DELETE /api/scenarios/:id
///
/// Hard delete. Articles referencing the scenario keep their weak reference.
pub async fn remove(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    auth.role.require(Permission::ManageScenarios)?;

    if !scenarios::delete(&state.pool, &id).await? {
        return Err(AppError::ScenarioNotFound);
    }

    tracing::info!("Scenario deleted: {}", id);
    Ok(Json(json!({ "message": "Scénario supprimé avec succès" })))
}

/// POST /api/scenarios/:id/toggle
pub async fn toggle(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    auth.role.require(Permission::ManageScenarios)?;

    let scenario = scenarios::get_by_id(&state.pool, &id)
        .await?
        .ok_or(AppError::ScenarioNotFound)?;

    let next = state_machine::toggled(&scenario.status)?;
    scenarios::set_status(&state.pool, &id, next.as_str(), Utc::now()).await?;

    tracing::info!("Scenario {} toggled to {}", scenario.name, next.as_str());
    Ok(Json(json!({
        "status": next.as_str(),
        "message": match next {
            ScenarioStatus::Active => "Scénario activé",
            _ => "Scénario mis en pause",
        },
    })))
}

/// POST /api/scenarios/:id/execute
///
/// Runs one execution: the statistics update and the produced article are
/// committed in a single transaction.
pub async fn execute(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ExecuteResponse>> {
    auth.role.require(Permission::ManageScenarios)?;

    let scenario = scenarios::get_by_id(&state.pool, &id)
        .await?
        .ok_or(AppError::ScenarioNotFound)?;

    tracing::info!("Executing scenario: {}", scenario.name);

    let outcome = state.simulator.run(&scenario).await;

    let article = match pipeline::run_handler(
        &state.pool,
        state.translator.as_ref(),
        &scenario,
        &json!({}),
    )
    .await
    {
        Ok(article) => article,
        Err(e) => {
            // Execution outcome drives the orthogonal error status
            scenarios::set_status(&state.pool, &id, ScenarioStatus::Error.as_str(), Utc::now())
                .await?;
            return Err(e);
        }
    };

    let stats = state_machine::fold_execution(
        scenario.execution_count,
        scenario.success_rate,
        scenario.avg_execution_time,
        outcome.duration.as_secs_f64(),
        outcome.success_delta,
        Utc::now(),
    );

    let mut tx = state.pool.begin().await?;
    scenarios::update_stats(
        &mut *tx,
        &id,
        stats.execution_count,
        stats.success_rate,
        stats.avg_execution_time,
        stats.last_execution,
    )
    .await?;
    articles::insert(&mut *tx, &article).await?;
    tx.commit().await?;

    Ok(Json(ExecuteResponse {
        success: true,
        message: "Scénario exécuté avec succès".to_string(),
        result: article,
        execution_time: stats.avg_execution_time,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::routes::test_support::{send, test_state, token_for};
    use crate::api::routes::create_router;
    use axum::http::StatusCode;

    async fn create_via_api(app: axum::Router, token: &str, body: serde_json::Value) -> serde_json::Value {
        let (status, created) = send(app, "POST", "/api/scenarios", Some(token), Some(body)).await;
        assert_eq!(status, StatusCode::OK);
        created
    }

    #[tokio::test]
    async fn test_create_requires_manage_permission() {
        let state = test_state().await;
        let manager = token_for(&state, "manager", "manager").await;
        let app = create_router(state);

        let (status, _) = send(
            app,
            "POST",
            "/api/scenarios",
            Some(&manager),
            Some(json!({"name": "x", "type": "scraping", "source": "Bitcoin"})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_type() {
        let state = test_state().await;
        let admin = token_for(&state, "admin", "super_admin").await;
        let app = create_router(state);

        let (status, _) = send(
            app,
            "POST",
            "/api/scenarios",
            Some(&admin),
            Some(json!({"name": "x", "type": "rss", "source": "Bitcoin"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_toggle_round_trip_and_conflict() {
        let state = test_state().await;
        let admin = token_for(&state, "admin", "super_admin").await;
        let app = create_router(state);

        let created = create_via_api(
            app.clone(),
            &admin,
            json!({"name": "Scrapping Bitcoin", "type": "scraping", "source": "Bitcoin", "status": "active"}),
        )
        .await;
        let id = created["id"].as_str().unwrap();

        let uri = format!("/api/scenarios/{}/toggle", id);
        let (status, body) = send(app.clone(), "POST", &uri, Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "paused");

        let (status, body) = send(app.clone(), "POST", &uri, Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "active");

        // Pending scenarios cannot be toggled
        let pending = create_via_api(
            app.clone(),
            &admin,
            json!({"name": "Nouveau", "type": "scraping", "source": "Newsbit"}),
        )
        .await;
        let uri = format!("/api/scenarios/{}/toggle", pending["id"].as_str().unwrap());
        let (status, _) = send(app, "POST", &uri, Some(&admin), None).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_execute_updates_stats_and_creates_article() {
        let state = test_state().await;
        let admin = token_for(&state, "admin", "super_admin").await;
        let pool = state.pool.clone();
        let app = create_router(state);

        let created = create_via_api(
            app.clone(),
            &admin,
            json!({"name": "Scrapping Cointelegraph", "type": "scraping", "source": "Cointelegraph", "status": "active"}),
        )
        .await;
        let id = created["id"].as_str().unwrap().to_string();

        let uri = format!("/api/scenarios/{}/execute", id);
        let (status, body) = send(app.clone(), "POST", &uri, Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["result"]["status"], "published");
        assert_eq!(body["result"]["category"], "Crypto News");

        let scenario = scenarios::get_by_id(&pool, &id).await.unwrap().unwrap();
        assert_eq!(scenario.execution_count, 1);
        assert!(scenario.last_execution.is_some());
        // FixedExecution: first sample seeds the average
        assert!((scenario.avg_execution_time - 2.0).abs() < 1e-9);
        // +0.5 delta clamped at 100
        assert_eq!(scenario.success_rate, 100.0);

        // Executing twice keeps the count monotonic
        let (status, _) = send(app, "POST", &uri, Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);
        let scenario = scenarios::get_by_id(&pool, &id).await.unwrap().unwrap();
        assert_eq!(scenario.execution_count, 2);
    }

    #[tokio::test]
    async fn test_execute_unknown_scenario_is_404() {
        let state = test_state().await;
        let admin = token_for(&state, "admin", "super_admin").await;
        let app = create_router(state);

        let (status, _) = send(app, "POST", "/api/scenarios/nope/execute", Some(&admin), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_visible_to_redacteur() {
        let state = test_state().await;
        let admin = token_for(&state, "admin", "super_admin").await;
        let redac = token_for(&state, "redac", "redacteur").await;
        let app = create_router(state);

        create_via_api(
            app.clone(),
            &admin,
            json!({"name": "Scrapping Bitcoin", "type": "scraping", "source": "Bitcoin"}),
        )
        .await;

        let (status, body) = send(app, "GET", "/api/scenarios?type=scraping", Some(&redac), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
    }
}
