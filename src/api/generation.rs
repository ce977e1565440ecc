// Ad-hoc content generation and its history

use crate::api::routes::AppState;
use crate::auth::AuthUser;
use crate::authz::{Permission, Role};
use crate::db::history::{self, HistoryFilter};
use crate::db::providers;
use crate::db::schema::{HistoryRecord, HistoryStatus, ProviderStatus};
use crate::errors::{AppError, Result};
use crate::pipeline::synthesizer::GenerationRequest;
use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use sqlx::types::Json as SqlJson;
use uuid::Uuid;

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct GenerateApiRequest {
    pub provider: Option<String>,
    pub prompt: Option<String>,
    pub template: Option<String>,
    pub tone: Option<String>,
    pub language: Option<String>,
    #[serde(rename = "wordCount")]
    pub word_count: Option<i64>,
    pub creativity: Option<i64>,
    #[serde(rename = "seoKeywords", default)]
    pub seo_keywords: Vec<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/content-generation/generate
///
/// Validation failures reject before any side effect. Once the request is
/// dispatched, exactly one history row is written, success or failure.
pub async fn generate(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(request): Json<GenerateApiRequest>,
) -> Result<Json<serde_json::Value>> {
    auth.role
        .require_any(&[Permission::ManageGeneration, Permission::UseGeneration])?;

    let prompt = request
        .prompt
        .as_deref()
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Prompt requis".to_string()))?;

    let provider_id = request
        .provider
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::Validation("Provider requis".to_string()))?;

    if let Some(creativity) = request.creativity {
        if !(0..=100).contains(&creativity) {
            return Err(AppError::Validation(
                "Creativity must be between 0 and 100".to_string(),
            ));
        }
    }

    let provider = providers::get_by_id(&state.pool, provider_id)
        .await?
        .ok_or(AppError::ProviderNotFound)?;

    if ProviderStatus::parse(&provider.status) != Some(ProviderStatus::Connected) {
        return Err(AppError::Validation(format!(
            "{} n'est pas connecté",
            provider.name
        )));
    }

    let synth_request = GenerationRequest {
        prompt: prompt.to_string(),
        template: request.template.clone(),
        tone: request.tone.clone(),
        language: request.language.clone(),
        word_count: request.word_count,
        creativity: request.creativity,
        seo_keywords: request.seo_keywords.clone(),
    };

    tracing::info!("Generating content with {}", provider.name);

    let outcome = match tokio::time::timeout(
        state.generation_timeout,
        state.provider_client.generate(&provider, &synth_request),
    )
    .await
    {
        Err(_) => Err(AppError::Upstream("Generation timed out".to_string())),
        Ok(Err(e)) => Err(e),
        Ok(Ok(content)) => Ok(content),
    };

    let settings = json!({
        "tone": request.tone,
        "language": request.language,
        "creativity": request.creativity,
        "seoKeywords": request.seo_keywords,
    });

    match outcome {
        Ok(content) => {
            let word_count = content.split_whitespace().count() as i64;
            let timestamp = Utc::now();

            history::insert(
                &state.pool,
                &HistoryRecord {
                    id: Uuid::new_v4().to_string(),
                    provider: provider.name.clone(),
                    prompt: prompt.to_string(),
                    content: Some(content.clone()),
                    timestamp,
                    word_count,
                    template: request.template.clone(),
                    status: HistoryStatus::Success.as_str().to_string(),
                    settings: SqlJson(settings),
                    user_id: Some(auth.id.clone()),
                },
            )
            .await?;

            providers::touch_last_used(&state.pool, &provider.id, timestamp).await?;
            tracing::info!("Content generated: {} words", word_count);

            Ok(Json(json!({
                "success": true,
                "content": content,
                "metadata": {
                    "provider": provider.name,
                    "wordCount": word_count,
                    "timestamp": timestamp,
                },
            })))
        }
        Err(e) => {
            // The failure is part of the audit trail; the history write must
            // not be lost even though the request errors out
            let insert_result = history::insert(
                &state.pool,
                &HistoryRecord {
                    id: Uuid::new_v4().to_string(),
                    provider: provider.name.clone(),
                    prompt: prompt.to_string(),
                    content: Some(format!("Erreur: {}", e)),
                    timestamp: Utc::now(),
                    word_count: 0,
                    template: request.template.clone(),
                    status: HistoryStatus::Error.as_str().to_string(),
                    settings: SqlJson(settings),
                    user_id: Some(auth.id.clone()),
                },
            )
            .await;

            if let Err(insert_err) = insert_result {
                tracing::error!("Failed to record generation failure: {}", insert_err);
            }

            Err(e)
        }
    }
}

/// GET /api/content-generation/history
///
/// Non-privileged roles only see their own rows; the scoping happens in the
/// query, not in the response shaping.
pub async fn history(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(mut filter): Query<HistoryFilter>,
) -> Result<Json<Vec<HistoryRecord>>> {
    if auth.role != Role::SuperAdmin {
        filter.user_id = Some(auth.id.clone());
    }

    let entries = history::list(&state.pool, &filter).await?;
    Ok(Json(entries))
}

/// DELETE /api/content-generation/history/:id
pub async fn delete_history_entry(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    auth.role.require(Permission::ManageGeneration)?;

    if !history::delete(&state.pool, &id).await? {
        return Err(AppError::HistoryEntryNotFound);
    }

    Ok(Json(json!({ "message": "Entrée supprimée avec succès" })))
}

/// DELETE /api/content-generation/history
pub async fn clear_history(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>> {
    auth.role.require(Permission::ManageGeneration)?;

    let count = history::delete_all(&state.pool).await?;
    tracing::info!("Generation history cleared: {} entries", count);

    Ok(Json(json!({ "message": format!("{} entrées supprimées", count) })))
}
