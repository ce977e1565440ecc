// AI provider management endpoints

use crate::api::routes::AppState;
use crate::auth::AuthUser;
use crate::authz::Permission;
use crate::db::providers;
use crate::db::schema::{ProviderRecord, ProviderStatus};
use crate::errors::{AppError, Result};
use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Minimum accepted API key length
const MIN_API_KEY_LENGTH: usize = 10;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiKeyRequest {
    #[serde(rename = "apiKey")]
    pub api_key: Option<String>,
}

/// Catalogue view: the key itself never leaves the API
#[derive(Debug, Serialize)]
pub struct ProviderView {
    pub id: String,
    pub name: String,
    pub status: String,
    pub description: Option<String>,
    #[serde(rename = "lastUsed")]
    pub last_used: Option<DateTime<Utc>>,
    pub capabilities: Vec<String>,
    #[serde(rename = "maxTokens")]
    pub max_tokens: i64,
    pub pricing: String,
    #[serde(rename = "hasApiKey")]
    pub has_api_key: bool,
}

impl From<ProviderRecord> for ProviderView {
    fn from(provider: ProviderRecord) -> Self {
        Self {
            id: provider.id,
            name: provider.name,
            status: provider.status,
            description: provider.description,
            last_used: provider.last_used,
            capabilities: provider.capabilities.0,
            max_tokens: provider.max_tokens,
            pricing: provider.pricing,
            has_api_key: provider.api_key.is_some(),
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/ai-providers
pub async fn list(_auth: AuthUser, State(state): State<AppState>) -> Result<Json<Vec<ProviderView>>> {
    let providers = providers::list_all(&state.pool).await?;
    Ok(Json(providers.into_iter().map(ProviderView::from).collect()))
}

/// PUT /api/ai-providers/:id/api-key
///
/// A valid key connects the provider; clearing the key disconnects it; a key
/// below the minimum length is rejected and leaves everything unchanged.
pub async fn set_api_key(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<ApiKeyRequest>,
) -> Result<Json<serde_json::Value>> {
    auth.role.require(Permission::ManageApiKeys)?;

    let provider = providers::get_by_id(&state.pool, &id)
        .await?
        .ok_or(AppError::ProviderNotFound)?;

    let trimmed = request.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty());

    if let Some(key) = trimmed {
        if key.len() < MIN_API_KEY_LENGTH {
            return Err(AppError::Validation(format!(
                "Clé API trop courte (minimum {} caractères)",
                MIN_API_KEY_LENGTH
            )));
        }
    }

    let status = match trimmed {
        Some(_) => ProviderStatus::Connected,
        None => ProviderStatus::Disconnected,
    };

    providers::set_api_key(&state.pool, &id, trimmed, status).await?;

    match trimmed {
        Some(key) => {
            let prefix: String = key.chars().take(8).collect();
            tracing::info!("API key for {} configured ({}...)", provider.name, prefix);
        }
        None => tracing::info!("API key for {} cleared", provider.name),
    }

    let updated = providers::get_by_id(&state.pool, &id)
        .await?
        .ok_or(AppError::ProviderNotFound)?;

    Ok(Json(json!({
        "success": true,
        "message": format!(
            "Clé API {} {} avec succès",
            provider.name,
            if trimmed.is_some() { "sauvegardée" } else { "supprimée" }
        ),
        "status": status.as_str(),
        "provider": ProviderView::from(updated),
    })))
}

/// POST /api/ai-providers/:id/test
///
/// Probes the backend. The probe distinguishes timeout, auth and network
/// failures; any of them flips the provider to error status.
pub async fn test_connection(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    auth.role.require(Permission::ManageApiKeys)?;

    let provider = providers::get_by_id(&state.pool, &id)
        .await?
        .ok_or(AppError::ProviderNotFound)?;

    if provider.api_key.is_none() {
        return Err(AppError::Validation("Clé API manquante".to_string()));
    }

    tracing::info!("Testing connection for {}", provider.name);

    match state.provider_client.probe(&provider).await {
        Ok(()) => {
            providers::set_status(&state.pool, &id, ProviderStatus::Connected).await?;
            providers::touch_last_used(&state.pool, &id, Utc::now()).await?;

            Ok(Json(json!({
                "success": true,
                "message": format!("Connexion {} réussie", provider.name),
                "status": ProviderStatus::Connected.as_str(),
            })))
        }
        Err(probe_error) => {
            providers::set_status(&state.pool, &id, ProviderStatus::Error).await?;
            Err(AppError::Upstream(format!(
                "Connection test for {} failed: {}",
                provider.name, probe_error
            )))
        }
    }
}
