// Article endpoints

use crate::api::routes::AppState;
use crate::auth::AuthUser;
use crate::authz::Permission;
use crate::db::articles::{self, ArticleFilter, ArticleUpdate};
use crate::db::schema::{ArticleRecord, ArticleStatus};
use crate::errors::{AppError, Result};
use crate::pipeline;
use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;

/// GET /api/articles
pub async fn list(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(filter): Query<ArticleFilter>,
) -> Result<Json<Vec<ArticleRecord>>> {
    let articles = articles::list(&state.pool, &filter).await?;
    Ok(Json(articles))
}

/// GET /api/articles/:id
pub async fn get_one(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ArticleRecord>> {
    let article = articles::get_by_id(&state.pool, &id)
        .await?
        .ok_or(AppError::ArticleNotFound)?;

    Ok(Json(article))
}

/// POST /api/articles
///
/// Generic draft generation from an arbitrary payload, the same builder the
/// automation-platform webhooks use.
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<serde_json::Value>,
) -> Result<Json<ArticleRecord>> {
    auth.role
        .require_any(&[Permission::ManageGeneration, Permission::UseGeneration])?;

    let article = pipeline::generic_article(&payload, Some(&auth.id));
    articles::insert(&state.pool, &article).await?;

    tracing::info!("Article created: {} ({})", article.title, article.id);
    Ok(Json(article))
}

/// PUT /api/articles/:id
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(changes): Json<ArticleUpdate>,
) -> Result<Json<ArticleRecord>> {
    auth.role
        .require_any(&[Permission::ManageGeneration, Permission::UseGeneration])?;

    if let Some(status) = changes.status.as_deref() {
        if ArticleStatus::parse(status).is_none() {
            return Err(AppError::Validation("Unknown article status".to_string()));
        }
    }

    let article = articles::update(&state.pool, &id, &changes, Utc::now())
        .await?
        .ok_or(AppError::ArticleNotFound)?;

    Ok(Json(article))
}
