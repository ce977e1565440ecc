// Authentication endpoints

use crate::api::routes::AppState;
use crate::auth::{password, AuthUser};
use crate::db::schema::UserRecord;
use crate::db::users;
use crate::errors::{AppError, Result};
use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// User payload without the password hash
#[derive(Debug, Serialize)]
pub struct UserView {
    pub id: String,
    pub username: String,
    pub email: String,
    pub name: String,
    pub role: String,
    pub avatar: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl From<UserRecord> for UserView {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            name: user.name,
            role: user.role,
            avatar: user.avatar,
            status: user.status,
            created_at: user.created_at,
            last_login: user.last_login,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserView,
    pub message: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let username = request
        .username
        .as_deref()
        .filter(|u| !u.is_empty())
        .ok_or_else(|| AppError::Validation("Nom d'utilisateur et mot de passe requis".to_string()))?;
    let supplied_password = request
        .password
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::Validation("Nom d'utilisateur et mot de passe requis".to_string()))?;

    let user = users::get_by_username(&state.pool, username)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if user.status != "active" {
        return Err(AppError::InvalidCredentials);
    }

    if !password::verify_password(supplied_password, &user.password_hash)? {
        return Err(AppError::InvalidCredentials);
    }

    let last_login = Utc::now();
    users::update_last_login(&state.pool, &user.id, last_login).await?;

    let token = state.jwt.generate(&user)?;
    tracing::info!("Login succeeded for {} ({})", user.username, user.role);

    let mut view = UserView::from(user);
    view.last_login = Some(last_login);

    Ok(Json(LoginResponse {
        token,
        user: view,
        message: "Connexion réussie".to_string(),
    }))
}

/// GET /api/auth/verify
pub async fn verify(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>> {
    let user = users::get_by_id(&state.pool, &auth.id)
        .await?
        .ok_or(AppError::UserNotFound)?;

    Ok(Json(json!({ "user": UserView::from(user) })))
}

/// POST /api/auth/logout
///
/// Tokens are stateless; the endpoint only acknowledges so clients have a
/// uniform flow.
pub async fn logout(_auth: AuthUser) -> Json<serde_json::Value> {
    Json(json!({ "message": "Déconnexion réussie" }))
}
