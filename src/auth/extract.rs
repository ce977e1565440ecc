// Bearer-token route guard

use crate::api::routes::AppState;
use crate::authz::Role;
use crate::errors::AppError;
use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

/// Authenticated caller, resolved from the Authorization header.
/// Missing or invalid credentials reject with 401 before the handler runs;
/// permission checks against the role are the handler's job (403).
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    pub username: String,
    pub role: Role,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(AppError::Unauthorized)?;

        let token = header.strip_prefix("Bearer ").ok_or(AppError::Unauthorized)?;

        let claims = state.jwt.validate(token)?;
        let role = claims.role()?;

        Ok(AuthUser {
            id: claims.sub,
            username: claims.username,
            role,
        })
    }
}
