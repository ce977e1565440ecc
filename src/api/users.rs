// User listing endpoint (management surface)

use crate::api::auth::UserView;
use crate::api::routes::AppState;
use crate::auth::AuthUser;
use crate::authz::Permission;
use crate::db::users;
use crate::errors::Result;
use axum::{extract::State, Json};

/// GET /api/users
pub async fn list(auth: AuthUser, State(state): State<AppState>) -> Result<Json<Vec<UserView>>> {
    auth.role.require(Permission::ManageUsers)?;

    let users = users::list_all(&state.pool).await?;
    Ok(Json(users.into_iter().map(UserView::from).collect()))
}
