//! Session grant set
//!
//! `GET /api/user/modules` returns the module ids held by the caller's role.
//! Super admin receives every id.

use axum::extract::State;
use axum::{Json, Router, routing::get};
use shared::models::UserModulesResponse;
use shared::{ApiResponse, AppResult};

use crate::auth::{CurrentUser, session_grants};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/user/modules", get(get_user_modules))
}

async fn get_user_modules(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<UserModulesResponse>>> {
    let grants = session_grants(&state, &user).await?;

    tracing::debug!(
        user_id = %user.id,
        role = %user.role,
        modules = grants.len(),
        "Resolved user modules"
    );

    Ok(Json(ApiResponse::ok(UserModulesResponse {
        module_ids: grants.to_vec(),
    })))
}
