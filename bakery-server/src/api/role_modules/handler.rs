//! Role-module assignment handlers

use axum::Json;
use axum::extract::{Path, State};
use shared::models::{
    ModuleId, Role, RoleModuleGrant, SaveRoleModulesRequest, SaveRoleModulesResponse,
};
use shared::{ApiResponse, AppError, AppResult, ErrorCode};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::role_module;

fn parse_role(role: &str) -> AppResult<Role> {
    role.parse().map_err(|_| AppError::role_not_found(role))
}

/// GET /api/admin/role-modules
pub async fn list(
    State(state): State<ServerState>,
) -> AppResult<Json<ApiResponse<Vec<RoleModuleGrant>>>> {
    let grants = role_module::find_all(&state.pool).await?;
    Ok(Json(ApiResponse::ok(grants)))
}

/// GET /api/admin/role-modules/{role}
pub async fn get_by_role(
    State(state): State<ServerState>,
    Path(role): Path<String>,
) -> AppResult<Json<ApiResponse<Vec<RoleModuleGrant>>>> {
    let role = parse_role(&role)?;
    let grants = role_module::find_by_role(&state.pool, role).await?;
    Ok(Json(ApiResponse::ok(grants)))
}

/// POST /api/admin/role-modules - replace every grant of one role
pub async fn save(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<SaveRoleModulesRequest>,
) -> AppResult<Json<ApiResponse<SaveRoleModulesResponse>>> {
    let role = parse_role(&payload.role)?;
    if role.is_super_admin() {
        return Err(AppError::with_message(
            ErrorCode::RoleNotEditable,
            "Super admin access cannot be edited",
        ));
    }

    let module_ids = payload
        .module_ids
        .iter()
        .map(|id| {
            id.parse::<ModuleId>()
                .map_err(|_| AppError::module_not_found(id.as_str()))
        })
        .collect::<AppResult<Vec<_>>>()?;

    tracing::info!(
        user_id = %user.id,
        username = %user.username,
        role = %role,
        modules = ?module_ids,
        "Saving role modules"
    );

    role_module::replace_for_role(&state.pool, role, &module_ids).await?;

    Ok(Json(ApiResponse::ok(SaveRoleModulesResponse { role })))
}
