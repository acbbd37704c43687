//! Module catalog
//!
//! `GET /api/modules` lists the registry for any authenticated user, in
//! declaration order. `?category=hr` narrows to one category.

use axum::extract::Query;
use axum::{Json, Router, routing::get};
use serde::Deserialize;
use shared::models::ModuleCategory;
use shared::registry::{ModuleInfo, ModuleRegistry};
use shared::{ApiResponse, AppError, AppResult};

use crate::auth::CurrentUser;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/modules", get(list))
}

#[derive(Debug, Deserialize)]
pub struct ModuleQuery {
    category: Option<String>,
}

async fn list(
    _user: CurrentUser,
    Query(query): Query<ModuleQuery>,
) -> AppResult<Json<ApiResponse<Vec<ModuleInfo>>>> {
    let category = query
        .category
        .as_deref()
        .map(str::parse::<ModuleCategory>)
        .transpose()
        .map_err(|e| AppError::validation(e.to_string()).with_detail("category", e.0))?;

    let registry = ModuleRegistry::system();
    let modules = match category {
        Some(category) => registry.modules_by_category(category),
        None => registry.modules().iter().collect(),
    };

    Ok(Json(ApiResponse::ok(
        modules.into_iter().map(ModuleInfo::from).collect(),
    )))
}
