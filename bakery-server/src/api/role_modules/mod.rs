//! Role-Module Assignment API
//!
//! | Path | Method | Meaning |
//! |------|--------|---------|
//! | /api/admin/role-modules | GET | every stored grant |
//! | /api/admin/role-modules/{role} | GET | grants of one role |
//! | /api/admin/role-modules | POST | replace the grants of one role |
//!
//! Callers must be admin or super admin, and their role must hold the
//! system settings module.

mod handler;

use axum::{
    Router, middleware,
    routing::get,
};
use shared::models::ModuleId;

use crate::auth::{require_admin, require_module};
use crate::core::ServerState;

pub fn router(state: &ServerState) -> Router<ServerState> {
    Router::new()
        .nest("/api/admin/role-modules", routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_module(ModuleId::SystemSettings),
        ))
        // Outermost: role check runs before the grant lookup
        .layer(middleware::from_fn(require_admin))
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::save))
        .route("/{role}", get(handler::get_by_role))
}
